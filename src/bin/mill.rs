//! Batch CLI: workbook plus a mapping file in, a zip of invoice PDFs out.

use std::fs;
use std::process::exit;

use invoice_mill::{
    render_invoice, run_pipeline, sanitize_filename, InvoiceBundle, Mapping, Settings,
};
use log::info;

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("error: {e}");
        exit(1);
    }
}

fn run() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 4 || args.len() > 5 {
        return Err(format!(
            "usage: {} <workbook.xlsx> <mapping.json> <out.zip> [settings.json]",
            args.first().map(String::as_str).unwrap_or("mill")
        ));
    }

    let bytes = fs::read(&args[1]).map_err(|e| format!("Could not read {}: {}", args[1], e))?;
    let mapping: Mapping = read_json(&args[2])?;
    let settings: Settings = match args.get(4) {
        Some(path) => read_json(path)?,
        None => Settings::default(),
    };

    let output = run_pipeline(&bytes, &mapping, settings.issue_date).map_err(|e| e.to_string())?;
    info!(
        "{} columns, {} invoices",
        output.headers.len(),
        output.invoices.len()
    );

    let mut bundle = InvoiceBundle::new();
    for invoice in &output.invoices {
        for err in &invoice.validation_errors {
            eprintln!("warning: {} {}: {}", invoice.invoice_number, invoice.customer, err);
        }
        let pdf = render_invoice(invoice, &settings);
        let name = format!(
            "{}_{}.pdf",
            sanitize_filename(&invoice.invoice_number),
            sanitize_filename(&invoice.customer)
        );
        bundle.add(&name, &pdf)?;
    }
    let zip = bundle.finish()?;
    fs::write(&args[3], &zip).map_err(|e| format!("Could not write {}: {}", args[3], e))?;
    println!("wrote {} invoices to {}", output.invoices.len(), args[3]);
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("Could not read {path}: {e}"))?;
    serde_json::from_str(&text).map_err(|e| format!("Could not parse {path}: {e}"))
}
