//! Invoice grouping: normalized records + column mapping -> invoices with
//! line totals and per-line validation errors.

use chrono::NaiveDate;
use log::{debug, warn};

use crate::types::{Invoice, InvoiceLine, Mapping, Record, NO_GROUPING};

impl Mapping {
    /// A mapping is usable when the customer, description, quantity, and
    /// unit-price roles are assigned, and a real group column is picked
    /// whenever grouping is enabled.
    pub fn is_valid(&self) -> bool {
        let required = [&self.customer, &self.description, &self.quantity, &self.unit_price];
        if required.iter().any(|s| s.is_empty()) {
            return false;
        }
        if self.is_grouping_enabled {
            return !self.group_by.is_empty() && self.group_by != NO_GROUPING;
        }
        true
    }

    /// Guess role columns from header names by substring match, the same
    /// heuristics the mapping UI seeds itself with. Grouping auto-enables
    /// when a plausible group column exists.
    pub fn guess(headers: &[String]) -> Mapping {
        let find = |needles: &[&str]| -> String {
            for needle in needles {
                if let Some(h) = headers.iter().find(|h| h.to_lowercase().contains(needle)) {
                    return h.clone();
                }
            }
            String::new()
        };
        let group_by = find(&["group", "project", "client"]);
        Mapping {
            customer: find(&["name", "customer", "client"]),
            email: find(&["email"]),
            invoice_no: find(&["invoice", "inv"]),
            description: find(&["desc", "item", "service"]),
            quantity: find(&["qty", "quantity"]),
            unit_price: find(&["price", "unit", "rate"]),
            is_grouping_enabled: !group_by.is_empty(),
            group_by,
        }
    }
}

/// Recompute the invoice batch from scratch. Pure: same records, mapping,
/// and date give the same batch. An invalid mapping yields an empty batch
/// rather than an error; callers pre-check with `Mapping::is_valid`.
pub fn group_invoices(records: &[Record], mapping: &Mapping, today: NaiveDate) -> Vec<Invoice> {
    if !mapping.is_valid() {
        warn!("mapping is missing required roles; producing no invoices");
        return Vec::new();
    }
    let mut invoices = if mapping.is_grouping_enabled {
        group_by_column(records, mapping, today)
    } else {
        one_invoice_per_row(records, mapping)
    };
    for (index, invoice) in invoices.iter_mut().enumerate() {
        invoice.index = index;
    }
    debug!("grouped {} records into {} invoices", records.len(), invoices.len());
    invoices
}

fn one_invoice_per_row(records: &[Record], mapping: &Mapping) -> Vec<Invoice> {
    let mut invoices = Vec::new();
    for (row_index, record) in records.iter().enumerate() {
        let customer = field(record, &mapping.customer).trim().to_string();
        let description = field(record, &mapping.description).trim().to_string();
        let quantity = parse_amount(field(record, &mapping.quantity));
        let unit_price = parse_amount(field(record, &mapping.unit_price));
        let qty = quantity.unwrap_or(0.0);
        let unit = unit_price.unwrap_or(0.0);

        // Skip rule (strict variant): a row contributes nothing only when
        // customer and description are both empty and both amounts are zero.
        if customer.is_empty() && description.is_empty() && qty == 0.0 && unit == 0.0 {
            continue;
        }

        let mut errors = Vec::new();
        record_line_errors(&mut errors, &customer, &description, qty, unit_price);

        let explicit_no = field(record, &mapping.invoice_no).trim().to_string();
        let invoice_number = if explicit_no.is_empty() {
            format!("INV-{}", row_index + 1)
        } else {
            explicit_no
        };

        invoices.push(Invoice {
            customer: or_na(customer),
            email: field(record, &mapping.email).trim().to_string(),
            group_label: String::new(),
            invoice_number,
            lines: vec![line(description, qty, unit)],
            validation_errors: errors,
            index: 0,
        });
    }
    invoices
}

fn group_by_column(records: &[Record], mapping: &Mapping, today: NaiveDate) -> Vec<Invoice> {
    // Vec keeps bucket-creation order, which also drives synthetic numbering.
    let mut buckets: Vec<(String, Invoice)> = Vec::new();
    for record in records {
        let group_value = field(record, &mapping.group_by).trim().to_string();
        let customer = field(record, &mapping.customer).trim().to_string();
        let description = field(record, &mapping.description).trim().to_string();
        if group_value.is_empty() && customer.is_empty() && description.is_empty() {
            continue;
        }
        // Rows that need grouping but carry no group key still aggregate by
        // customer instead of being lost.
        let bucket_key = if group_value.is_empty() {
            format!("<empty>:{}", customer)
        } else {
            group_value.clone()
        };

        let position = buckets.iter().position(|(key, _)| *key == bucket_key);
        let position = match position {
            Some(p) => p,
            None => {
                let explicit_no = field(record, &mapping.invoice_no).trim().to_string();
                let invoice_number = if explicit_no.is_empty() {
                    format!("INV-{}-{:03}", today.format("%Y-%m-%d"), buckets.len() + 1)
                } else {
                    explicit_no
                };
                buckets.push((
                    bucket_key,
                    Invoice {
                        customer: or_na(customer.clone()),
                        email: field(record, &mapping.email).trim().to_string(),
                        group_label: group_value.clone(),
                        invoice_number,
                        lines: Vec::new(),
                        validation_errors: Vec::new(),
                        index: 0,
                    },
                ));
                buckets.len() - 1
            }
        };

        let invoice = &mut buckets[position].1;
        let quantity = parse_amount(field(record, &mapping.quantity));
        let unit_price = parse_amount(field(record, &mapping.unit_price));
        let qty = quantity.unwrap_or(0.0);
        record_line_errors(
            &mut invoice.validation_errors,
            &invoice.customer,
            &description,
            qty,
            unit_price,
        );
        invoice.lines.push(line(description, qty, unit_price.unwrap_or(0.0)));
    }
    buckets.into_iter().map(|(_, invoice)| invoice).collect()
}

fn line(description: String, quantity: f64, unit_price: f64) -> InvoiceLine {
    InvoiceLine {
        description: or_na(description),
        quantity,
        unit_price,
        line_total: quantity * unit_price,
    }
}

/// Accumulate human-readable field names for missing/bad values, without
/// duplicates. Amount parsing never fails the row; it only reports here.
fn record_line_errors(
    errors: &mut Vec<String>,
    customer: &str,
    description: &str,
    quantity: f64,
    unit_price: Option<f64>,
) {
    let mut push = |name: &str| {
        if !errors.iter().any(|e| e == name) {
            errors.push(name.to_string());
        }
    };
    if customer.is_empty() || customer == "N/A" {
        push("Customer");
    }
    if description.is_empty() {
        push("Description");
    }
    if quantity == 0.0 {
        push("Quantity");
    }
    if unit_price.is_none() {
        push("Unit price");
    }
}

fn field<'a>(record: &'a Record, column: &str) -> &'a str {
    if column.is_empty() {
        return "";
    }
    record.get(column).map(String::as_str).unwrap_or("")
}

/// Numeric coercion in the degrade-don't-fail style: thousands separators
/// and stray spaces are tolerated; `None` means the cell was not a number.
fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned = raw.replace(',', "").replace(' ', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

fn or_na(value: String) -> String {
    if value.is_empty() {
        "N/A".to_string()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(&str, &str)]) -> Record {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn mapping() -> Mapping {
        Mapping {
            customer: "Name".into(),
            description: "Desc".into(),
            quantity: "Qty".into(),
            unit_price: "Price".into(),
            ..Mapping::default()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn invalid_mapping_yields_empty_batch() {
        let records = vec![record(&[("Name", "Alice")])];
        let mut m = mapping();
        m.quantity = String::new();
        assert!(!m.is_valid());
        assert!(group_invoices(&records, &m, today()).is_empty());

        let mut grouped = mapping();
        grouped.is_grouping_enabled = true;
        grouped.group_by = NO_GROUPING.into();
        assert!(!grouped.is_valid());
        assert!(group_invoices(&records, &grouped, today()).is_empty());
    }

    #[test]
    fn empty_records_yield_empty_batch() {
        assert!(group_invoices(&[], &mapping(), today()).is_empty());
    }

    #[test]
    fn ungrouped_mode_makes_one_invoice_per_row() {
        let records = vec![
            record(&[("Name", "Alice"), ("Desc", "Design"), ("Qty", "2"), ("Price", "10")]),
            record(&[("Name", "Bob"), ("Desc", "Dev"), ("Qty", "1"), ("Price", "5")]),
        ];
        let invoices = group_invoices(&records, &mapping(), today());
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].lines[0].line_total, 20.0);
        assert_eq!(invoices[0].invoice_number, "INV-1");
        assert_eq!(invoices[1].invoice_number, "INV-2");
        assert_eq!(invoices[0].index, 0);
        assert_eq!(invoices[1].index, 1);
        assert!(invoices[0].validation_errors.is_empty());
    }

    #[test]
    fn blank_rows_are_skipped_but_partial_rows_survive_with_errors() {
        let records = vec![
            record(&[("Name", ""), ("Desc", ""), ("Qty", ""), ("Price", "")]),
            record(&[("Name", ""), ("Desc", "Design"), ("Qty", "abc"), ("Price", "x")]),
        ];
        let invoices = group_invoices(&records, &mapping(), today());
        assert_eq!(invoices.len(), 1);
        let inv = &invoices[0];
        assert_eq!(inv.customer, "N/A");
        assert_eq!(inv.lines[0].quantity, 0.0);
        assert_eq!(inv.lines[0].unit_price, 0.0);
        assert_eq!(inv.lines[0].line_total, 0.0);
        assert!(inv.validation_errors.iter().any(|e| e == "Customer"));
        assert!(inv.validation_errors.iter().any(|e| e == "Quantity"));
        assert!(inv.validation_errors.iter().any(|e| e == "Unit price"));
    }

    #[test]
    fn explicit_invoice_number_is_used_verbatim() {
        let mut m = mapping();
        m.invoice_no = "No".into();
        let records = vec![record(&[
            ("Name", "Alice"),
            ("Desc", "Design"),
            ("Qty", "1"),
            ("Price", "10"),
            ("No", "ACME-42"),
        ])];
        let invoices = group_invoices(&records, &m, today());
        assert_eq!(invoices[0].invoice_number, "ACME-42");
    }

    #[test]
    fn grouped_rows_share_one_invoice() {
        let mut m = mapping();
        m.is_grouping_enabled = true;
        m.group_by = "Project".into();
        let records = vec![
            record(&[("Name", "Alice"), ("Desc", "Design"), ("Qty", "2"), ("Price", "10"), ("Project", "X")]),
            record(&[("Name", "Alice"), ("Desc", "Dev"), ("Qty", "1"), ("Price", "30"), ("Project", "X")]),
            record(&[("Name", "Bob"), ("Desc", "Ops"), ("Qty", "1"), ("Price", "7"), ("Project", "Y")]),
        ];
        let invoices = group_invoices(&records, &m, today());
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].group_label, "X");
        assert_eq!(invoices[0].lines.len(), 2);
        assert_eq!(invoices[0].grand_total(), 50.0);
        assert_eq!(invoices[0].invoice_number, "INV-2026-03-01-001");
        assert_eq!(invoices[1].invoice_number, "INV-2026-03-01-002");
    }

    #[test]
    fn empty_group_values_fall_back_to_a_per_customer_bucket() {
        let mut m = mapping();
        m.is_grouping_enabled = true;
        m.group_by = "Project".into();
        let records = vec![
            record(&[("Name", "Alice"), ("Desc", "A"), ("Qty", "1"), ("Price", "1"), ("Project", "")]),
            record(&[("Name", "Alice"), ("Desc", "B"), ("Qty", "1"), ("Price", "2"), ("Project", "")]),
            record(&[("Name", "Bob"), ("Desc", "C"), ("Qty", "1"), ("Price", "3"), ("Project", "")]),
        ];
        let invoices = group_invoices(&records, &m, today());
        assert_eq!(invoices.len(), 2);
        assert_eq!(invoices[0].customer, "Alice");
        assert_eq!(invoices[0].lines.len(), 2);
        assert_eq!(invoices[0].group_label, "");
        assert_eq!(invoices[1].customer, "Bob");
    }

    #[test]
    fn grouped_errors_are_not_duplicated() {
        let mut m = mapping();
        m.is_grouping_enabled = true;
        m.group_by = "Project".into();
        let records = vec![
            record(&[("Name", "Alice"), ("Desc", ""), ("Qty", "0"), ("Price", "1"), ("Project", "X")]),
            record(&[("Name", "Alice"), ("Desc", ""), ("Qty", "0"), ("Price", "1"), ("Project", "X")]),
        ];
        let invoices = group_invoices(&records, &m, today());
        assert_eq!(invoices.len(), 1);
        let errs = &invoices[0].validation_errors;
        assert_eq!(errs.iter().filter(|e| *e == "Description").count(), 1);
        assert_eq!(errs.iter().filter(|e| *e == "Quantity").count(), 1);
    }

    #[test]
    fn line_total_is_quantity_times_unit_price() {
        let records = vec![
            record(&[("Name", "A"), ("Desc", "x"), ("Qty", "2.5"), ("Price", "4")]),
            record(&[("Name", "B"), ("Desc", "y"), ("Qty", "bogus"), ("Price", "bogus")]),
            record(&[("Name", "C"), ("Desc", "z"), ("Qty", "1,000"), ("Price", "2")]),
        ];
        let invoices = group_invoices(&records, &mapping(), today());
        for inv in &invoices {
            for l in &inv.lines {
                assert_eq!(l.line_total, l.quantity * l.unit_price);
            }
        }
        assert_eq!(invoices[0].lines[0].line_total, 10.0);
        assert_eq!(invoices[1].lines[0].line_total, 0.0);
        assert_eq!(invoices[2].lines[0].line_total, 2000.0);
    }

    #[test]
    fn guess_matches_headers_by_substring() {
        let headers: Vec<String> = ["Customer Name", "Email", "Invoice No", "Description", "Qty", "Unit Price", "Project"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let m = Mapping::guess(&headers);
        assert_eq!(m.customer, "Customer Name");
        assert_eq!(m.email, "Email");
        assert_eq!(m.invoice_no, "Invoice No");
        assert_eq!(m.description, "Description");
        assert_eq!(m.quantity, "Qty");
        assert_eq!(m.unit_price, "Unit Price");
        assert_eq!(m.group_by, "Project");
        assert!(m.is_grouping_enabled);
        assert!(m.is_valid());
    }
}
