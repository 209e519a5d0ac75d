//! PDF assembly: replay `LayoutPage` draw instructions into pdf-writer
//! content streams. Uses the built-in Type1 Helvetica faces with WinAnsi
//! encoding, so no font data is embedded.

use pdf_writer::{Content, Name, Pdf, Rect, Ref, Str};

use crate::fonts::to_winansi;
use crate::layout::{DrawOp, LayoutPage, PAGE_HEIGHT, PAGE_WIDTH};

const FONT_REGULAR: Name = Name(b"F1");
const FONT_BOLD: Name = Name(b"F2");
const WATERMARK_GS: Name = Name(b"GSwm");

/// Render the page list into a single PDF document.
pub fn render_pages(pages: &[LayoutPage]) -> Vec<u8> {
    let mut alloc = Ref::new(1);
    let catalog_id = alloc.bump();
    let tree_id = alloc.bump();
    let regular_id = alloc.bump();
    let bold_id = alloc.bump();
    let gs_id = alloc.bump();

    let page_ids: Vec<Ref> = pages.iter().map(|_| alloc.bump()).collect();
    let content_ids: Vec<Ref> = pages.iter().map(|_| alloc.bump()).collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(tree_id);
    pdf.pages(tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    pdf.type1_font(regular_id)
        .base_font(Name(b"Helvetica"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));
    pdf.type1_font(bold_id)
        .base_font(Name(b"Helvetica-Bold"))
        .encoding_predefined(Name(b"WinAnsiEncoding"));

    // One shared low-alpha graphics state for watermark text.
    pdf.ext_graphics(gs_id).non_stroking_alpha(0.05);

    for ((page, &page_id), &content_id) in pages.iter().zip(&page_ids).zip(&content_ids) {
        let mut writer = pdf.page(page_id);
        writer.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH as f32, PAGE_HEIGHT as f32));
        writer.parent(tree_id);
        writer.contents(content_id);
        let mut resources = writer.resources();
        resources
            .fonts()
            .pair(FONT_REGULAR, regular_id)
            .pair(FONT_BOLD, bold_id);
        resources.ext_g_states().pair(WATERMARK_GS, gs_id);
        drop(resources);
        drop(writer);

        let content = page_content(page);
        pdf.stream(content_id, &content.finish());
    }

    pdf.finish()
}

fn page_content(page: &LayoutPage) -> Content {
    let mut content = Content::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                size,
                bold,
                color,
                angle,
                opacity,
                text,
            } => {
                let font = if *bold { FONT_BOLD } else { FONT_REGULAR };
                content.save_state();
                if *opacity < 1.0 {
                    content.set_parameters(WATERMARK_GS);
                }
                content.set_fill_rgb(color.0 as f32, color.1 as f32, color.2 as f32);
                content.begin_text();
                content.set_font(font, *size as f32);
                if *angle != 0.0 {
                    let (sin, cos) = angle.to_radians().sin_cos();
                    content.set_text_matrix([
                        cos as f32,
                        sin as f32,
                        -sin as f32,
                        cos as f32,
                        *x as f32,
                        *y as f32,
                    ]);
                } else {
                    content.next_line(*x as f32, *y as f32);
                }
                content.show(Str(&to_winansi(text)));
                content.end_text();
                content.restore_state();
            }
            DrawOp::Rect {
                x,
                y,
                width,
                height,
                color,
            } => {
                content.set_fill_rgb(color.0 as f32, color.1 as f32, color.2 as f32);
                content.rect(*x as f32, *y as f32, *width as f32, *height as f32);
                content.fill_nonzero();
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                content.set_stroke_rgb(color.0 as f32, color.1 as f32, color.2 as f32);
                content.set_line_width(*width as f32);
                content.move_to(*x1 as f32, *y1 as f32);
                content.line_to(*x2 as f32, *y2 as f32);
                content.stroke();
            }
        }
    }
    content
}
