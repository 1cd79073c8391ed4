use std::fs::File;
use std::io::Write;
use std::path::Path;

use printpdf::{BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfLayerReference, Point, Rgb};
use tracing::info;

use crate::errors::{Error, ErrorKind, Result};
use crate::export::{layout_document, Element, FontStyle, HelveticaMetrics, Page, PageSetup, DOCUMENT_TITLE, MM_PER_PT};
use crate::group::group_by_category;
use crate::prompt::Prompt;

/// rules between prompts are drawn in light grey
const RULE_GREY: f32 = 200.0 / 255.0;
const LAYER: &str = "Layer 1";

fn export_error<E: std::fmt::Debug>(e: E) -> Error {
    Error::new(ErrorKind::Export, "could not render the PDF").with_detail(format!("{:?}", e))
}

fn draw_page(layer: &PdfLayerReference, page: &Page, setup: &PageSetup, regular: &IndirectFontRef, bold: &IndirectFontRef) {
    for element in &page.elements {
        match element {
            Element::Text { lines, x, y, size, line_height, style } => {
                let font = match style {
                    FontStyle::Normal => regular,
                    FontStyle::Bold => bold,
                };
                for (i, line) in lines.iter().enumerate() {
                    if line.is_empty() {
                        continue;
                    }
                    // baseline sits one em below the top of the line
                    let baseline = y + line_height * i as f32 + size * MM_PER_PT;
                    layer.use_text(line.clone(), *size, Mm(*x), Mm(setup.height - baseline), font);
                }
            }
            Element::Rule { x1, x2, y } => {
                layer.set_outline_color(Color::Rgb(Rgb::new(RULE_GREY, RULE_GREY, RULE_GREY, None)));
                layer.set_outline_thickness(0.5);
                let y = Mm(setup.height - y);
                layer.add_line(Line {
                    points: vec![(Point::new(Mm(*x1), y), false), (Point::new(Mm(*x2), y), false)],
                    is_closed: false,
                });
            }
        }
    }
}

/// Render laid out pages into PDF bytes.
pub fn render_pdf(pages: &[Page], setup: &PageSetup) -> Result<Vec<u8>> {
    let (doc, first_page, first_layer) = PdfDocument::new(DOCUMENT_TITLE, Mm(setup.width), Mm(setup.height), LAYER);
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(export_error)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(export_error)?;

    for (i, page) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (p, l) = doc.add_page(Mm(setup.width), Mm(setup.height), LAYER);
            doc.get_page(p).get_layer(l)
        };
        draw_page(&layer, page, setup, &regular, &bold);
    }

    doc.save_to_bytes().map_err(export_error)
}

/// Export `prompts` grouped by category to a PDF at `path`, returning the
/// number of pages written.
pub fn export_pdf(prompts: &[Prompt], path: &Path) -> Result<usize> {
    if prompts.is_empty() {
        return Err(Error::new(ErrorKind::Export, "there are no prompts to export"));
    }
    let setup = PageSetup::a4();
    let groups = group_by_category(prompts);
    let pages = layout_document(&groups, setup, &HelveticaMetrics);
    let bytes = render_pdf(&pages, &setup)?;

    let mut file = File::create(path)?;
    file.write_all(&bytes)?;
    info!(path = %path.display(), pages = pages.len(), prompts = prompts.len(), "exported vault");
    Ok(pages.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn prompt(id: i64, category: &str, text: &str) -> Prompt {
        Prompt {
            id: id,
            full_prompt: text.to_string(),
            category: category.to_string(),
            main_category: None,
            sub_category: None,
            reference_image: None,
        }
    }

    #[test]
    fn renders_a_pdf_document() {
        let prompts = vec![prompt(1, "Design", "Make a logo"), prompt(2, "Design", "Pick a palette")];
        let groups = group_by_category(&prompts);
        let setup = PageSetup::a4();
        let pages = layout_document(&groups, setup, &HelveticaMetrics);
        let bytes = render_pdf(&pages, &setup).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn exports_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(crate::export::EXPORT_FILE_NAME);
        let pages = export_pdf(&[prompt(1, "", "Uncategorized text")], &path).unwrap();
        assert_eq!(pages, 1);
        assert!(fs::read(&path).unwrap().starts_with(b"%PDF"));
    }

    #[test]
    fn refuses_empty_export() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.pdf");
        let e = export_pdf(&[], &path).unwrap_err();
        assert!(matches!(e.kind, ErrorKind::Export));
        assert!(!path.exists());
    }
}
