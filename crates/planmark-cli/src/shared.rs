use std::path::Path;

use planmark::{BBox, Drawing, ExtractOptions, ExtractionResult};

use crate::page_range::parse_page_range;

/// Open a drawing with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is not found
/// or cannot be opened as a PDF.
pub fn open_drawing(file: &Path, threshold: f64) -> Result<Drawing, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    let options = ExtractOptions::default().with_threshold(threshold);
    Drawing::open_file(file, Some(options)).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Resolve an optional page range string into 0-indexed page indices.
///
/// If `pages` is `None`, returns all pages (0..page_count).
pub fn resolve_pages(pages: Option<&str>, page_count: usize) -> Result<Vec<usize>, i32> {
    match pages {
        Some(range) => parse_page_range(range, page_count).map_err(|e| {
            eprintln!("Error: {e}");
            1
        }),
        None => Ok((0..page_count).collect()),
    }
}

/// Open `file` and run the pipeline over the selected pages.
pub fn extract(file: &Path, pages: Option<&str>, threshold: f64) -> Result<ExtractionResult, i32> {
    let drawing = open_drawing(file, threshold)?;
    let indices = resolve_pages(pages, drawing.page_count())?;
    tracing::debug!(file = %file.display(), pages = indices.len(), "extracting");

    drawing.extract_pages(&indices).map_err(|e| {
        eprintln!("Error: {e}");
        1
    })
}

/// Print a JSON value, indented with two spaces unless `compact`.
pub fn print_json<T: serde::Serialize>(value: &T, compact: bool) -> Result<(), i32> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    match rendered {
        Ok(json) => {
            println!("{json}");
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {e}");
            Err(1)
        }
    }
}

pub fn format_bbox(b: &BBox) -> String {
    format!("[{:.2}, {:.2}, {:.2}, {:.2}]", b.x0, b.top, b.x1, b.bottom)
}

/// Escape a string for CSV output.
///
/// If the text contains commas, double quotes, or newlines, wraps it in
/// double quotes and escapes any internal double quotes by doubling them.
pub fn csv_escape(text: &str) -> String {
    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}
