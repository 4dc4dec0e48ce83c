use std::path::Path;

use planmark::{ExtractionResult, MarkerOccurrence};

use crate::cli::OutputFormat;
use crate::shared::{csv_escape, extract, print_json};

pub fn run(
    file: &Path,
    pages: Option<&str>,
    format: &OutputFormat,
    threshold: f64,
) -> Result<(), i32> {
    let result = extract(file, pages, threshold)?;

    match format {
        OutputFormat::Text => {
            println!("marker\tpage\tx\ty");
            for (marker, occ) in occurrences(&result) {
                println!("{marker}\t{}\t{:.2}\t{:.2}", occ.page, occ.x, occ.y);
            }
            Ok(())
        }
        OutputFormat::Json => {
            let rows: Vec<serde_json::Value> = occurrences(&result)
                .map(|(marker, occ)| {
                    serde_json::json!({
                        "marker": marker,
                        "page": occ.page,
                        "x": occ.x,
                        "y": occ.y,
                        "bbox": occ.bbox,
                    })
                })
                .collect();
            print_json(&rows, true)
        }
        OutputFormat::Csv => {
            println!("marker,page,x,y,x0,top,x1,bottom");
            for (marker, occ) in occurrences(&result) {
                let b = &occ.bbox;
                println!(
                    "{},{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2}",
                    csv_escape(marker),
                    occ.page,
                    occ.x,
                    occ.y,
                    b.x0,
                    b.top,
                    b.x1,
                    b.bottom,
                );
            }
            Ok(())
        }
    }
}

/// Every occurrence, grouped by marker text in first-seen order.
fn occurrences(result: &ExtractionResult) -> impl Iterator<Item = (&str, &MarkerOccurrence)> {
    result
        .markers
        .iter()
        .flat_map(|(marker, occ)| occ.iter().map(move |o| (marker, o)))
}
