use std::path::Path;

use planmark::{DrawingInfo, ExtractionResult, extract_pages, text_extent};

use crate::cli::TextFormat;
use crate::shared::{format_bbox, open_drawing, print_json};

pub fn run(file: &Path, format: &TextFormat) -> Result<(), i32> {
    let drawing = open_drawing(file, planmark::ClusterOptions::default().threshold)?;
    let contents = drawing.page_contents().map_err(|e| {
        eprintln!("Error: {e}");
        1
    })?;
    let result = extract_pages(&contents, &drawing.options().cluster);

    match format {
        TextFormat::Text => {
            for page in &result.pages {
                println!("Page {}:", page.page);
                println!("  Dimensions: {:.2} x {:.2}", page.width, page.height);
                println!("  Rotation: {}", page.rotation);
                if let Some(extent) = contents.get(page.page - 1).and_then(text_extent) {
                    println!("  Text extent: {}", format_bbox(&extent));
                }
                println!("  Text elements: {}", page.elements.len());
                println!(
                    "  Markers: {}",
                    page.elements.iter().filter(|e| e.kind.is_marker()).count()
                );
                println!("  Vector paths: {}", page.vector_count);
                println!("  Images: {}", page.image_count);
            }
            println!();
            print_drawing_info(&result.drawing_info);
            println!();
            print_summary(&result);
            Ok(())
        }
        TextFormat::Json => {
            let pages: Vec<serde_json::Value> = result
                .pages
                .iter()
                .map(|page| {
                    serde_json::json!({
                        "page": page.page,
                        "width": page.width,
                        "height": page.height,
                        "rotation": page.rotation,
                        "text_elements": page.elements.len(),
                        "markers": page.elements.iter().filter(|e| e.kind.is_marker()).count(),
                        "vector_count": page.vector_count,
                        "image_count": page.image_count,
                    })
                })
                .collect();
            let info = serde_json::json!({
                "pages": pages,
                "drawing_info": result.drawing_info,
                "summary": result.summary,
            });
            print_json(&info, false)
        }
    }
}

fn print_drawing_info(info: &DrawingInfo) {
    println!("Drawing info:");
    if info.is_empty() {
        println!("  (no title-block fields found)");
        return;
    }
    if let Some(ref v) = info.drawing_number {
        println!("  Drawing number: {v}");
    }
    if let Some(ref v) = info.revision {
        println!("  Revision: {v}");
    }
    if let Some(ref v) = info.scale {
        println!("  Scale: {v}");
    }
    if let Some(ref v) = info.date {
        println!("  Date: {v}");
    }
    if let Some(ref sheet) = info.sheet {
        println!("  Sheet: {} of {}", sheet.index, sheet.total);
    }
}

fn print_summary(result: &ExtractionResult) {
    let summary = &result.summary;
    println!("Pages: {}", summary.total_pages);
    println!("Summary:");
    println!("  Text elements: {}", summary.total_text_elements);
    println!("  Distinct markers: {}", summary.total_markers);
    if !summary.marker_types.is_empty() {
        println!("  Marker types: {}", summary.marker_types.join(", "));
    }
}
