use std::path::Path;

use crate::shared::{extract, print_json};

pub fn run(file: &Path, pages: Option<&str>, threshold: f64, compact: bool) -> Result<(), i32> {
    let result = extract(file, pages, threshold)?;
    print_json(&result, compact)
}
