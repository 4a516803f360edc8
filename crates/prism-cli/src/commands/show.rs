//! Document pointer lookup

use super::{load_document, SourceArgs};
use anyhow::{Context, Result};
use prism_vrm::Region;

pub fn run(path: &str, source: &SourceArgs) -> Result<()> {
    let document = load_document(source)?;
    let value = document
        .pointer(path)
        .with_context(|| format!("Nothing at {}", path))?;

    println!("{}", serde_json::to_string_pretty(value)?);
    match Region::parse(path) {
        Some(region) if region.needs_resolution() => {
            eprintln!("highlightable as {:?} (applied on the next frame)", region)
        }
        Some(region) => eprintln!("highlightable as {:?}", region),
        None => eprintln!("not highlightable"),
    }
    Ok(())
}
