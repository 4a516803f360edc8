//! Highlightable path listing

use super::{load_document, SourceArgs};
use anyhow::Result;

pub fn run(source: &SourceArgs) -> Result<()> {
    let document = load_document(source)?;
    let paths = document.highlightable_paths();
    for path in &paths {
        println!("{}", path);
    }
    eprintln!("{} highlightable path(s)", paths.len());
    Ok(())
}
