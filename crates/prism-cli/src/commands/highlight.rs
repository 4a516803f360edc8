//! Highlight dry run: apply, report, revert

use super::{open_host, SourceArgs};
use anyhow::{Context, Result};
use prism_core::Color;
use prism_highlight::HighlightResolver;
use prism_scene::{DrawKind, Frame, MaterialId};

pub struct HighlightArgs {
    pub path: String,
    pub source: SourceArgs,
    pub cancel: bool,
    pub frames: u32,
}

const FRAME_TIME: f32 = 1.0 / 60.0;

pub fn run(args: HighlightArgs) -> Result<()> {
    let (host, _) = open_host(&args.source)?;
    let resolver = HighlightResolver::new(host.clone()).context("Invalid highlight style")?;
    let baseline = host.update(FRAME_TIME);

    let Some(handle) = resolver
        .highlight(&args.path)
        .with_context(|| format!("Failed to highlight {}", args.path))?
    else {
        println!("{} is not highlightable", args.path);
        return Ok(());
    };

    if args.cancel {
        handle.revert();
    }
    let mut frame = host.update(FRAME_TIME);
    for _ in 1..args.frames {
        frame = host.update(FRAME_TIME);
    }

    println!("Path:  {}", handle.path());
    println!("State: {:?}", handle.state());
    if let Some(err) = handle.error() {
        println!("Error: {}", err);
    }
    if handle.is_applied() {
        report(&baseline, &frame, resolver.style().color);
    }

    handle.revert();
    let after = host.update(FRAME_TIME);
    let restored = summarize(&after) == summarize(&baseline);
    println!("Reverted: {}", if restored { "scene restored" } else { "scene differs" });
    Ok(())
}

#[derive(PartialEq)]
struct Summary {
    gizmos: usize,
    highlighted_meshes: usize,
    meshes: usize,
}

fn summarize(frame: &Frame) -> Summary {
    let highlighted_meshes = frame
        .meshes()
        .filter(|d| match &d.kind {
            DrawKind::Mesh { materials } => materials.first() == Some(&MaterialId::HIGHLIGHT),
            _ => false,
        })
        .count();
    Summary {
        gizmos: frame.gizmos().count(),
        highlighted_meshes,
        meshes: frame.meshes().count(),
    }
}

fn report(before: &Frame, after: &Frame, color: Color) {
    let b = summarize(before);
    let a = summarize(after);
    let recolored = after
        .gizmos()
        .filter(|d| matches!(&d.kind, DrawKind::Gizmo { color: c, .. } if *c == color))
        .count();

    println!();
    println!("Visible meshes:     {} -> {}", b.meshes, a.meshes);
    println!("Highlighted meshes: {} -> {}", b.highlighted_meshes, a.highlighted_meshes);
    println!("Gizmos:             {} -> {}", b.gizmos, a.gizmos);
    println!("Highlight-colored gizmos: {}", recolored);
}
