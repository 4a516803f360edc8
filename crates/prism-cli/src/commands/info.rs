//! Avatar summary command

use super::{open_host, SourceArgs};
use anyhow::Result;

pub fn run(source: &SourceArgs) -> Result<()> {
    let (host, info) = open_host(source)?;

    println!("Avatar: {}", info.title.as_deref().unwrap_or("(untitled)"));
    if let Some(vrm) = host.document().as_ref().and_then(|d| d.vrm().cloned()) {
        let meta = &vrm.meta;
        if let Some(author) = &meta.author {
            println!("Author: {}", author);
        }
        if let Some(version) = &meta.version {
            println!("Version: {}", version);
        }
        if let Some(exporter) = &vrm.exporter_version {
            println!("Exporter: {}", exporter);
        }
    } else {
        println!("(no VRM extension)");
    }
    println!();
    println!("Nodes:              {}", info.nodes);
    println!("Meshes:             {}", info.meshes);
    println!("Materials:          {}", info.materials);
    println!("Humanoid bones:     {}", info.human_bones);
    println!("Blend shape groups: {}", info.blend_shape_groups);
    println!("Spring bone groups: {}", info.spring_bone_groups);

    let state = host.state();
    if let Some(avatar) = state.avatar() {
        let names: Vec<&str> = avatar.blend_shapes().group_names().collect();
        if !names.is_empty() {
            println!();
            println!("Expressions: {}", names.join(", "));
        }
    }

    Ok(())
}
