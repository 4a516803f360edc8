//! CLI command implementations

pub mod highlight;
pub mod info;
pub mod paths;
pub mod show;

use anyhow::{Context, Result};
use clap::Args;
use prism_core::PrismConfig;
use prism_scene::{AvatarInfo, AvatarSource, SceneHost};
use prism_vrm::{sample, VrmDocument};
use std::path::PathBuf;

/// Where to read the avatar from
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Path to a .vrm / .glb / .gltf file
    #[arg(required_unless_present = "sample")]
    pub avatar: Option<PathBuf>,

    /// Use the built-in sample avatar
    #[arg(long, conflicts_with = "avatar")]
    pub sample: bool,
}

impl SourceArgs {
    fn to_source(&self) -> Result<AvatarSource> {
        match &self.avatar {
            Some(path) => Ok(AvatarSource::Path(path.clone())),
            None => {
                let bytes = serde_json::to_vec(&sample::sample_avatar())
                    .context("Failed to serialize sample avatar")?;
                Ok(AvatarSource::Bytes(bytes))
            }
        }
    }

    fn describe(&self) -> String {
        match &self.avatar {
            Some(path) => path.display().to_string(),
            None => "<sample>".to_string(),
        }
    }
}

/// Parse the document without building a scene
pub fn load_document(source: &SourceArgs) -> Result<VrmDocument> {
    match &source.avatar {
        Some(path) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            VrmDocument::from_slice(&bytes)
                .with_context(|| format!("Failed to parse {}", path.display()))
        }
        None => VrmDocument::from_json(sample::sample_avatar()).context("Invalid sample avatar"),
    }
}

/// Create a scene host from the layered config and load the avatar into it
pub fn open_host(source: &SourceArgs) -> Result<(SceneHost, AvatarInfo)> {
    let config = PrismConfig::load().context("Failed to load configuration")?;
    let host = SceneHost::new(&config).context("Failed to create scene")?;
    let info = host
        .load_avatar(source.to_source()?)
        .with_context(|| format!("Failed to load avatar {}", source.describe()))?;
    log::debug!("loaded {} as generation {}", source.describe(), info.generation);
    Ok((host, info))
}
