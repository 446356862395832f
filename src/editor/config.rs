use std::path::PathBuf;

use anyhow::Context;

use crate::{
    assets::store::CatalogEntry,
    foundation::core::{Canvas, Theme},
    foundation::error::{RoundelError, RoundelResult},
};

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// Editor configuration: catalog, bounds, storage key and theme.
///
/// Loadable from JSON; every field has a default mirroring the stock
/// avatar editor.
#[serde(default)]
pub struct EditorConfig {
    /// Base directory holding the default avatar catalog files.
    pub avatar_root: PathBuf,
    /// Static default avatar catalog, loaded once at startup.
    pub catalog: Vec<CatalogEntry>,
    /// Durable storage key for the persisted selection.
    pub storage_key: String,
    /// Maximum dimension (longer edge) of a normalized image, in pixels.
    pub max_image_size: u32,
    /// Fixed file name used by the download fallback on export.
    pub download_filename: String,
    /// Output canvas dimensions.
    pub canvas: Canvas,
    /// Theme colors and border metrics.
    pub theme: Theme,
}

impl Default for EditorConfig {
    fn default() -> Self {
        let catalog = (1..=4)
            .map(|id| CatalogEntry {
                id,
                filename: format!("professional-{id}.png"),
                alt: format!("Professional Avatar {id}"),
            })
            .collect();
        Self {
            avatar_root: PathBuf::from("avatars"),
            catalog,
            storage_key: "selectedAvatar".to_string(),
            max_image_size: 1200,
            download_filename: "avatar.png".to_string(),
            canvas: Canvas {
                width: 320,
                height: 320,
            },
            theme: Theme::default(),
        }
    }
}

impl EditorConfig {
    /// Parse a configuration from JSON text.
    pub fn from_json(text: &str) -> RoundelResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .context("parse editor config json")
            .map_err(RoundelError::from)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Validate configuration bounds.
    pub fn validate(&self) -> RoundelResult<()> {
        if self.max_image_size == 0 {
            return Err(RoundelError::validation("max_image_size must be > 0"));
        }
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(RoundelError::validation("canvas sides must be > 0"));
        }
        if self.storage_key.is_empty() {
            return Err(RoundelError::validation("storage_key must be non-empty"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/config.rs"]
mod tests;
