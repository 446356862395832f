//! Roundel is a circular avatar composition pipeline.
//!
//! Roundel turns arbitrary user images into a zoomed, filtered, circular
//! avatar on a fixed-size canvas. The crate is the headless core of an
//! avatar editor: UI wiring, install prompts and container messaging live
//! behind narrow collaborator traits (see [`bridge`]).
//!
//! # Pipeline overview
//!
//! 1. **Ingest**: `RawUpload -> NormalizedImage` (media-type check, decode,
//!    proportional resize to the maximum-dimension bound, lossless re-encode)
//! 2. **Store**: normalized images and the default catalog live in an
//!    insertion-ordered [`AvatarStore`] keyed by minted identity tokens
//! 3. **Compose**: `AvatarScene + RenderParams -> FrameRGBA` (centered crop,
//!    filter, circular clip, border ring) on the CPU
//! 4. **Export**: the last committed frame is encoded to a PNG blob and
//!    offered to a share surface or written as a download
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate.
//! - **Deterministic composition**: [`compose`] is a pure function of its
//!   inputs; identical inputs produce pixel-identical frames.
//! - **No IO in the renderer**: image resolution happens before composition
//!   and failures degrade to a background-only frame, never a crash.
//! - **Last mutation wins**: every editor mutation bumps a monotonic render
//!   generation and stale render completions are discarded on commit.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod editor;
mod effects;
mod export;
mod foundation;
mod render;

/// Collaborator traits for the install-prompt and native-container bridges.
pub mod bridge;

pub use assets::decode::{
    DecodedImage, NormalizedImage, RawUpload, decode_image, fit_within, normalize_upload,
};
pub use assets::store::{
    AvatarEntry, AvatarHandle, AvatarStore, CatalogEntry, mint_identity, normalize_rel_path,
};
pub use editor::config::EditorConfig;
pub use editor::controller::{
    AvatarEditor, EditorState, RenderTicket, Selection, UploadOutcome,
};
pub use editor::persist::{JsonFileStore, SelectionStore};
pub use effects::filters::{FilterKind, apply_filter};
pub use export::{
    EXPORT_MEDIA_TYPE, ExportBlob, ExportOutcome, ShareSurface, encode_png, export_frame,
};
pub use foundation::core::{Canvas, Point, Rgba8, Theme, Vec2};
pub use foundation::error::{RoundelError, RoundelResult};
pub use render::compose::{AvatarScene, MIN_ZOOM, RenderParams, compose, crop_origin};
pub use render::frame::FrameRGBA;
