use std::{path::Path, sync::Arc};

use crate::{
    assets::decode::{DecodedImage, RawUpload, normalize_upload},
    assets::store::{AvatarHandle, AvatarStore, MEM_URL_PREFIX, mint_identity},
    editor::config::EditorConfig,
    editor::persist::SelectionStore,
    export::{self, ExportOutcome, ShareSurface},
    foundation::error::{RoundelError, RoundelResult},
    render::compose::{AvatarScene, MIN_ZOOM, RenderParams, compose},
    render::frame::FrameRGBA,
};

use crate::effects::filters::FilterKind;

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// The single currently chosen image identity driving the renderer.
///
/// At most one instance is live; it is replaced wholesale on every
/// selection change, never partially mutated.
pub struct Selection {
    /// Identity of the selected image.
    #[serde(rename = "id")]
    pub identity: String,
    /// Addressable URL of the selected image.
    pub url: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
/// Selection state machine states.
pub enum EditorState {
    /// Initial state, nothing selected; the placeholder glyph is drawn.
    Empty,
    /// A selection is active and drives the renderer.
    Selected,
}

#[derive(Clone, Copy, Debug)]
/// Token tying one render invocation to the mutation generation it saw.
///
/// A completed render is committed only while its ticket generation is
/// still current, so the last mutation wins rather than the last
/// completion.
pub struct RenderTicket {
    generation: u64,
}

#[derive(Debug)]
/// Per-file result of a batch upload.
pub enum UploadOutcome {
    /// File was normalized, cached and selected.
    Added {
        /// Minted identity of the new image.
        identity: String,
    },
    /// File was silently skipped (declared media type is not an image).
    Skipped {
        /// Original file name.
        file_name: String,
    },
    /// File failed to process; the UI should surface this one.
    Failed {
        /// Original file name.
        file_name: String,
        /// The processing error.
        error: RoundelError,
    },
}

/// The avatar editor: selection state machine, render parameters and the
/// render-generation guard, coordinating the store and the renderer.
pub struct AvatarEditor {
    config: EditorConfig,
    store: AvatarStore,
    selection: Option<Selection>,
    params: RenderParams,
    generation: u64,
    committed_generation: Option<u64>,
    frame: Option<FrameRGBA>,
}

impl AvatarEditor {
    /// Create an editor and load the default catalog once.
    pub fn new(config: EditorConfig) -> RoundelResult<Self> {
        config.validate()?;
        let mut store = AvatarStore::new(&config.avatar_root);
        store.load_catalog(&config.catalog)?;
        Ok(Self {
            config,
            store,
            selection: None,
            params: RenderParams::default(),
            generation: 1,
            committed_generation: None,
            frame: None,
        })
    }

    /// Current state machine state.
    pub fn state(&self) -> EditorState {
        match self.selection {
            None => EditorState::Empty,
            Some(_) => EditorState::Selected,
        }
    }

    /// Current selection, if any.
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// Grid label for the current selection.
    pub fn selected_label(&self) -> Option<String> {
        self.selection
            .as_ref()
            .map(|s| format!("Selected: {}", s.identity))
    }

    /// Current render parameters.
    pub fn params(&self) -> &RenderParams {
        &self.params
    }

    /// The backing avatar store, in grid display order.
    pub fn store(&self) -> &AvatarStore {
        &self.store
    }

    /// Editor configuration.
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Whether a mutation happened since the last committed frame.
    pub fn needs_render(&self) -> bool {
        self.committed_generation != Some(self.generation)
    }

    /// Select an image by identity and URL.
    ///
    /// Replaces the selection atomically, marks exactly one grid entry
    /// highlighted and requests a render.
    pub fn select(&mut self, identity: impl Into<String>, url: impl Into<String>) {
        self.transition(identity.into(), url.into(), false);
    }

    fn transition(&mut self, identity: String, url: String, silent: bool) {
        if !silent {
            tracing::debug!(%identity, "avatar selected");
        }
        self.store.highlight_only(&identity);
        self.selection = Some(Selection { identity, url });
        self.request_render();
    }

    /// Set the zoom factor, clamped to [`MIN_ZOOM`]. Non-finite values are
    /// ignored.
    pub fn set_zoom(&mut self, zoom: f64) {
        if !zoom.is_finite() {
            tracing::warn!(zoom, "ignoring non-finite zoom");
            return;
        }
        self.params.zoom = zoom.max(MIN_ZOOM);
        self.request_render();
    }

    /// Set the visual filter.
    pub fn set_filter(&mut self, filter: FilterKind) {
        self.params.filter = filter;
        self.request_render();
    }

    /// Set the pan offsets in source pixels.
    pub fn set_offset(&mut self, offset_x: f64, offset_y: f64) {
        self.params.offset_x = offset_x;
        self.params.offset_y = offset_y;
        self.request_render();
    }

    fn request_render(&mut self) {
        self.generation += 1;
    }

    /// Ingest a batch of uploaded files.
    ///
    /// Each valid image is normalized, prepended to the grid and becomes
    /// the selection. Non-image files are skipped with a warning; a
    /// per-file processing error is reported in the outcome and does not
    /// abort the remaining files.
    #[tracing::instrument(skip(self, uploads))]
    pub fn upload_batch(
        &mut self,
        uploads: impl IntoIterator<Item = RawUpload>,
    ) -> Vec<UploadOutcome> {
        let mut outcomes = Vec::new();
        for raw in uploads {
            let file_name = raw.file_name.clone();
            match normalize_upload(&raw, self.config.max_image_size) {
                Ok(normalized) => {
                    let identity = mint_identity();
                    let url = format!("{MEM_URL_PREFIX}{identity}");
                    let handle = AvatarHandle {
                        identity: identity.clone(),
                        payload: Some(Arc::new(normalized.png)),
                        url: url.clone(),
                    };
                    match self.store.prepend(handle) {
                        Ok(()) => {
                            self.transition(identity.clone(), url, false);
                            outcomes.push(UploadOutcome::Added { identity });
                        }
                        Err(error) => {
                            tracing::warn!(file = %file_name, %error, "upload rejected by store");
                            outcomes.push(UploadOutcome::Failed { file_name, error });
                        }
                    }
                }
                Err(RoundelError::UnsupportedType(media_type)) => {
                    tracing::warn!(file = %file_name, %media_type, "skipping non-image upload");
                    outcomes.push(UploadOutcome::Skipped { file_name });
                }
                Err(error) => {
                    tracing::warn!(file = %file_name, %error, "upload failed to process");
                    outcomes.push(UploadOutcome::Failed { file_name, error });
                }
            }
        }
        outcomes
    }

    /// Persist the current selection under the configured storage key.
    ///
    /// Fails with [`RoundelError::NoSelection`] when nothing is selected;
    /// storage is left untouched in that case.
    pub fn save(&self, storage: &dyn SelectionStore) -> RoundelResult<()> {
        let selection = self.selection.as_ref().ok_or(RoundelError::NoSelection)?;
        storage.write(&self.config.storage_key, selection)
    }

    /// Restore a previously saved selection at startup.
    ///
    /// A present, well-formed value transitions straight to `Selected`
    /// without re-upload; the transition is silent (no duplicate log) but
    /// still requests a draw. Returns whether a selection was restored.
    pub fn restore(&mut self, storage: &dyn SelectionStore) -> RoundelResult<bool> {
        match storage.read(&self.config.storage_key)? {
            Some(selection) if !selection.url.is_empty() => {
                self.transition(selection.identity, selection.url, true);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Start a render, capturing the current mutation generation.
    pub fn begin_render(&self) -> RenderTicket {
        RenderTicket {
            generation: self.generation,
        }
    }

    /// Commit a completed frame if its ticket is still current.
    ///
    /// A stale ticket (a mutation happened after [`Self::begin_render`])
    /// is discarded with a warning and `None` is returned, guaranteeing
    /// last-mutation-wins ordering.
    pub fn commit(&mut self, ticket: RenderTicket, frame: FrameRGBA) -> Option<&FrameRGBA> {
        if ticket.generation != self.generation {
            tracing::warn!(
                ticket = ticket.generation,
                current = self.generation,
                "discarding stale render completion"
            );
            return None;
        }
        self.committed_generation = Some(ticket.generation);
        self.frame = Some(frame);
        self.frame.as_ref()
    }

    /// Run one full render of the current state and commit the frame.
    ///
    /// Resolution of the selected image happens here, before composition;
    /// a failure degrades to a background-only frame with a warning and
    /// never leaves a stale frame from a previous selection.
    pub fn render_current(&mut self) -> Option<&FrameRGBA> {
        let ticket = self.begin_render();

        let resolved: Option<DecodedImage> = match &self.selection {
            None => None,
            Some(selection) => match self.store.resolve_pixels(&selection.url) {
                Ok(image) => Some(image),
                Err(err) => {
                    tracing::warn!(url = %selection.url, %err, "failed to draw selected image");
                    None
                }
            },
        };
        let scene = match (&self.selection, &resolved) {
            (None, _) => AvatarScene::Empty,
            (Some(_), None) => AvatarScene::Unavailable,
            (Some(_), Some(image)) => AvatarScene::Image(image),
        };

        let frame = compose(self.config.canvas, scene, &self.params, &self.config.theme);
        self.commit(ticket, frame)
    }

    /// Last committed frame, if any render has completed.
    pub fn frame(&self) -> Option<&FrameRGBA> {
        self.frame.as_ref()
    }

    /// Export the current avatar as a PNG blob.
    ///
    /// Renders first if the committed frame is missing or stale, then
    /// offers the blob to the share surface with a download fallback.
    /// Fails with [`RoundelError::NoSelection`] when nothing is selected.
    pub fn export(
        &mut self,
        share: Option<&dyn ShareSurface>,
        download_dir: &Path,
    ) -> RoundelResult<ExportOutcome> {
        if self.selection.is_none() {
            return Err(RoundelError::NoSelection);
        }
        if self.frame.is_none() || self.needs_render() {
            self.render_current();
        }
        let frame = self
            .frame
            .as_ref()
            .ok_or_else(|| RoundelError::validation("no rendered frame to export"))?;
        export::export_frame(frame, &self.config.download_filename, share, download_dir)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/editor/controller.rs"]
mod tests;
