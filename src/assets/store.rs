use std::{
    io::Cursor,
    path::{Path, PathBuf},
    sync::Arc,
    sync::atomic::{AtomicU64, Ordering},
};

use anyhow::Context;

use crate::{
    assets::decode::{self as assets_decode, DecodedImage},
    foundation::error::{RoundelError, RoundelResult},
    foundation::math::fnv1a64,
};

/// URL scheme prefix for images held only in this session's memory.
pub(crate) const MEM_URL_PREFIX: &str = "mem:";
/// URL scheme prefix for generated placeholder images.
pub(crate) const PLACEHOLDER_URL_PREFIX: &str = "placeholder:";

const PLACEHOLDER_SIDE: u32 = 200;

#[derive(Clone, Debug)]
/// Immutable handle to one stored avatar image.
///
/// A handle is created once (by ingest or by catalog load) and never
/// mutated. Catalog images carry no payload; their URL is a path relative
/// to the store root. Uploaded and placeholder images carry their encoded
/// payload and use a `mem:`/`placeholder:` URL.
pub struct AvatarHandle {
    /// Unique identity token; two handles never share one.
    pub identity: String,
    /// Encoded (PNG) payload for in-memory images, `None` for file-backed.
    pub payload: Option<Arc<Vec<u8>>>,
    /// Addressable URL resolving to the image pixels.
    pub url: String,
}

#[derive(Clone, Debug)]
/// Ordered store entry wrapping a handle plus its grid highlight flag.
pub struct AvatarEntry {
    /// The stored image handle.
    pub handle: AvatarHandle,
    /// Whether the grid shows this entry as the current selection.
    pub highlighted: bool,
}

#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
/// One default avatar in the static startup catalog.
pub struct CatalogEntry {
    /// Stable numeric identity of the catalog image.
    pub id: u32,
    /// File name resolved against the store root.
    pub filename: String,
    /// Alternative text for the grid item.
    pub alt: String,
}

static IDENTITY_SEQ: AtomicU64 = AtomicU64::new(1);

/// Mint a fresh unique identity token.
///
/// Tokens are opaque and never derived from file names; a process-wide
/// sequence number guarantees uniqueness and a hashed timestamp keeps
/// tokens from colliding across sessions sharing a storage file.
pub fn mint_identity() -> String {
    let seq = IDENTITY_SEQ.fetch_add(1, Ordering::Relaxed);
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0);
    let hash = fnv1a64(&[&seq.to_le_bytes(), &nanos.to_le_bytes()]);
    format!("u{seq:x}-{hash:016x}")
}

/// Normalize and validate a store-relative image path.
///
/// The normalized result uses `/` separators, drops `.` segments, and
/// rejects absolute paths or parent traversals (`..`).
pub fn normalize_rel_path(source: &str) -> RoundelResult<String> {
    let s = source.replace('\\', "/");
    if s.is_empty() {
        return Err(RoundelError::validation("image path must be non-empty"));
    }
    if s.starts_with('/') {
        return Err(RoundelError::validation("image paths must be relative"));
    }

    let mut parts = Vec::<&str>::new();
    for part in s.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                return Err(RoundelError::validation("image paths must not contain '..'"));
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return Err(RoundelError::validation("image path must contain a file name"));
    }
    Ok(parts.join("/"))
}

#[derive(Clone, Debug)]
/// Insertion-ordered store of avatar handles backing the selection grid.
///
/// Uploads are prepended, catalog images appended once at startup. There is
/// no eviction: the default catalog is a fixed small set, and uploaded
/// images grow the store for the lifetime of the session. That growth is an
/// accepted resource trade-off, not a bug.
pub struct AvatarStore {
    root: PathBuf,
    entries: Vec<AvatarEntry>,
}

impl AvatarStore {
    /// Create an empty store resolving file-backed URLs against `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            entries: Vec::new(),
        }
    }

    /// Root directory for file-backed image URLs.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in current grid display order.
    pub fn iter(&self) -> impl Iterator<Item = &AvatarEntry> {
        self.entries.iter()
    }

    /// Lookup a handle by identity.
    pub fn get(&self, identity: &str) -> Option<&AvatarHandle> {
        self.entries
            .iter()
            .map(|e| &e.handle)
            .find(|h| h.identity == identity)
    }

    /// Prepend a freshly uploaded handle so it leads the grid.
    pub fn prepend(&mut self, handle: AvatarHandle) -> RoundelResult<()> {
        self.insert(handle, true)
    }

    /// Append a handle in catalog order.
    pub fn push(&mut self, handle: AvatarHandle) -> RoundelResult<()> {
        self.insert(handle, false)
    }

    fn insert(&mut self, handle: AvatarHandle, front: bool) -> RoundelResult<()> {
        if self.get(&handle.identity).is_some() {
            return Err(RoundelError::validation(format!(
                "duplicate avatar identity '{}'",
                handle.identity
            )));
        }
        let entry = AvatarEntry {
            handle,
            highlighted: false,
        };
        if front {
            self.entries.insert(0, entry);
        } else {
            self.entries.push(entry);
        }
        Ok(())
    }

    /// Mark exactly the given identity highlighted and clear all others.
    ///
    /// Returns whether a matching entry exists.
    pub fn highlight_only(&mut self, identity: &str) -> bool {
        let mut found = false;
        for entry in &mut self.entries {
            entry.highlighted = entry.handle.identity == identity;
            found |= entry.highlighted;
        }
        found
    }

    /// Load the static default catalog, one entry per grid slot.
    ///
    /// Every entry triggers a decode so broken files surface at startup. A
    /// file that cannot be read or decoded is substituted with a generated
    /// placeholder registered under the same identity, so the grid never
    /// shows a gap.
    #[tracing::instrument(skip(self, catalog))]
    pub fn load_catalog(&mut self, catalog: &[CatalogEntry]) -> RoundelResult<()> {
        for entry in catalog {
            let identity = entry.id.to_string();
            match self.decode_catalog_file(&entry.filename) {
                Ok(url) => self.push(AvatarHandle {
                    identity,
                    payload: None,
                    url,
                })?,
                Err(err) => {
                    tracing::warn!(id = entry.id, file = %entry.filename, %err,
                        "catalog image failed to load, substituting placeholder");
                    self.push(AvatarHandle {
                        identity,
                        payload: Some(Arc::new(placeholder_png()?)),
                        url: format!("{PLACEHOLDER_URL_PREFIX}{}", entry.id),
                    })?;
                }
            }
        }
        Ok(())
    }

    fn decode_catalog_file(&self, filename: &str) -> RoundelResult<String> {
        let rel = normalize_rel_path(filename)?;
        let path = self.root.join(Path::new(&rel));
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read catalog image '{}'", path.display()))?;
        assets_decode::decode_image(&bytes)?;
        Ok(rel)
    }

    /// Resolve an addressable URL to decoded pixels.
    ///
    /// In-memory URLs (`mem:`, `placeholder:`) resolve through the stored
    /// payload; anything else is treated as a store-relative file path. A
    /// `mem:` URL restored from a previous session has no backing payload
    /// anymore and fails with a decode error, which the render path turns
    /// into a background-only frame.
    pub fn resolve_pixels(&self, url: &str) -> RoundelResult<DecodedImage> {
        if let Some(entry) = self.entries.iter().find(|e| e.handle.url == url) {
            if let Some(payload) = &entry.handle.payload {
                return assets_decode::decode_image(payload);
            }
        }
        if url.starts_with(MEM_URL_PREFIX) || url.starts_with(PLACEHOLDER_URL_PREFIX) {
            return Err(RoundelError::decode(format!(
                "in-memory image url '{url}' is no longer resolvable"
            )));
        }

        let rel = normalize_rel_path(url)?;
        let path = self.root.join(Path::new(&rel));
        let bytes = std::fs::read(&path)
            .with_context(|| format!("read image bytes from '{}'", path.display()))?;
        assets_decode::decode_image(&bytes)
    }
}

/// Generate the flat placeholder raster used for broken catalog slots.
pub(crate) fn placeholder_png() -> RoundelResult<Vec<u8>> {
    let gray = image::Rgba([0xdd, 0xdd, 0xdd, 0xff]);
    let img = image::RgbaImage::from_pixel(PLACEHOLDER_SIDE, PLACEHOLDER_SIDE, gray);
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
        .context("encode placeholder image as png")?;
    Ok(png)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/store.rs"]
mod tests;
