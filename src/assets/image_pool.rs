//! Shared image cache keyed by resolved URL.
//!
//! Nodes request images during rendering; requests for unknown keys are queued and loaded when
//! the host drains the pool between frames. Local assets carry the current asset hash in their
//! key so that bumping the hash evicts them. Every change to the set of ready images bumps a
//! version signal, so computations that read the pool are invalidated once a load finishes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;

use crate::assets::decode::{ImageData, decode_image};
use crate::foundation::error::VignetteResult;
use crate::signal::signal::Signal;

pub type ImageLoader = Box<dyn Fn(&str) -> anyhow::Result<Vec<u8>>>;

#[derive(Clone, Debug, PartialEq)]
pub enum ImageEntry {
    Pending,
    Ready(ImageData),
    Failed(String),
}

pub struct ImagePool {
    asset_root: PathBuf,
    asset_hash: RefCell<String>,
    entries: RefCell<HashMap<String, ImageEntry>>,
    pending: RefCell<Vec<String>>,
    version: Signal<u64>,
    loader: ImageLoader,
}

impl std::fmt::Debug for ImagePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePool")
            .field("asset_root", &self.asset_root)
            .field("asset_hash", &self.asset_hash.borrow())
            .field("entries", &self.entries.borrow().len())
            .field("pending", &self.pending.borrow().len())
            .field("version", &self.version.peek())
            .finish()
    }
}

const HASH_PARAM: &str = "?asset-hash=";

fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://") || src.starts_with("data:")
}

impl ImagePool {
    /// Pool reading local files relative to `asset_root`.
    pub fn new(asset_root: impl Into<PathBuf>, asset_hash: impl Into<String>) -> Self {
        let root: PathBuf = asset_root.into();
        let loader_root = root.clone();
        Self::with_loader(
            root,
            asset_hash,
            Box::new(move |key: &str| {
                if is_remote(key) {
                    anyhow::bail!("remote image `{key}` needs a custom loader");
                }
                let path = key.split(HASH_PARAM).next().unwrap_or(key);
                let full = loader_root.join(path.trim_start_matches('/'));
                std::fs::read(&full).with_context(|| format!("read image {}", full.display()))
            }),
        )
    }

    pub fn with_loader(
        asset_root: impl Into<PathBuf>,
        asset_hash: impl Into<String>,
        loader: ImageLoader,
    ) -> Self {
        Self {
            asset_root: asset_root.into(),
            asset_hash: RefCell::new(asset_hash.into()),
            entries: RefCell::new(HashMap::new()),
            pending: RefCell::new(Vec::new()),
            version: Signal::new(0),
            loader,
        }
    }

    pub fn asset_hash(&self) -> String {
        self.asset_hash.borrow().clone()
    }

    /// Cache key of `src`: remote URLs as-is, local paths tagged with the asset hash.
    pub fn resolve_key(&self, src: &str) -> String {
        if is_remote(src) {
            src.to_owned()
        } else {
            format!("{src}{HASH_PARAM}{}", self.asset_hash.borrow())
        }
    }

    /// Current entry for `src`, queueing a load for unseen keys.
    pub fn request(&self, src: &str) -> ImageEntry {
        let key = self.resolve_key(src);
        let mut entries = self.entries.borrow_mut();
        if let Some(entry) = entries.get(&key) {
            return entry.clone();
        }
        entries.insert(key.clone(), ImageEntry::Pending);
        self.pending.borrow_mut().push(key);
        ImageEntry::Pending
    }

    /// Tracked read of the pool generation; bumped whenever entries are loaded or evicted.
    pub fn version(&self) -> u64 {
        self.version.get()
    }

    fn bump_version(&self) {
        self.version.set(self.version.peek().wrapping_add(1));
    }

    pub fn get(&self, src: &str) -> Option<ImageData> {
        match self.entries.borrow().get(&self.resolve_key(src)) {
            Some(ImageEntry::Ready(image)) => Some(image.clone()),
            _ => None,
        }
    }

    /// Decode `bytes` and store them under `src`, replacing any pending load.
    pub fn insert_bytes(&self, src: &str, bytes: &[u8]) -> VignetteResult<ImageData> {
        let key = self.resolve_key(src);
        let image = decode_image(bytes)?;
        self.pending.borrow_mut().retain(|k| k != &key);
        self.entries
            .borrow_mut()
            .insert(key, ImageEntry::Ready(image.clone()));
        self.bump_version();
        Ok(image)
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.borrow().is_empty()
    }

    pub fn pending_keys(&self) -> Vec<String> {
        self.pending.borrow().clone()
    }

    /// Load every queued image. Failures are logged and cached so they are not retried.
    ///
    /// Returns the number of images that became ready.
    pub fn drain_pending(&self) -> usize {
        let keys = std::mem::take(&mut *self.pending.borrow_mut());
        if keys.is_empty() {
            return 0;
        }
        let mut ready = 0;
        for key in keys {
            let entry = match (self.loader)(&key).and_then(|bytes| {
                decode_image(&bytes).map_err(|e| anyhow::anyhow!(e))
            }) {
                Ok(image) => {
                    ready += 1;
                    ImageEntry::Ready(image)
                }
                Err(error) => {
                    tracing::warn!(src = %key, error = %error, "failed to load image");
                    ImageEntry::Failed(error.to_string())
                }
            };
            self.entries.borrow_mut().insert(key, entry);
        }
        self.bump_version();
        ready
    }

    /// Switch to a new asset hash, evicting local images cached under the previous one.
    ///
    /// Must not be called while a frame is being drawn.
    pub fn set_asset_hash(&self, hash: impl Into<String>) {
        let hash = hash.into();
        if *self.asset_hash.borrow() == hash {
            return;
        }
        let old_suffix = format!("{HASH_PARAM}{}", self.asset_hash.borrow());
        self.entries
            .borrow_mut()
            .retain(|key, _| !key.ends_with(&old_suffix));
        self.pending
            .borrow_mut()
            .retain(|key| !key.ends_with(&old_suffix));
        tracing::debug!(hash = %hash, "asset hash changed, evicted local images");
        *self.asset_hash.borrow_mut() = hash;
        self.bump_version();
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/image_pool.rs"]
mod tests;
