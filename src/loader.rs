//! Asynchronous texture loading.
//!
//! Decoding runs on the rayon pool; finished textures travel back over a channel
//! and are installed into their [`TextureSlot`] by [`TextureLoader::poll`] on the
//! thread that owns the scene. Nothing waits on a load unless asked to.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use log::{debug, info, warn};

use crate::core::material::{empty_slot, TextureSlot};
use crate::core::Texture;
use crate::error::{DioramaError, Result};

struct PendingLoad {
    name: String,
    slot: TextureSlot,
    rx: Receiver<Result<Texture>>,
}

/// What one call to [`TextureLoader::poll`] resolved.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub installed: Vec<String>,
    pub failed: Vec<String>,
}

impl LoadReport {
    pub fn is_empty(&self) -> bool {
        self.installed.is_empty() && self.failed.is_empty()
    }
}

pub struct TextureLoader {
    base_path: PathBuf,
    slots: HashMap<String, TextureSlot>,
    pending: Vec<PendingLoad>,
}

impl TextureLoader {
    pub fn new() -> Self {
        Self::with_base_path("assets")
    }

    pub fn with_base_path(base_path: impl AsRef<Path>) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
            slots: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Start decoding `path` (relative to the base path) and return the slot the
    /// texture will land in. Requesting the same path twice shares one slot.
    pub fn load(&mut self, path: &str) -> TextureSlot {
        let name = normalize_texture_path(path);
        if let Some(slot) = self.slots.get(&name) {
            return Rc::clone(slot);
        }

        let slot = empty_slot();
        let full_path = self.resolve_texture_path(&name);
        let (tx, rx) = mpsc::channel();

        debug!("Requesting texture {} from {}", name, full_path.display());
        rayon::spawn(move || {
            // the receiver may be gone if the loader was dropped, nothing to report then
            let _ = tx.send(Texture::load_from_file(&full_path));
        });

        self.pending.push(PendingLoad {
            name: name.clone(),
            slot: Rc::clone(&slot),
            rx,
        });
        self.slots.insert(name, Rc::clone(&slot));
        slot
    }

    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Install every load that finished since the last call. Failures are logged
    /// and leave their slot empty for good.
    pub fn poll(&mut self) -> LoadReport {
        let mut report = LoadReport::default();
        self.pending.retain(|load| match load.rx.try_recv() {
            Ok(result) => {
                install(load, result, &mut report);
                false
            }
            Err(TryRecvError::Empty) => true,
            Err(TryRecvError::Disconnected) => {
                install(
                    load,
                    Err(DioramaError::LoaderDisconnected(load.name.clone())),
                    &mut report,
                );
                false
            }
        });
        report
    }

    /// Block until every outstanding load has resolved.
    pub fn wait_all(&mut self) -> LoadReport {
        let mut report = LoadReport::default();
        for load in self.pending.drain(..) {
            let result = load
                .rx
                .recv()
                .unwrap_or_else(|_| Err(DioramaError::LoaderDisconnected(load.name.clone())));
            install(&load, result, &mut report);
        }
        report
    }

    fn resolve_texture_path(&self, path: &str) -> PathBuf {
        let path_obj = Path::new(path);
        if path_obj.is_absolute() {
            return path_obj.to_path_buf();
        }

        let candidate = self.base_path.join(path_obj);
        if candidate.exists() {
            return candidate;
        }

        if let Some(file_name) = path_obj.file_name() {
            let flat = self.base_path.join(file_name);
            if flat.exists() {
                return flat;
            }
        }

        // let the decoder report the missing file with the full path
        candidate
    }
}

impl Default for TextureLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn install(load: &PendingLoad, result: Result<Texture>, report: &mut LoadReport) {
    match result {
        Ok(texture) => {
            info!(
                "Loaded texture {} ({}x{})",
                load.name, texture.width, texture.height
            );
            *load.slot.borrow_mut() = Some(Arc::new(texture));
            report.installed.push(load.name.clone());
        }
        Err(e) => {
            warn!("{}; keeping surface untextured", e);
            report.failed.push(load.name.clone());
        }
    }
}

fn normalize_texture_path(path: &str) -> String {
    if std::path::MAIN_SEPARATOR == '/' {
        path.replace('\\', "/")
    } else {
        path.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "orbit_diorama_{}_{}",
            tag,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn missing_file_leaves_slot_empty() {
        let mut loader = TextureLoader::with_base_path(scratch_dir("missing"));
        let slot = loader.load("earthmap.jpg");
        assert_eq!(loader.pending(), 1);

        let report = loader.wait_all();
        assert_eq!(report.failed, vec!["earthmap.jpg".to_string()]);
        assert!(slot.borrow().is_none());
        assert_eq!(loader.pending(), 0);
        assert!(loader.poll().is_empty());
    }

    #[test]
    fn finished_load_fills_shared_slot() {
        let dir = scratch_dir("ok");
        RgbImage::from_pixel(4, 2, Rgb([0, 255, 0]))
            .save(dir.join("moonmap.png"))
            .unwrap();

        let mut loader = TextureLoader::with_base_path(&dir);
        let slot = loader.load("moonmap.png");
        let again = loader.load("moonmap.png");
        assert!(Rc::ptr_eq(&slot, &again));
        assert_eq!(loader.pending(), 1);

        let report = loader.wait_all();
        assert_eq!(report.installed, vec!["moonmap.png".to_string()]);
        let tex = slot.borrow().clone().unwrap();
        assert_eq!((tex.width, tex.height), (4, 2));
    }

    #[test]
    fn nested_request_falls_back_to_file_name() {
        let dir = scratch_dir("flat");
        RgbImage::from_pixel(1, 1, Rgb([1, 2, 3]))
            .save(dir.join("flat.png"))
            .unwrap();
        let loader = TextureLoader::with_base_path(&dir);
        assert_eq!(loader.resolve_texture_path("textures/flat.png"), dir.join("flat.png"));
    }
}
