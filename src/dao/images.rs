//! Image providers serving the raw bytes of the quiz pictures.

use std::{collections::HashMap, io::ErrorKind, path::PathBuf, sync::Arc};

use futures::{FutureExt, future::BoxFuture};
use thiserror::Error;

/// Failure to produce the bytes of an image.
#[derive(Debug, Error)]
pub enum ImageError {
    /// No image with that name exists.
    #[error("image `{name}` not found")]
    NotFound {
        /// Requested file name.
        name: String,
    },
    /// The image exists but could not be read.
    #[error("failed to read image `{name}`")]
    Io {
        /// Requested file name.
        name: String,
        /// Underlying read failure.
        #[source]
        source: std::io::Error,
    },
}

/// Source of image bytes addressed by file name (e.g. `TheDarkKnight2.png`).
pub trait ImageProvider: Send + Sync {
    /// Fetch the raw bytes of the image called `name`.
    fn load(&self, name: &str) -> BoxFuture<'static, Result<Vec<u8>, ImageError>>;
}

/// Reads images from a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryImageProvider {
    root: Arc<PathBuf>,
}

impl DirectoryImageProvider {
    /// Serve files found directly under `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Arc::new(root.into()),
        }
    }
}

impl ImageProvider for DirectoryImageProvider {
    fn load(&self, name: &str) -> BoxFuture<'static, Result<Vec<u8>, ImageError>> {
        let name = name.to_string();
        let path = self.root.join(&name);
        async move {
            tokio::fs::read(&path).await.map_err(|source| {
                if source.kind() == ErrorKind::NotFound {
                    ImageError::NotFound { name }
                } else {
                    ImageError::Io { name, source }
                }
            })
        }
        .boxed()
    }
}

/// Serves a fixed set of images held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryImageProvider {
    images: Arc<HashMap<String, Vec<u8>>>,
}

impl MemoryImageProvider {
    /// Serve a fixed set of images keyed by name.
    pub fn new(images: HashMap<String, Vec<u8>>) -> Self {
        Self {
            images: Arc::new(images),
        }
    }
}

impl ImageProvider for MemoryImageProvider {
    fn load(&self, name: &str) -> BoxFuture<'static, Result<Vec<u8>, ImageError>> {
        let result = self
            .images
            .get(name)
            .cloned()
            .ok_or_else(|| ImageError::NotFound {
                name: name.to_string(),
            });
        async move { result }.boxed()
    }
}
