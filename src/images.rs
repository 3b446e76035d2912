//! Illustrations attached to wizard messages, looked up by key on disk.

use std::path::PathBuf;

use crate::channels::Image;

pub const WELCOME_IMAGE: &str = "welcome";
pub const RESULT_IMAGE: &str = "result";

/// Resolves image keys (`welcome`, `goal`, ..., `result`) to `<dir>/<key>.jpg`.
#[derive(Debug, Clone)]
pub struct ImageCatalog {
    dir: PathBuf,
}

impl ImageCatalog {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The image for `key`, or `None` if no such file exists.
    pub async fn lookup(&self, key: &str) -> Option<Image> {
        let path = self.dir.join(format!("{key}.jpg"));
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => Some(Image {
                key: key.to_string(),
                path,
            }),
            _ => {
                tracing::debug!(key, path = %path.display(), "No image for key");
                None
            }
        }
    }
}
