// Host-side failures. The engine itself never errors; invalid calls are no-ops.
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Window init error: {0}")]
    WindowInit(String),
    #[error("Window update error: {0}")]
    WindowUpdate(String),
    #[error("Failed to load image {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Failed to save image {path}: {source}")]
    ImageSave {
        path: PathBuf,
        source: image::ImageError,
    },
    #[error("Image {0} has no pixels")]
    EmptyImage(PathBuf),
}
