use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DioramaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("window error: {0}")]
    Window(String),

    #[error("failed to load texture '{}': {source}", path.display())]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("logger setup failed: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error("texture loader worker dropped the request for '{0}'")]
    LoaderDisconnected(String),
}

impl From<minifb::Error> for DioramaError {
    fn from(e: minifb::Error) -> Self {
        DioramaError::Window(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DioramaError>;
