use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    /// The source file could not be opened. Malformed contents never produce an error.
    #[error("failed to open {}", path.display())]
    NotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ParseError>;
