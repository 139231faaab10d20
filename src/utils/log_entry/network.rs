use std::io::Error as IoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum NetworkEntry {
    #[error("Failed to bind port: {0}")]
    BindPortError(IoError),
}

impl From<NetworkEntry> for String {
    #[inline(always)]
    fn from(value: NetworkEntry) -> Self {
        value.to_string()
    }
}
