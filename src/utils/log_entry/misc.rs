use thiserror::Error;

#[derive(Error, Debug)]
pub enum MiscEntry {
    #[error("Invalid file name")]
    InvalidFileNameError,
    #[error("Failed to read upload stream: {0}")]
    UploadStreamError(String),
}

impl From<MiscEntry> for String {
    #[inline(always)]
    fn from(value: MiscEntry) -> Self {
        value.to_string()
    }
}
