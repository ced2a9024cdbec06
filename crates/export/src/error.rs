use std::fmt;

#[derive(Debug)]
pub enum ExportError {
    /// Workbook construction or serialization failure.
    Workbook(String),
    /// CSV serialization failure.
    Csv(String),
    /// Unknown export format name.
    Format(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Workbook(msg) | Self::Csv(msg) => write!(f, "export failed: {msg}"),
            Self::Format(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ExportError {}
