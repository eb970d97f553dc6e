#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("unexpected end of data")]
    UnexpectedEof,

    #[error("address {addr:#08x} (+{len}) is outside the ROM image ({size:#x} bytes)")]
    OutOfBounds { addr: usize, len: usize, size: usize },

    #[error("not enough {what} space: need {need} bytes, {available} available")]
    AllocationExhausted {
        what: &'static str,
        need: usize,
        available: usize,
    },

    #[error("grid of {height}x{width} needs {expected} cells, got {actual}")]
    GridSize {
        height: usize,
        width: usize,
        expected: usize,
        actual: usize,
    },

    #[error("malformed document: {0}")]
    MalformedDocument(String),

    #[error("invalid layout: {0}")]
    InvalidLayout(String),

    #[error("invalid ROM: {0}")]
    InvalidRom(String),

    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
