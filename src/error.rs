use thiserror::Error;

/// Errors reported by tree operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A key element does not fit the 16-way branch fan-out.
    #[error("invalid nibble {nibble} at key position {position}")]
    InvalidNibble { position: usize, nibble: u8 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
