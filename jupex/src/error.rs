use thiserror::Error;

/// Broad classes of failure, used by callers to decide whether to keep going.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad magic or unsupported version. Nothing in the file can be trusted.
    Structural,
    /// Ran off the end of the data. Fatal for the section being decoded.
    Truncated,
    /// A tagged value had no known meaning. Fatal for the enclosing record.
    UnknownEnum,
    /// A referenced companion file could not be loaded.
    Resource,
    /// Geometry that does not fit its buffers or references.
    Geometry,
}

#[derive(Debug, Error)]
pub enum JupexError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid magic at offset {offset:#x}: expected {expected:?}, found {found:?}")]
    InvalidMagic {
        offset: usize,
        expected: [u8; 4],
        found: [u8; 4],
    },

    #[error("unsupported version {found} at offset {offset:#x}")]
    UnsupportedVersion { offset: usize, found: u32 },

    #[error("unexpected end of data at offset {offset:#x} (need {need} bytes, have {have})")]
    TruncatedInput {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("string at offset {offset:#x} is not valid ASCII")]
    InvalidEncoding { offset: usize },

    #[error("unknown {kind} value {value} at offset {offset:#x}")]
    UnknownEnumValue {
        kind: &'static str,
        value: i64,
        offset: usize,
    },

    #[error("vertex property sentinel found inside a live property list at offset {offset:#x}")]
    UnexpectedSentinel { offset: usize },

    #[error("vertex definition at offset {offset:#x} has no terminator within {size} bytes")]
    UnterminatedVertexDefinition { offset: usize, size: usize },

    #[error("material at offset {offset:#x} does not contain any shader effects")]
    EmptyMaterial { offset: usize },

    #[error("unknown material definition type {value} at offset {offset:#x}")]
    UnknownDefType { value: u32, offset: usize },

    #[error("unknown object property type {value} at offset {offset:#x}")]
    UnknownPropertyType { value: u32, offset: usize },

    #[error("{context}: offset {offset:#x} (+{len}) outside of {available} bytes")]
    OffsetOutOfBounds {
        context: &'static str,
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("string table entry {entry} names owner {owner} but only {owners} owners exist")]
    InvalidStringOwner {
        entry: usize,
        owner: u32,
        owners: usize,
    },

    #[error("string table entry {entry}: no terminated string at {offset:#x} in {available} bytes")]
    InvalidStringEntry {
        entry: usize,
        offset: usize,
        available: usize,
    },

    #[error("{name} count {count} at {offset:#x} needs {need} bytes, only {remaining} remain")]
    ImplausibleCount {
        name: &'static str,
        count: u64,
        need: u64,
        remaining: usize,
        offset: usize,
    },

    #[error("surface references vertex definition {index} of {available}")]
    MissingVertexDefinition { index: u32, available: usize },

    #[error("config: {0}")]
    Config(String),
}

impl JupexError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            JupexError::InvalidMagic { .. } | JupexError::UnsupportedVersion { .. } => {
                ErrorKind::Structural
            }
            JupexError::TruncatedInput { .. }
            | JupexError::ImplausibleCount { .. }
            | JupexError::OffsetOutOfBounds { .. }
            | JupexError::InvalidStringEntry { .. } => ErrorKind::Truncated,
            JupexError::UnknownEnumValue { .. }
            | JupexError::UnexpectedSentinel { .. }
            | JupexError::UnterminatedVertexDefinition { .. }
            | JupexError::UnknownDefType { .. }
            | JupexError::UnknownPropertyType { .. }
            | JupexError::InvalidEncoding { .. }
            | JupexError::InvalidStringOwner { .. }
            | JupexError::EmptyMaterial { .. } => ErrorKind::UnknownEnum,
            JupexError::Io(_) | JupexError::Config(_) => ErrorKind::Resource,
            JupexError::MissingVertexDefinition { .. } => ErrorKind::Geometry,
        }
    }

    pub fn is_structural(&self) -> bool {
        self.kind() == ErrorKind::Structural
    }

    /// Byte offset the error was raised at, if it has one.
    pub fn offset(&self) -> Option<usize> {
        match *self {
            JupexError::InvalidMagic { offset, .. }
            | JupexError::UnsupportedVersion { offset, .. }
            | JupexError::TruncatedInput { offset, .. }
            | JupexError::InvalidEncoding { offset }
            | JupexError::UnknownEnumValue { offset, .. }
            | JupexError::UnexpectedSentinel { offset }
            | JupexError::UnterminatedVertexDefinition { offset, .. }
            | JupexError::EmptyMaterial { offset }
            | JupexError::UnknownDefType { offset, .. }
            | JupexError::UnknownPropertyType { offset, .. }
            | JupexError::OffsetOutOfBounds { offset, .. }
            | JupexError::InvalidStringEntry { offset, .. }
            | JupexError::ImplausibleCount { offset, .. } => Some(offset),
            JupexError::Io(_)
            | JupexError::InvalidStringOwner { .. }
            | JupexError::MissingVertexDefinition { .. }
            | JupexError::Config(_) => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, JupexError>;
