use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Error type for every stage of reading, decoding and ripping a VGM file.
///
/// Decode errors carry the absolute byte offset at which they were detected so a
/// malformed file can be inspected by hand. I/O errors carry the path instead.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum VgmError {
    // ========== I/O ERRORS (1000-1099) ==========
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Error reading file contents
    #[error("Failed to read file {path}: {reason}")]
    FileReadError { path: String, reason: String },

    /// Permission denied when accessing file
    #[error("Permission denied accessing file: {path}")]
    PermissionDenied { path: String },

    // ========== FORMAT ERRORS (2000-2099) ==========
    /// Bad signature or a header field that cannot be read
    #[error("Malformed VGM header: {reason} at offset 0x{offset:X}")]
    MalformedHeader { reason: String, offset: usize },

    /// Offset field in the header points outside the file
    #[error("Invalid offset in header: {field}=0x{offset:X}, file size={file_size}")]
    InvalidOffset {
        field: String,
        offset: usize,
        file_size: usize,
    },

    /// Input is neither VGM nor gzip, or failed to inflate
    #[error("Invalid data format for {field}: {details}")]
    InvalidDataFormat { field: String, details: String },

    // ========== COMMAND ERRORS (4000-4099) ==========
    /// Opcode not present in the command table
    #[error("Unrecognized opcode 0x{opcode:02X} at offset 0x{offset:X}")]
    UnrecognizedOpcode { opcode: u8, offset: usize },

    /// Fixed-length command cut off by the end of the buffer
    #[error("Incomplete command 0x{opcode:02X} at offset 0x{offset:X}: expected {expected_bytes} bytes, only {available_bytes} available")]
    IncompleteCommand {
        opcode: u8,
        offset: usize,
        expected_bytes: usize,
        available_bytes: usize,
    },

    // ========== RESOURCE ERRORS (6000-6099) ==========
    /// A configured scan budget was exceeded
    #[error("Limit exceeded for {field} at offset 0x{offset:X}: {size} (limit: {limit})")]
    DataSizeExceedsLimit {
        field: String,
        size: usize,
        limit: usize,
        offset: usize,
    },

    // ========== DATA BLOCK ERRORS (8000-8099) ==========
    /// Data block or PCM RAM write without the 0x66 compatibility marker
    #[error("Malformed data block command 0x{opcode:02X} at offset 0x{offset:X}: expected marker 0x66, found 0x{found:02X}")]
    MalformedDataBlock { opcode: u8, offset: usize, found: u8 },

    /// Declared data block size runs past the end of the buffer
    #[error("Truncated data block at offset 0x{offset:X}: declared {declared_size} bytes, only {available} available")]
    TruncatedDataBlock {
        offset: usize,
        declared_size: u32,
        available: usize,
    },

    // ========== OUTPUT ERRORS (9000-9099) ==========
    /// The output collaborator could not persist a payload
    #[error("Failed to write data block #{index} (offset 0x{offset:X}) to {path}: {reason}")]
    ArtifactWriteFailure {
        path: String,
        index: usize,
        offset: usize,
        reason: String,
    },
}

impl VgmError {
    /// Get the error code for machine-readable processing
    pub fn code(&self) -> u16 {
        match self {
            // I/O Errors (1000-1099)
            Self::FileNotFound { .. } => 1001,
            Self::FileReadError { .. } => 1002,
            Self::PermissionDenied { .. } => 1003,

            // Format Errors (2000-2099)
            Self::MalformedHeader { .. } => 2001,
            Self::InvalidOffset { .. } => 2002,
            Self::InvalidDataFormat { .. } => 2003,

            // Command Errors (4000-4099)
            Self::UnrecognizedOpcode { .. } => 4001,
            Self::IncompleteCommand { .. } => 4002,

            // Resource Errors (6000-6099)
            Self::DataSizeExceedsLimit { .. } => 6001,

            // Data Block Errors (8000-8099)
            Self::MalformedDataBlock { .. } => 8001,
            Self::TruncatedDataBlock { .. } => 8002,

            // Output Errors (9000-9099)
            Self::ArtifactWriteFailure { .. } => 9001,
        }
    }

    /// Get the error category for grouping related errors
    pub fn category(&self) -> ErrorCategory {
        match self.code() {
            1000..=1099 => ErrorCategory::IO,
            2000..=2099 => ErrorCategory::Format,
            4000..=4099 => ErrorCategory::CommandParsing,
            6000..=6099 => ErrorCategory::Resource,
            8000..=8099 => ErrorCategory::DataBlock,
            9000..=9099 => ErrorCategory::Output,
            _ => ErrorCategory::Unknown,
        }
    }

    /// Byte offset in the decoded buffer where the error was detected
    pub fn offset(&self) -> Option<usize> {
        match self {
            Self::MalformedHeader { offset, .. }
            | Self::InvalidOffset { offset, .. }
            | Self::UnrecognizedOpcode { offset, .. }
            | Self::IncompleteCommand { offset, .. }
            | Self::DataSizeExceedsLimit { offset, .. }
            | Self::MalformedDataBlock { offset, .. }
            | Self::TruncatedDataBlock { offset, .. }
            | Self::ArtifactWriteFailure { offset, .. } => Some(*offset),
            Self::FileNotFound { .. }
            | Self::FileReadError { .. }
            | Self::PermissionDenied { .. }
            | Self::InvalidDataFormat { .. } => None,
        }
    }

    /// Check if the scan can keep going after this error
    ///
    /// Only output failures are recoverable: once the stream alignment is in
    /// doubt nothing after the failing command can be trusted.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::ArtifactWriteFailure { .. })
    }

    /// Get suggested action for handling this error
    pub fn suggested_action(&self) -> &'static str {
        match self {
            Self::FileNotFound { .. } => "Check file path and ensure file exists",
            Self::PermissionDenied { .. } => "Check file permissions and user access rights",
            Self::MalformedHeader { .. } => "Verify this is a valid VGM file",
            Self::UnrecognizedOpcode { .. } => {
                "File may use commands from a newer VGM specification, try --allow-reserved"
            },
            Self::TruncatedDataBlock { .. } | Self::IncompleteCommand { .. } => {
                "File appears to be corrupted or truncated"
            },
            Self::DataSizeExceedsLimit { .. } => "Raise the scan limits or use permissive mode",
            Self::ArtifactWriteFailure { .. } => "Check free space and output directory permissions",
            _ => "Check file integrity and VGM specification compliance",
        }
    }
}

/// Error categories for grouping related error types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    IO,
    Format,
    CommandParsing,
    Resource,
    DataBlock,
    Output,
    Unknown,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IO => write!(f, "I/O"),
            Self::Format => write!(f, "Format"),
            Self::CommandParsing => write!(f, "Command Parsing"),
            Self::Resource => write!(f, "Resource"),
            Self::DataBlock => write!(f, "Data Block"),
            Self::Output => write!(f, "Output"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Result type alias for VGM operations
pub type VgmResult<T> = Result<T, VgmError>;

impl VgmError {
    /// Map an I/O error to the matching variant, keeping the path it happened on
    pub fn from_io(err: &std::io::Error, path: &str) -> Self {
        match err.kind() {
            std::io::ErrorKind::NotFound => VgmError::FileNotFound {
                path: path.to_string(),
            },
            std::io::ErrorKind::PermissionDenied => VgmError::PermissionDenied {
                path: path.to_string(),
            },
            _ => VgmError::FileReadError {
                path: path.to_string(),
                reason: err.to_string(),
            },
        }
    }
}

impl From<std::io::Error> for VgmError {
    fn from(err: std::io::Error) -> Self {
        VgmError::from_io(&err, "unknown")
    }
}
