use serde::Serialize;

use crate::errors::{VgmError, VgmResult};
use crate::VgmHeader;

/// Non-fatal findings from header validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind")]
pub enum HeaderWarning {
    /// The stored end-of-file offset disagrees with the actual buffer length
    EofMismatch { declared: usize, actual: usize },
    /// The GD3 tag offset points past the end of the buffer
    Gd3OutOfRange { offset: usize, actual: usize },
}

/// Offset bounds validator
pub struct HeaderValidator;

impl HeaderValidator {
    /// Check the header offsets against the buffer they were read from
    ///
    /// A data start beyond the buffer is fatal. Inconsistent bookkeeping fields
    /// are only reported, rips with a stale EOF offset are common.
    pub fn validate(header: &VgmHeader, file_size: usize) -> VgmResult<Vec<HeaderWarning>> {
        if header.data_start_offset > file_size {
            return Err(VgmError::InvalidOffset {
                field: "data_start_offset".to_string(),
                offset: header.data_start_offset,
                file_size,
            });
        }

        let mut warnings = Vec::new();

        if header.eof_offset != file_size {
            tracing::warn!(
                declared = header.eof_offset,
                actual = file_size,
                "end of file offset does not match file size"
            );
            warnings.push(HeaderWarning::EofMismatch {
                declared: header.eof_offset,
                actual: file_size,
            });
        }

        if let Some(gd3) = header.gd3_offset {
            if gd3 >= file_size {
                tracing::warn!(offset = gd3, actual = file_size, "GD3 offset beyond end of file");
                warnings.push(HeaderWarning::Gd3OutOfRange {
                    offset: gd3,
                    actual: file_size,
                });
            }
        }

        Ok(warnings)
    }
}
