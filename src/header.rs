use serde::Serialize;

use crate::{
    errors::{VgmError, VgmResult},
    utils::{is_vgm, read_u32_le_at, version_string, VGM_MAGIC},
};

/// Versions before 1.50 have no data offset field, data always starts here
pub const LEGACY_DATA_START: usize = 0x40;

/// First version whose header stores a relative data offset at 0x34
pub const RELATIVE_DATA_OFFSET_VERSION: u32 = 0x150;

const EOF_OFFSET_FIELD: usize = 0x04;
const VERSION_FIELD: usize = 0x08;
const GD3_OFFSET_FIELD: usize = 0x14;
const TOTAL_SAMPLES_FIELD: usize = 0x18;
const LOOP_OFFSET_FIELD: usize = 0x1C;
const LOOP_SAMPLES_FIELD: usize = 0x20;
const DATA_OFFSET_FIELD: usize = 0x34;

/// The part of the VGM header needed to locate and report on the command stream.
///
/// All offsets are absolute positions in the file. The struct is computed once
/// per file and never changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VgmHeader {
    #[serde(serialize_with = "serialize_signature")]
    pub signature: [u8; 4],
    pub eof_offset: usize,
    /// BCD encoded, 0x150 for 1.50
    pub version: u32,
    pub data_start_offset: usize,
    pub gd3_offset: Option<usize>,
    pub total_samples: u32,
    pub loop_offset: Option<usize>,
    pub loop_samples: u32,
}

fn serialize_signature<S: serde::Serializer>(sig: &[u8; 4], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(sig))
}

fn read_field(data: &[u8], offset: usize, name: &str) -> VgmResult<u32> {
    read_u32_le_at(data, offset).ok_or_else(|| VgmError::MalformedHeader {
        reason: format!("cannot read {} (file is {} bytes)", name, data.len()),
        offset,
    })
}

/// Relative offset fields are stored relative to their own position, 0 means absent
fn relative_field(data: &[u8], offset: usize, name: &str) -> VgmResult<Option<usize>> {
    let value = read_field(data, offset, name)?;
    Ok((value != 0).then(|| offset + value as usize))
}

impl VgmHeader {
    /// Parse the header out of the whole file buffer
    pub fn parse(data: &[u8]) -> VgmResult<Self> {
        if !is_vgm(data) {
            return Err(VgmError::MalformedHeader {
                reason: "bad signature".to_string(),
                offset: 0,
            });
        }
        let signature = VGM_MAGIC;

        let eof_offset = read_field(data, EOF_OFFSET_FIELD, "end of file offset")? as usize
            + EOF_OFFSET_FIELD;
        let version = read_field(data, VERSION_FIELD, "version")?;

        let data_start_offset = if version < RELATIVE_DATA_OFFSET_VERSION {
            LEGACY_DATA_START
        } else {
            match read_field(data, DATA_OFFSET_FIELD, "data offset")? {
                // some 1.50 rips leave the field empty
                0 => LEGACY_DATA_START,
                relative => DATA_OFFSET_FIELD + relative as usize,
            }
        };

        let header = VgmHeader {
            signature,
            eof_offset,
            version,
            data_start_offset,
            gd3_offset: relative_field(data, GD3_OFFSET_FIELD, "GD3 offset")?,
            total_samples: read_field(data, TOTAL_SAMPLES_FIELD, "total samples")?,
            loop_offset: relative_field(data, LOOP_OFFSET_FIELD, "loop offset")?,
            loop_samples: read_field(data, LOOP_SAMPLES_FIELD, "loop samples")?,
        };

        tracing::info!(
            version = %header.version_string(),
            data_start = format_args!("0x{:X}", header.data_start_offset),
            eof = format_args!("0x{:X}", header.eof_offset),
            "VGM header parsed"
        );

        Ok(header)
    }

    pub fn version_string(&self) -> String {
        version_string(self.version)
    }

    /// Whether the data offset came from the 0x34 field rather than the legacy constant
    pub fn has_relative_data_offset(&self) -> bool {
        self.version >= RELATIVE_DATA_OFFSET_VERSION
    }
}
