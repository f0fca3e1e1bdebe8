use crate::errors::{VgmError, VgmResult};
use byteorder::{ByteOrder, LittleEndian};
use flate2::read::GzDecoder;
use std::io::Read;

/// Gzip magic bytes (RFC 1952)
pub const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// VGM magic bytes
pub const VGM_MAGIC: [u8; 4] = [0x56, 0x67, 0x6d, 0x20]; // "Vgm "

/// Read a little-endian u32 at `offset`, `None` when the buffer is too short
pub fn read_u32_le_at(data: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(4)?;
    data.get(offset..end).map(LittleEndian::read_u32)
}

/// Read a little-endian u16 at `offset`, `None` when the buffer is too short
pub fn read_u16_le_at(data: &[u8], offset: usize) -> Option<u16> {
    let end = offset.checked_add(2)?;
    data.get(offset..end).map(LittleEndian::read_u16)
}

/// Read a little-endian 24-bit value at `offset`
pub fn read_u24_le_at(data: &[u8], offset: usize) -> Option<u32> {
    let end = offset.checked_add(3)?;
    data.get(offset..end).map(LittleEndian::read_u24)
}

/// Human readable version, 0x150 -> "1.50"
pub fn version_string(version: u32) -> String {
    format!("{:X}.{:02X}", version >> 8, version & 0xFF)
}

/// Detect if data is gzipped by checking magic bytes
pub fn is_gzipped(data: &[u8]) -> bool {
    data.len() >= 2 && data[0..2] == GZIP_MAGIC
}

/// Detect if data is a VGM file by checking magic bytes
pub fn is_vgm(data: &[u8]) -> bool {
    data.len() >= 4 && data[0..4] == VGM_MAGIC
}

/// Decompress gzipped data
pub fn decompress_gzip(compressed_data: &[u8]) -> VgmResult<Vec<u8>> {
    if !is_gzipped(compressed_data) {
        return Err(VgmError::InvalidDataFormat {
            field: "gzip_header".to_string(),
            details: "Data does not have valid gzip magic bytes".to_string(),
        });
    }

    let mut decoder = GzDecoder::new(compressed_data);
    let mut decompressed = Vec::new();

    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| VgmError::InvalidDataFormat {
            field: "gzip_decompression".to_string(),
            details: format!("Failed to decompress gzip data: {}", e),
        })?;

    Ok(decompressed)
}

/// Inflate `.vgz` content, pass anything else through untouched
///
/// Signature checking is left to the header reader so a non-VGM file is
/// reported as a malformed header rather than a compression problem.
pub fn inflate_if_gzipped(data: Vec<u8>) -> VgmResult<Vec<u8>> {
    if is_gzipped(&data) {
        let decompressed = decompress_gzip(&data)?;
        tracing::debug!(
            compressed = data.len(),
            decompressed = decompressed.len(),
            "inflated gzip container"
        );
        return Ok(decompressed);
    }
    Ok(data)
}

/// Read a whole file and inflate it when it is a `.vgz`
pub fn load_vgm_file(path: &std::path::Path) -> VgmResult<Vec<u8>> {
    let display = path.display().to_string();
    let file_data = std::fs::read(path).map_err(|e| VgmError::from_io(&e, &display))?;
    inflate_if_gzipped(file_data)
}
