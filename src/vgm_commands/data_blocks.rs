//! Data Block Classification Module
//!
//! Maps the one-byte data block type to a family and a human-readable label.
//! Classification is total: every byte value yields a category, so an
//! unrecognised type never stops extraction.

use serde::Serialize;

/// Broad grouping of data block types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum DataBlockFamily {
    BasePcm,       // 0x00-0x3F - Uncompressed streaming PCM
    CompressedPcm, // 0x40-0x7E - Compressed streaming PCM
    RomRamContent, // 0x80-0xBF - ROM/RAM image dumps
    RamWrite,      // 0xC0-0xFF - Direct RAM writes
    Unknown,       // 0x7F - no chip label
}

/// Family and label of one data block type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DataBlockCategory {
    pub family: DataBlockFamily,
    pub label: &'static str,
}

/// Chip labels shared by the uncompressed and compressed PCM ranges
const PCM_LABELS: [&str; 8] = [
    "YM2612 PCM data",      // 0x00
    "RF5C68 PCM data",      // 0x01
    "RF5C164 PCM data",     // 0x02
    "PWM PCM data",         // 0x03
    "OKIM6258 ADPCM data",  // 0x04
    "HuC6280 PCM data",     // 0x05
    "SCSP PCM data",        // 0x06
    "NES APU DPCM data",    // 0x07
];

/// Compressed counterparts of 0x00-0x06
const COMPRESSED_PCM_LABELS: [&str; 7] = [
    "Compressed YM2612 PCM data",     // 0x40
    "Compressed RF5C68 PCM data",     // 0x41
    "Compressed RF5C164 PCM data",    // 0x42
    "Compressed PWM PCM data",        // 0x43
    "Compressed OKIM6258 ADPCM data", // 0x44
    "Compressed HuC6280 PCM data",    // 0x45
    "Compressed SCSP PCM data",       // 0x46
];

const ROM_RAM_LABELS: [&str; 20] = [
    "Sega PCM ROM data",          // 0x80
    "YM2608 DELTA-T ROM data",    // 0x81
    "YM2610 ADPCM ROM data",      // 0x82
    "YM2610 DELTA-T ROM data",    // 0x83
    "YMF278B ROM data",           // 0x84
    "YMF271 ROM data",            // 0x85
    "YMZ280B ROM data",           // 0x86
    "YMF278B RAM data",           // 0x87
    "Y8950 DELTA-T ROM data",     // 0x88
    "MultiPCM ROM data",          // 0x89
    "uPD7759 ROM data",           // 0x8A
    "OKIM6295 ROM data",          // 0x8B
    "K054539 ROM data",           // 0x8C
    "C140 ROM data",              // 0x8D
    "K053260 ROM data",           // 0x8E
    "Q-Sound ROM data",           // 0x8F
    "ES5505/ES5506 ROM data",     // 0x90
    "X1-010 ROM data",            // 0x91
    "C352 ROM data",              // 0x92
    "GA20 ROM data",              // 0x93
];

const UNIMPLEMENTED_PCM: &str = "Unimplemented data";
const UNIMPLEMENTED_COMPRESSED: &str = "Unimplemented compressed data";
const UNIMPLEMENTED_ROM_RAM: &str = "Unimplemented ROM/RAM data";
const UNKNOWN_RAM_WRITE: &str = "Unknown chip RAM write";

/// Classify a data block type byte
pub fn classify(block_type: u8) -> DataBlockCategory {
    let (family, label) = match block_type {
        0x00..=0x07 => (DataBlockFamily::BasePcm, PCM_LABELS[block_type as usize]),
        0x08..=0x3F => (DataBlockFamily::BasePcm, UNIMPLEMENTED_PCM),
        0x40..=0x46 => (
            DataBlockFamily::CompressedPcm,
            COMPRESSED_PCM_LABELS[(block_type - 0x40) as usize],
        ),
        0x47..=0x7E => (DataBlockFamily::CompressedPcm, UNIMPLEMENTED_COMPRESSED),
        0x7F => (DataBlockFamily::Unknown, "Unknown"),
        0x80..=0x93 => (
            DataBlockFamily::RomRamContent,
            ROM_RAM_LABELS[(block_type - 0x80) as usize],
        ),
        0x94..=0xBF => (DataBlockFamily::RomRamContent, UNIMPLEMENTED_ROM_RAM),
        0xC0..=0xFF => (DataBlockFamily::RamWrite, ram_write_label(block_type)),
    };

    DataBlockCategory { family, label }
}

fn ram_write_label(block_type: u8) -> &'static str {
    match block_type {
        0xC0 => "RF5C68 RAM write",
        0xC1 => "RF5C164 RAM write",
        0xC2 => "NES APU RAM write",
        0xE0 => "SCSP RAM write",
        0xE1 => "ES5503 RAM write",
        _ => UNKNOWN_RAM_WRITE,
    }
}

impl DataBlockCategory {
    /// Whether the type has a named chip rather than a placeholder label
    pub fn is_recognized(&self) -> bool {
        !matches!(
            self.label,
            UNIMPLEMENTED_PCM | UNIMPLEMENTED_COMPRESSED | UNIMPLEMENTED_ROM_RAM | UNKNOWN_RAM_WRITE | "Unknown"
        )
    }
}

impl std::fmt::Display for DataBlockCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label)
    }
}
