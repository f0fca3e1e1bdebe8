//! VGM Opcode Table
//!
//! Static length and naming metadata for every opcode byte. This is the wire
//! contract of the command stream: changing a length here misaligns every file
//! that uses the opcode.

use phf::phf_map;
use serde::Serialize;

pub const WAIT_N_SAMPLES: u8 = 0x61;
pub const WAIT_735_SAMPLES: u8 = 0x62;
pub const WAIT_882_SAMPLES: u8 = 0x63;
pub const END_OF_SOUND_DATA: u8 = 0x66;
pub const DATA_BLOCK: u8 = 0x67;
pub const PCM_RAM_WRITE: u8 = 0x68;

/// Compatibility byte that must follow 0x67 and 0x68
pub const DATA_BLOCK_MARKER: u8 = 0x66;

/// 0x67 0x66 tt ss ss ss ss
pub const DATA_BLOCK_HEADER_LENGTH: usize = 7;

/// 0x68 0x66 cc oo oo oo dd dd dd ss ss ss
pub const PCM_RAM_WRITE_LENGTH: usize = 12;

/// How the total on-stream length of a command is determined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LengthRule {
    /// Opcode plus operands, in bytes
    Fixed(usize),
    /// 0x67, 7 header bytes plus the declared payload size
    DataBlock,
    /// 0x68, always [`PCM_RAM_WRITE_LENGTH`] on stream
    PcmRamWrite,
    Unknown,
}

/// Coarse grouping of opcodes, used for reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum CommandFamily {
    ChipWrite,
    Wait,
    EndOfStream,
    DataBlock,
    PcmRamWrite,
    DacStreamControl,
    PcmSeek,
    Reserved,
    Unknown,
}

/// Length rule for an opcode under the documented command set.
///
/// Operand legend used below: aa register, dd data, nn sample count,
/// pp port, ss stream id, tt data type, oo offset.
pub const fn length_of(opcode: u8) -> LengthRule {
    match opcode {
        // 0x30 dd second SN76489, 0x31 dd AY8910 stereo mask,
        // 0x3F dd second Game Gear stereo, 0x4F dd Game Gear stereo, 0x50 dd SN76489
        0x30 | 0x31 | 0x3F | 0x4F | 0x50 => LengthRule::Fixed(2),
        // 0x40 aa dd Mikey, 0x51..0x5F aa dd YM family register writes
        0x40 | 0x51..=0x5F => LengthRule::Fixed(3),
        // 0x61 nn nn
        WAIT_N_SAMPLES => LengthRule::Fixed(3),
        WAIT_735_SAMPLES | WAIT_882_SAMPLES | END_OF_SOUND_DATA => LengthRule::Fixed(1),
        DATA_BLOCK => LengthRule::DataBlock,
        PCM_RAM_WRITE => LengthRule::PcmRamWrite,
        // wait n+1 samples, n in the low nibble
        0x70..=0x7F => LengthRule::Fixed(1),
        // YM2612 port 0 address 2A write from the data bank, then wait n samples
        0x80..=0x8F => LengthRule::Fixed(1),
        // 0x90 ss tt pp cc setup stream
        0x90 => LengthRule::Fixed(5),
        // 0x91 ss dd ll bb set stream data
        0x91 => LengthRule::Fixed(5),
        // 0x92 ss ff ff ff ff set stream frequency
        0x92 => LengthRule::Fixed(6),
        // 0x93 ss aa aa aa aa mm ll ll ll ll start stream
        0x93 => LengthRule::Fixed(11),
        // 0x94 ss stop stream
        0x94 => LengthRule::Fixed(2),
        // 0x95 ss bb bb ff start stream fast
        0x95 => LengthRule::Fixed(5),
        // 0xA0 aa dd AY8910, 0xA1..0xAF second chip YM writes, 0xB0..0xBF aa dd
        0xA0..=0xBF => LengthRule::Fixed(3),
        // 0xC0..0xC8 bbaa dd / pp aa dd, 0xD0..0xD6 pp aa dd
        0xC0..=0xC8 | 0xD0..=0xD6 => LengthRule::Fixed(4),
        // 0xE0 dddddddd PCM seek, 0xE1 mmll aadd C352
        0xE0 | 0xE1 => LengthRule::Fixed(5),
        _ => LengthRule::Unknown,
    }
}

/// Documented width of opcodes reserved for future chips
pub const fn reserved_length(opcode: u8) -> Option<usize> {
    match opcode {
        0x32..=0x3E => Some(2),
        0x41..=0x4E => Some(3),
        0xC9..=0xCF | 0xD7..=0xDF => Some(4),
        0xE2..=0xFF => Some(5),
        _ => None,
    }
}

/// Length rule honouring the reserved-opcode leniency switch
pub fn lookup(opcode: u8, allow_reserved: bool) -> LengthRule {
    match length_of(opcode) {
        LengthRule::Unknown if allow_reserved => match reserved_length(opcode) {
            Some(length) => LengthRule::Fixed(length),
            None => LengthRule::Unknown,
        },
        rule => rule,
    }
}

pub fn family_of(opcode: u8) -> CommandFamily {
    match opcode {
        WAIT_N_SAMPLES | WAIT_735_SAMPLES | WAIT_882_SAMPLES | 0x70..=0x7F => CommandFamily::Wait,
        END_OF_SOUND_DATA => CommandFamily::EndOfStream,
        DATA_BLOCK => CommandFamily::DataBlock,
        PCM_RAM_WRITE => CommandFamily::PcmRamWrite,
        0x90..=0x95 => CommandFamily::DacStreamControl,
        0xE0 => CommandFamily::PcmSeek,
        // 0x80..0x8F write the DAC and wait, counted with chip writes
        _ if matches!(length_of(opcode), LengthRule::Fixed(_)) => CommandFamily::ChipWrite,
        _ if reserved_length(opcode).is_some() => CommandFamily::Reserved,
        _ => CommandFamily::Unknown,
    }
}

static OPCODE_NAMES: phf::Map<u8, &'static str> = phf_map! {
    0x30u8 => "SN76489 #2 write",
    0x31u8 => "AY8910 stereo mask",
    0x3Fu8 => "Game Gear PSG #2 stereo",
    0x40u8 => "Mikey write",
    0x4Fu8 => "Game Gear PSG stereo",
    0x50u8 => "SN76489 write",
    0x51u8 => "YM2413 write",
    0x52u8 => "YM2612 port 0 write",
    0x53u8 => "YM2612 port 1 write",
    0x54u8 => "YM2151 write",
    0x55u8 => "YM2203 write",
    0x56u8 => "YM2608 port 0 write",
    0x57u8 => "YM2608 port 1 write",
    0x58u8 => "YM2610 port 0 write",
    0x59u8 => "YM2610 port 1 write",
    0x5Au8 => "YM3812 write",
    0x5Bu8 => "YM3526 write",
    0x5Cu8 => "Y8950 write",
    0x5Du8 => "YMZ280B write",
    0x5Eu8 => "YMF262 port 0 write",
    0x5Fu8 => "YMF262 port 1 write",
    0x61u8 => "Wait n samples",
    0x62u8 => "Wait 735 samples",
    0x63u8 => "Wait 882 samples",
    0x66u8 => "End of sound data",
    0x67u8 => "Data block",
    0x68u8 => "PCM RAM write",
    0x90u8 => "DAC stream setup",
    0x91u8 => "DAC stream set data",
    0x92u8 => "DAC stream set frequency",
    0x93u8 => "DAC stream start",
    0x94u8 => "DAC stream stop",
    0x95u8 => "DAC stream start fast",
    0xA0u8 => "AY8910 write",
    0xA1u8 => "YM2413 #2 write",
    0xA2u8 => "YM2612 #2 port 0 write",
    0xA3u8 => "YM2612 #2 port 1 write",
    0xA4u8 => "YM2151 #2 write",
    0xA5u8 => "YM2203 #2 write",
    0xA6u8 => "YM2608 #2 port 0 write",
    0xA7u8 => "YM2608 #2 port 1 write",
    0xA8u8 => "YM2610 #2 port 0 write",
    0xA9u8 => "YM2610 #2 port 1 write",
    0xAAu8 => "YM3812 #2 write",
    0xABu8 => "YM3526 #2 write",
    0xACu8 => "Y8950 #2 write",
    0xADu8 => "YMZ280B #2 write",
    0xAEu8 => "YMF262 #2 port 0 write",
    0xAFu8 => "YMF262 #2 port 1 write",
    0xB0u8 => "RF5C68 write",
    0xB1u8 => "RF5C164 write",
    0xB2u8 => "PWM write",
    0xB3u8 => "GameBoy DMG write",
    0xB4u8 => "NES APU write",
    0xB5u8 => "MultiPCM write",
    0xB6u8 => "uPD7759 write",
    0xB7u8 => "OKIM6258 write",
    0xB8u8 => "OKIM6295 write",
    0xB9u8 => "HuC6280 write",
    0xBAu8 => "K053260 write",
    0xBBu8 => "Pokey write",
    0xBCu8 => "WonderSwan write",
    0xBDu8 => "SAA1099 write",
    0xBEu8 => "ES5506 write",
    0xBFu8 => "GA20 write",
    0xC0u8 => "Sega PCM write",
    0xC1u8 => "RF5C68 memory write",
    0xC2u8 => "RF5C164 memory write",
    0xC3u8 => "MultiPCM set bank",
    0xC4u8 => "QSound write",
    0xC5u8 => "SCSP write",
    0xC6u8 => "WonderSwan memory write",
    0xC7u8 => "VSU write",
    0xC8u8 => "X1-010 write",
    0xD0u8 => "YMF278B write",
    0xD1u8 => "YMF271 write",
    0xD2u8 => "K051649 write",
    0xD3u8 => "K054539 write",
    0xD4u8 => "C140 write",
    0xD5u8 => "ES5503 write",
    0xD6u8 => "ES5506 16-bit write",
    0xE0u8 => "PCM data bank seek",
    0xE1u8 => "C352 write",
};

/// Display name of an opcode
pub fn name_of(opcode: u8) -> &'static str {
    if let Some(name) = OPCODE_NAMES.get(&opcode) {
        return name;
    }
    match opcode {
        0x70..=0x7F => "Wait n+1 samples",
        0x80..=0x8F => "YM2612 DAC write and wait",
        _ if reserved_length(opcode).is_some() => "Reserved",
        _ => "Unknown",
    }
}
