//! Decoded VGM Commands
//!
//! Commands keep their raw bytes as zero-copy [`Bytes`] views into the file
//! buffer, so decoded output can outlive the walker without copying payloads.

use super::data_blocks::DataBlockCategory;
use super::opcodes::{
    self, CommandFamily, DATA_BLOCK, DATA_BLOCK_HEADER_LENGTH, DATA_BLOCK_MARKER,
    PCM_RAM_WRITE, WAIT_735_SAMPLES, WAIT_882_SAMPLES, WAIT_N_SAMPLES,
};
use crate::utils::{read_u16_le_at, read_u24_le_at};
use bytes::{BufMut, Bytes, BytesMut};
use serde::Serialize;

/// Bit 31 of the data block size field selects the second chip
pub const SECOND_CHIP_FLAG: u32 = 0x8000_0000;

/// A PCM RAM write size field of zero means this many bytes
pub const PCM_RAM_WRITE_FULL_SIZE: u32 = 0x0100_0000;

/// One fixed-length command as it appears on stream
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Command {
    /// Absolute position of the opcode in the file
    pub offset: usize,
    pub opcode: u8,
    /// Opcode plus operands
    #[serde(skip)]
    pub bytes: Bytes,
}

impl Command {
    /// Total on-stream length, opcode included
    pub fn length(&self) -> usize {
        self.bytes.len()
    }

    pub fn operands(&self) -> &[u8] {
        self.bytes.get(1..).unwrap_or_default()
    }

    pub fn family(&self) -> CommandFamily {
        opcodes::family_of(self.opcode)
    }

    pub fn name(&self) -> &'static str {
        opcodes::name_of(self.opcode)
    }

    /// Samples this command waits for, if it is a wait
    pub fn wait_samples(&self) -> Option<u32> {
        match self.opcode {
            WAIT_N_SAMPLES => read_u16_le_at(self.operands(), 0).map(u32::from),
            WAIT_735_SAMPLES => Some(735),
            WAIT_882_SAMPLES => Some(882),
            0x70..=0x7F => Some((self.opcode & 0x0F) as u32 + 1),
            0x80..=0x8F => Some((self.opcode & 0x0F) as u32),
            _ => None,
        }
    }

    /// Decode the fields of a 0x68 command
    pub fn pcm_ram_write(&self) -> Option<PcmRamWrite> {
        if self.opcode != PCM_RAM_WRITE {
            return None;
        }
        let operands = self.operands();
        let size = read_u24_le_at(operands, 8)?;
        Some(PcmRamWrite {
            chip_type: *operands.get(1)?,
            read_offset: read_u24_le_at(operands, 2)?,
            write_offset: read_u24_le_at(operands, 5)?,
            size: if size == 0 { PCM_RAM_WRITE_FULL_SIZE } else { size },
        })
    }
}

/// Fields of a PCM RAM write command
///
/// The size describes the copy performed by the chip, it is not a length on
/// stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PcmRamWrite {
    pub chip_type: u8,
    pub read_offset: u32,
    pub write_offset: u32,
    pub size: u32,
}

/// A 0x67 data block with its payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataBlockCommand {
    pub offset: usize,
    pub block_type: u8,
    /// Payload size in bytes, second-chip flag removed unless read literally
    pub declared_size: u32,
    pub second_chip: bool,
    pub category: DataBlockCategory,
    #[serde(skip)]
    pub payload: Bytes,
}

impl DataBlockCommand {
    /// Total on-stream length, header included
    pub fn length(&self) -> usize {
        DATA_BLOCK_HEADER_LENGTH + self.payload.len()
    }

    /// Size field exactly as stored in the file
    pub fn raw_size(&self) -> u32 {
        if self.second_chip {
            self.declared_size | SECOND_CHIP_FLAG
        } else {
            self.declared_size
        }
    }

    /// Re-encode the block as it appears on stream
    pub fn to_bytes(&self) -> Bytes {
        let mut buffer = BytesMut::with_capacity(self.length());
        buffer.put_u8(DATA_BLOCK);
        buffer.put_u8(DATA_BLOCK_MARKER);
        buffer.put_u8(self.block_type);
        buffer.put_u32_le(self.raw_size());
        buffer.put_slice(&self.payload);
        buffer.freeze()
    }
}

/// One unit yielded by the stream walker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedCommand {
    Command(Command),
    DataBlock(DataBlockCommand),
}

impl DecodedCommand {
    pub fn offset(&self) -> usize {
        match self {
            DecodedCommand::Command(command) => command.offset,
            DecodedCommand::DataBlock(block) => block.offset,
        }
    }

    pub fn opcode(&self) -> u8 {
        match self {
            DecodedCommand::Command(command) => command.opcode,
            DecodedCommand::DataBlock(_) => DATA_BLOCK,
        }
    }

    pub fn length(&self) -> usize {
        match self {
            DecodedCommand::Command(command) => command.length(),
            DecodedCommand::DataBlock(block) => block.length(),
        }
    }

    pub fn family(&self) -> CommandFamily {
        opcodes::family_of(self.opcode())
    }

    pub fn as_data_block(&self) -> Option<&DataBlockCommand> {
        match self {
            DecodedCommand::DataBlock(block) => Some(block),
            DecodedCommand::Command(_) => None,
        }
    }
}
