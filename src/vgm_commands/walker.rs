//! Command Stream Walker
//!
//! Advances a cursor through the command stream one command at a time, using
//! the opcode table to find each command's length. The walker is a small state
//! machine: it keeps yielding while `Scanning` and stops for good once it
//! reaches `Done` or `Failed`.

use super::commands::{Command, DataBlockCommand, DecodedCommand, SECOND_CHIP_FLAG};
use super::data_blocks::classify;
use super::opcodes::{
    self, LengthRule, DATA_BLOCK, DATA_BLOCK_HEADER_LENGTH, DATA_BLOCK_MARKER,
    END_OF_SOUND_DATA, PCM_RAM_WRITE_LENGTH,
};
use crate::errors::{VgmError, VgmResult};
use crate::parser_config::{ParserConfig, ResourceTracker};
use crate::utils::read_u32_le_at;
use bytes::Bytes;
use serde::Serialize;

/// Why a scan stopped without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// An end-of-sound-data command was decoded
    EndOfStream,
    /// The buffer ran out before an end-of-sound-data command
    BufferExhausted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkState {
    Scanning,
    Done(Termination),
    Failed,
}

/// Iterator over the commands of one file
///
/// Yields `Ok` for every decoded command, then either stops (`Done`) or yields
/// exactly one `Err` and stops (`Failed`).
#[derive(Debug)]
pub struct StreamWalker {
    buffer: Bytes,
    cursor: usize,
    state: WalkState,
    config: ParserConfig,
    tracker: ResourceTracker,
}

impl StreamWalker {
    /// Start walking `buffer` at absolute offset `start`
    pub fn new(buffer: Bytes, start: usize, config: ParserConfig) -> Self {
        Self {
            buffer,
            cursor: start,
            state: WalkState::Scanning,
            config,
            tracker: ResourceTracker::new(),
        }
    }

    /// Offset of the next command to decode
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn state(&self) -> WalkState {
        self.state
    }

    pub fn tracker(&self) -> &ResourceTracker {
        &self.tracker
    }

    fn decode_at(&mut self, offset: usize, opcode: u8) -> VgmResult<DecodedCommand> {
        self.tracker.track_command(&self.config, offset)?;

        match opcodes::lookup(opcode, self.config.allow_reserved_opcodes) {
            LengthRule::Fixed(length) => {
                if opcodes::length_of(opcode) == LengthRule::Unknown {
                    tracing::warn!(
                        opcode = format_args!("0x{:02X}", opcode),
                        offset = format_args!("0x{:X}", offset),
                        length,
                        "skipping reserved opcode"
                    );
                }
                let bytes = self.slice_at(offset, length, opcode)?;
                Ok(DecodedCommand::Command(Command { offset, opcode, bytes }))
            },
            LengthRule::DataBlock => self.decode_data_block(offset).map(DecodedCommand::DataBlock),
            LengthRule::PcmRamWrite => {
                self.check_marker(offset, opcode)?;
                let bytes = self.slice_at(offset, PCM_RAM_WRITE_LENGTH, opcode)?;
                Ok(DecodedCommand::Command(Command { offset, opcode, bytes }))
            },
            LengthRule::Unknown => Err(VgmError::UnrecognizedOpcode { opcode, offset }),
        }
    }

    /// Slice `length` bytes at `offset`, or report how many were left
    fn slice_at(&self, offset: usize, length: usize, opcode: u8) -> VgmResult<Bytes> {
        let available = self.buffer.len().saturating_sub(offset);
        if available < length {
            return Err(VgmError::IncompleteCommand {
                opcode,
                offset,
                expected_bytes: length,
                available_bytes: available,
            });
        }
        Ok(self.buffer.slice(offset..offset + length))
    }

    fn check_marker(&self, offset: usize, opcode: u8) -> VgmResult<()> {
        match self.buffer.get(offset + 1) {
            Some(&DATA_BLOCK_MARKER) => Ok(()),
            Some(&found) => Err(VgmError::MalformedDataBlock { opcode, offset, found }),
            None => Err(VgmError::IncompleteCommand {
                opcode,
                offset,
                expected_bytes: 2,
                available_bytes: 1,
            }),
        }
    }

    fn decode_data_block(&mut self, offset: usize) -> VgmResult<DataBlockCommand> {
        self.check_marker(offset, DATA_BLOCK)?;
        let header = self.slice_at(offset, DATA_BLOCK_HEADER_LENGTH, DATA_BLOCK)?;

        let block_type = header[2];
        let raw_size = read_u32_le_at(&header, 3).ok_or(VgmError::IncompleteCommand {
            opcode: DATA_BLOCK,
            offset,
            expected_bytes: DATA_BLOCK_HEADER_LENGTH,
            available_bytes: header.len(),
        })?;

        let (declared_size, second_chip) = if self.config.literal_block_size {
            (raw_size, false)
        } else {
            (raw_size & !SECOND_CHIP_FLAG, raw_size & SECOND_CHIP_FLAG != 0)
        };

        self.config.check_data_block_size(declared_size, offset)?;

        let payload_start = offset + DATA_BLOCK_HEADER_LENGTH;
        let available = self.buffer.len() - payload_start;
        if declared_size as usize > available {
            return Err(VgmError::TruncatedDataBlock {
                offset,
                declared_size,
                available,
            });
        }

        self.tracker.track_data_block(&self.config, declared_size, offset)?;

        Ok(DataBlockCommand {
            offset,
            block_type,
            declared_size,
            second_chip,
            category: classify(block_type),
            payload: self.buffer.slice(payload_start..payload_start + declared_size as usize),
        })
    }
}

impl Iterator for StreamWalker {
    type Item = VgmResult<DecodedCommand>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state != WalkState::Scanning {
            return None;
        }

        let offset = self.cursor;
        let Some(&opcode) = self.buffer.get(offset) else {
            self.state = WalkState::Done(Termination::BufferExhausted);
            return None;
        };

        match self.decode_at(offset, opcode) {
            Ok(decoded) => {
                self.cursor = offset + decoded.length();
                if opcode == END_OF_SOUND_DATA {
                    self.state = WalkState::Done(Termination::EndOfStream);
                }
                Some(Ok(decoded))
            },
            Err(e) => {
                self.state = WalkState::Failed;
                Some(Err(e))
            },
        }
    }
}
