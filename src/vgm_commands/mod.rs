//! VGM Commands Module
//!
//! Opcode table, command types, data block classification, and the stream
//! walker that ties them together.

pub mod commands;
pub mod data_blocks;
pub mod opcodes;
pub mod walker;

#[cfg(test)]
mod tests;

pub use commands::{Command, DataBlockCommand, DecodedCommand, PcmRamWrite};
pub use data_blocks::{classify, DataBlockCategory, DataBlockFamily};
pub use opcodes::{CommandFamily, LengthRule};
pub use walker::{StreamWalker, Termination, WalkState};
