use crate::errors::{VgmError, VgmResult};
use crate::header::VgmHeader;
use crate::vgm_commands::{Command, DataBlockCategory, DataBlockCommand};

/// One data block handed to a [`BlockSink`]
#[derive(Debug, Clone, Copy)]
pub struct BlockArtifact<'a> {
    /// Sequence number among the data blocks of the file, starting at 0
    pub index: usize,
    /// Offset of the 0x67 command
    pub offset: usize,
    pub category: DataBlockCategory,
    pub payload: &'a [u8],
}

/// Destination for extracted data block payloads
pub trait BlockSink {
    /// Store one payload and return where it went
    fn write_block(&mut self, artifact: &BlockArtifact<'_>) -> VgmResult<String>;
}

/// Hooks called while a file is decoded
///
/// Every method has an empty default so implementors pick what they need.
pub trait DecodeObserver {
    fn on_header(&mut self, _header: &VgmHeader) {}

    fn on_command(&mut self, _command: &Command) {}

    fn on_data_block(&mut self, _block: &DataBlockCommand, _index: usize) {}

    fn on_failure(&mut self, _error: &VgmError) {}
}

/// Observer that reports decoding progress through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DecodeObserver for TracingObserver {
    fn on_header(&mut self, header: &VgmHeader) {
        tracing::debug!(
            total_samples = header.total_samples,
            loop_samples = header.loop_samples,
            "decoding command stream"
        );
    }

    fn on_command(&mut self, command: &Command) {
        tracing::debug!(
            offset = format_args!("0x{:X}", command.offset),
            opcode = format_args!("0x{:02X}", command.opcode),
            name = command.name(),
            "command"
        );
    }

    fn on_data_block(&mut self, block: &DataBlockCommand, index: usize) {
        if !block.category.is_recognized() {
            tracing::debug!(
                block_type = format_args!("0x{:02X}", block.block_type),
                "no chip assigned to this block type"
            );
        }
        tracing::info!(
            index,
            offset = format_args!("0x{:X}", block.offset),
            block_type = format_args!("0x{:02X}", block.block_type),
            size = block.declared_size,
            second_chip = block.second_chip,
            "{}",
            block.category.label
        );
    }

    fn on_failure(&mut self, error: &VgmError) {
        tracing::error!(code = error.code(), category = %error.category(), "{}", error);
    }
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentObserver;

impl DecodeObserver for SilentObserver {}
