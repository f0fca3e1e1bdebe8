//! VGM Test Data Builders
//!
//! Builder pattern helpers that assemble VGM files byte by byte, including
//! deliberately broken ones, for the integration tests.

use bytes::{BufMut, BytesMut};

/// Main builder for creating VGM test files with fluent API
#[derive(Debug, Default)]
pub struct VgmBuilder {
    header: HeaderBuilder,
    commands: CommandsBuilder,
}

impl VgmBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the BCD version field
    pub fn version(mut self, version: u32) -> Self {
        self.header = self.header.version(version);
        self
    }

    /// Configure header settings
    pub fn header<F>(mut self, f: F) -> Self
    where
        F: FnOnce(HeaderBuilder) -> HeaderBuilder,
    {
        self.header = f(self.header);
        self
    }

    /// Configure commands
    pub fn commands<F>(mut self, f: F) -> Self
    where
        F: FnOnce(CommandsBuilder) -> CommandsBuilder,
    {
        self.commands = f(self.commands);
        self
    }

    /// Absolute offset at which the command stream is placed
    pub fn data_start(&self) -> usize {
        self.header.stream_offset()
    }

    /// Assemble the file with consistent EOF offset
    pub fn build_bytes(self) -> Vec<u8> {
        let data_start = self.header.stream_offset();
        let stream = self.commands.build();
        let total = data_start + stream.len();

        let mut buffer = self.header.build(total);
        buffer.resize(data_start, 0);
        buffer.put_slice(&stream);
        buffer.to_vec()
    }
}

#[derive(Debug, Clone)]
pub struct HeaderBuilder {
    version: u32,
    data_start: usize,
    stored_data_offset: Option<u32>,
    eof_override: Option<u32>,
    total_samples: u32,
    loop_samples: u32,
}

impl Default for HeaderBuilder {
    fn default() -> Self {
        Self {
            version: 0x150,
            data_start: 0x40,
            stored_data_offset: None,
            eof_override: None,
            total_samples: 0,
            loop_samples: 0,
        }
    }
}

impl HeaderBuilder {
    pub fn version(mut self, version: u32) -> Self {
        self.version = version;
        self
    }

    /// Place the command stream at this absolute offset
    pub fn data_start(mut self, offset: usize) -> Self {
        self.data_start = offset;
        self
    }

    /// Write this raw value at 0x34 regardless of where the stream is placed
    pub fn stored_data_offset(mut self, value: u32) -> Self {
        self.stored_data_offset = Some(value);
        self
    }

    /// Write this raw value at 0x04 instead of the real file size
    pub fn eof_field(mut self, value: u32) -> Self {
        self.eof_override = Some(value);
        self
    }

    pub fn total_samples(mut self, samples: u32) -> Self {
        self.total_samples = samples;
        self
    }

    pub fn loop_samples(mut self, samples: u32) -> Self {
        self.loop_samples = samples;
        self
    }

    /// Where the stream lands, never inside the 0x40 byte header
    fn stream_offset(&self) -> usize {
        self.data_start.max(0x40)
    }

    fn build(&self, total_size: usize) -> BytesMut {
        let mut buffer = BytesMut::with_capacity(self.stream_offset());
        buffer.put_slice(b"Vgm "); // 0x00: Magic
        buffer.put_u32_le(self.eof_override.unwrap_or((total_size - 4) as u32)); // 0x04
        buffer.put_u32_le(self.version); // 0x08
        buffer.put_u32_le(3579545); // 0x0C: SN76489 clock
        buffer.put_u32_le(0); // 0x10: YM2413 clock
        buffer.put_u32_le(0); // 0x14: GD3 offset
        buffer.put_u32_le(self.total_samples); // 0x18
        buffer.put_u32_le(0); // 0x1C: Loop offset
        buffer.put_u32_le(self.loop_samples); // 0x20
        buffer.put_u32_le(60); // 0x24: Rate
        buffer.put_u32_le(0x0009_0010); // 0x28: SN76489 feedback / shift width
        buffer.put_u32_le(7670453); // 0x2C: YM2612 clock
        buffer.put_u32_le(0); // 0x30: YM2151 clock
        let stored = self
            .stored_data_offset
            .unwrap_or((self.stream_offset() - 0x34) as u32);
        buffer.put_u32_le(stored); // 0x34: VGM data offset
        buffer.put_u32_le(0); // 0x38: Sega PCM clock
        buffer.put_u32_le(0); // 0x3C: Sega PCM interface
        buffer
    }
}

/// Command stream builder
#[derive(Debug, Default, Clone)]
pub struct CommandsBuilder {
    bytes: Vec<u8>,
}

impl CommandsBuilder {
    /// Append bytes verbatim
    pub fn raw(mut self, bytes: &[u8]) -> Self {
        self.bytes.extend_from_slice(bytes);
        self
    }

    pub fn psg_write(self, value: u8) -> Self {
        self.raw(&[0x50, value])
    }

    pub fn ym2612_write(self, port: u8, register: u8, value: u8) -> Self {
        self.raw(&[0x52 + (port & 1), register, value])
    }

    pub fn wait(self, samples: u16) -> Self {
        let [lo, hi] = samples.to_le_bytes();
        self.raw(&[0x61, lo, hi])
    }

    pub fn wait_60hz(self) -> Self {
        self.raw(&[0x62])
    }

    pub fn data_block(self, block_type: u8, payload: &[u8]) -> Self {
        self.data_block_raw_size(block_type, payload.len() as u32, payload)
    }

    /// Data block addressed to the second chip (bit 31 of the size set)
    pub fn data_block_second_chip(self, block_type: u8, payload: &[u8]) -> Self {
        self.data_block_raw_size(block_type, payload.len() as u32 | 0x8000_0000, payload)
    }

    /// Data block whose size field is written as given
    pub fn data_block_raw_size(self, block_type: u8, size: u32, payload: &[u8]) -> Self {
        let mut block = BytesMut::new();
        block.put_u8(0x67);
        block.put_u8(0x66);
        block.put_u8(block_type);
        block.put_u32_le(size);
        block.put_slice(payload);
        self.raw(&block)
    }

    pub fn pcm_ram_write(self, chip_type: u8, read: u32, write: u32, size: u32) -> Self {
        let mut command = BytesMut::new();
        command.put_u8(0x68);
        command.put_u8(0x66);
        command.put_u8(chip_type);
        command.put_uint_le(read as u64, 3);
        command.put_uint_le(write as u64, 3);
        command.put_uint_le(size as u64, 3);
        self.raw(&command)
    }

    pub fn with_end(self) -> Self {
        self.raw(&[0x66])
    }

    pub fn build(self) -> Vec<u8> {
        self.bytes
    }
}
