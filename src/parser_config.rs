use crate::errors::{VgmError, VgmResult};

/// Configuration for scan budgets and decoding leniency
///
/// Budgets are optional so the default decoder walks any file to its end. A
/// caller processing untrusted or very large input can bound the scan with
/// [`ParserConfig::security_focused`] or its own limits.
#[derive(Debug, Clone, Default)]
pub struct ParserConfig {
    /// Maximum number of commands to decode before failing the scan
    pub max_commands: Option<usize>,

    /// Maximum payload size of a single data block (bytes)
    pub max_data_block_size: Option<u32>,

    /// Maximum payload bytes across all data blocks of one file
    pub max_total_data_block_bytes: Option<usize>,

    /// Skip opcodes in the reserved ranges using their documented operand counts
    /// instead of failing on them
    pub allow_reserved_opcodes: bool,

    /// Use the data block size field as-is, without splitting off the bit 31
    /// second-chip flag
    pub literal_block_size: bool,
}

impl ParserConfig {
    /// Create a configuration with strict limits for untrusted input
    pub fn security_focused() -> Self {
        Self {
            max_commands: Some(2_000_000),
            max_data_block_size: Some(16 * 1024 * 1024),
            max_total_data_block_bytes: Some(64 * 1024 * 1024),
            allow_reserved_opcodes: false,
            literal_block_size: false,
        }
    }

    /// Create a lenient configuration for files from newer or odd rippers
    pub fn permissive() -> Self {
        Self {
            allow_reserved_opcodes: true,
            ..Self::default()
        }
    }

    /// Check if command count is within limits
    pub fn check_command_count(&self, count: usize, offset: usize) -> VgmResult<()> {
        match self.max_commands {
            Some(limit) if count > limit => Err(VgmError::DataSizeExceedsLimit {
                field: "command_count".to_string(),
                size: count,
                limit,
                offset,
            }),
            _ => Ok(()),
        }
    }

    /// Check if a data block size is acceptable
    pub fn check_data_block_size(&self, size: u32, offset: usize) -> VgmResult<()> {
        match self.max_data_block_size {
            Some(limit) if size > limit => Err(VgmError::DataSizeExceedsLimit {
                field: "data_block_size".to_string(),
                size: size as usize,
                limit: limit as usize,
                offset,
            }),
            _ => Ok(()),
        }
    }
}

/// Resource tracker for budget accounting during one scan
#[derive(Debug, Default)]
pub struct ResourceTracker {
    /// Current number of decoded commands
    pub command_count: usize,

    /// Total payload bytes of data blocks seen so far
    pub data_block_bytes: usize,

    /// Number of data blocks encountered
    pub data_block_count: usize,
}

impl ResourceTracker {
    /// Create a new resource tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Track a new command starting at `offset`
    pub fn track_command(&mut self, config: &ParserConfig, offset: usize) -> VgmResult<()> {
        self.command_count += 1;
        config.check_command_count(self.command_count, offset)
    }

    /// Track a data block payload starting at `offset`
    pub fn track_data_block(
        &mut self,
        config: &ParserConfig,
        size: u32,
        offset: usize,
    ) -> VgmResult<()> {
        config.check_data_block_size(size, offset)?;

        let new_total = self.data_block_bytes.saturating_add(size as usize);
        if let Some(limit) = config.max_total_data_block_bytes {
            if new_total > limit {
                return Err(VgmError::DataSizeExceedsLimit {
                    field: "total_data_block_bytes".to_string(),
                    size: new_total,
                    limit,
                    offset,
                });
            }
        }

        self.data_block_bytes = new_total;
        self.data_block_count += 1;

        Ok(())
    }
}
