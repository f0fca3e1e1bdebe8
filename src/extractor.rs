//! Data Block Extraction
//!
//! Numbers data blocks in stream order and hands each payload to a
//! [`BlockSink`]. A failed write is recorded and the scan goes on, so one
//! unwritable artifact never hides the blocks after it.

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::errors::{VgmError, VgmResult};
use crate::traits::{BlockArtifact, BlockSink};
use crate::vgm_commands::{DataBlockCategory, DataBlockCommand};

/// Name of the artifact for the `index`-th data block of `source_name`
///
/// `song.vgm` and index 10 give `song.vgm_data_block_0xa.raw`.
pub fn artifact_file_name(source_name: &str, index: usize) -> String {
    format!("{}_data_block_{:#x}.raw", source_name, index)
}

/// A payload that reached its sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactRecord {
    pub index: usize,
    pub offset: usize,
    pub block_type: u8,
    pub category: DataBlockCategory,
    pub size: usize,
    pub location: String,
}

/// Subscribes to decoded data blocks and writes their payloads
pub struct DataBlockExtractor<'s> {
    sink: &'s mut dyn BlockSink,
    next_index: usize,
    records: Vec<ArtifactRecord>,
    failures: Vec<VgmError>,
}

impl<'s> DataBlockExtractor<'s> {
    pub fn new(sink: &'s mut dyn BlockSink) -> Self {
        Self {
            sink,
            next_index: 0,
            records: Vec::new(),
            failures: Vec::new(),
        }
    }

    /// Write one block, returns the sequence index it was given
    ///
    /// The index advances even when the write fails, so artifact names always
    /// match the block's position in the stream.
    pub fn on_data_block(&mut self, block: &DataBlockCommand) -> usize {
        let index = self.next_index;
        self.next_index += 1;

        let artifact = BlockArtifact {
            index,
            offset: block.offset,
            category: block.category,
            payload: &block.payload,
        };

        match self.sink.write_block(&artifact) {
            Ok(location) => self.records.push(ArtifactRecord {
                index,
                offset: block.offset,
                block_type: block.block_type,
                category: block.category,
                size: block.payload.len(),
                location,
            }),
            Err(e) => {
                tracing::warn!(index, error = %e, "data block not written");
                self.failures.push(e);
            },
        }

        index
    }

    /// Blocks seen so far
    pub fn blocks_seen(&self) -> usize {
        self.next_index
    }

    /// Written artifacts and collected write failures
    pub fn finish(self) -> (Vec<ArtifactRecord>, Vec<VgmError>) {
        (self.records, self.failures)
    }
}

/// Writes each payload to its own file
#[derive(Debug, Clone)]
pub struct FileSink {
    out_dir: PathBuf,
    source_name: String,
}

impl FileSink {
    pub fn new(out_dir: impl Into<PathBuf>, source_name: impl Into<String>) -> Self {
        Self {
            out_dir: out_dir.into(),
            source_name: source_name.into(),
        }
    }

    /// Sink writing next to `source`, or into `out_dir` when given
    pub fn for_source(source: &Path, out_dir: Option<&Path>) -> Self {
        let source_name = source
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "vgm".to_string());
        let dir = match out_dir {
            Some(dir) => dir.to_path_buf(),
            None => source.parent().map(Path::to_path_buf).unwrap_or_default(),
        };
        Self::new(dir, source_name)
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.out_dir.join(artifact_file_name(&self.source_name, index))
    }
}

impl BlockSink for FileSink {
    fn write_block(&mut self, artifact: &BlockArtifact<'_>) -> VgmResult<String> {
        let path = self.path_for(artifact.index);
        let location = path.display().to_string();

        std::fs::write(&path, artifact.payload).map_err(|e| VgmError::ArtifactWriteFailure {
            path: location.clone(),
            index: artifact.index,
            offset: artifact.offset,
            reason: e.to_string(),
        })?;

        tracing::info!(path = %location, bytes = artifact.payload.len(), "wrote data block");
        Ok(location)
    }
}

/// Keeps payloads in memory, used for dry runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    source_name: String,
    pub artifacts: Vec<(String, DataBlockCategory, Vec<u8>)>,
}

impl MemorySink {
    pub fn new(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            artifacts: Vec::new(),
        }
    }
}

impl BlockSink for MemorySink {
    fn write_block(&mut self, artifact: &BlockArtifact<'_>) -> VgmResult<String> {
        let name = artifact_file_name(&self.source_name, artifact.index);
        self.artifacts
            .push((name.clone(), artifact.category, artifact.payload.to_vec()));
        Ok(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vgm_commands::classify;
    use bytes::Bytes;

    fn block(offset: usize, block_type: u8, payload: &'static [u8]) -> DataBlockCommand {
        DataBlockCommand {
            offset,
            block_type,
            declared_size: payload.len() as u32,
            second_chip: false,
            category: classify(block_type),
            payload: Bytes::from_static(payload),
        }
    }

    /// Fails every other write
    struct FlakySink {
        calls: usize,
    }

    impl BlockSink for FlakySink {
        fn write_block(&mut self, artifact: &BlockArtifact<'_>) -> VgmResult<String> {
            self.calls += 1;
            if self.calls % 2 == 0 {
                return Err(VgmError::ArtifactWriteFailure {
                    path: "nowhere".to_string(),
                    index: artifact.index,
                    offset: artifact.offset,
                    reason: "disk full".to_string(),
                });
            }
            Ok(format!("slot{}", artifact.index))
        }
    }

    #[test]
    fn test_artifact_names_use_lowercase_hex() {
        assert_eq!(artifact_file_name("song.vgm", 0), "song.vgm_data_block_0x0.raw");
        assert_eq!(artifact_file_name("song.vgm", 10), "song.vgm_data_block_0xa.raw");
        assert_eq!(artifact_file_name("a.vgz", 255), "a.vgz_data_block_0xff.raw");
    }

    #[test]
    fn test_memory_sink_collects_in_order() {
        let mut sink = MemorySink::new("song.vgm");
        let mut extractor = DataBlockExtractor::new(&mut sink);
        assert_eq!(extractor.on_data_block(&block(0x40, 0x00, &[1, 2])), 0);
        assert_eq!(extractor.on_data_block(&block(0x49, 0x81, &[3])), 1);
        let (records, failures) = extractor.finish();

        assert!(failures.is_empty());
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].location, "song.vgm_data_block_0x1.raw");
        assert_eq!(records[1].category.label, "YM2608 DELTA-T ROM data");
        assert_eq!(sink.artifacts[0].2, vec![1, 2]);
    }

    #[test]
    fn test_write_failures_do_not_stop_numbering() {
        let mut sink = FlakySink { calls: 0 };
        let mut extractor = DataBlockExtractor::new(&mut sink);
        for offset in 0..3 {
            extractor.on_data_block(&block(offset, 0x00, &[0xAA]));
        }
        assert_eq!(extractor.blocks_seen(), 3);

        let (records, failures) = extractor.finish();
        assert_eq!(records.iter().map(|r| r.index).collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(failures.len(), 1);
        assert!(failures[0].is_recoverable());
        assert!(matches!(failures[0], VgmError::ArtifactWriteFailure { index: 1, .. }));
    }

    #[test]
    fn test_file_sink_writes_next_to_source() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("song.vgm");
        let mut sink = FileSink::for_source(&source, None);

        let artifact = BlockArtifact {
            index: 3,
            offset: 0x40,
            category: classify(0x00),
            payload: &[9, 8, 7],
        };
        let location = sink.write_block(&artifact).unwrap();

        let expected = dir.path().join("song.vgm_data_block_0x3.raw");
        assert_eq!(location, expected.display().to_string());
        assert_eq!(std::fs::read(expected).unwrap(), vec![9, 8, 7]);
    }

    #[test]
    fn test_file_sink_reports_unwritable_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("does-not-exist");
        let mut sink = FileSink::new(&missing, "song.vgm");

        let artifact = BlockArtifact {
            index: 0,
            offset: 0x40,
            category: classify(0x00),
            payload: &[1],
        };
        match sink.write_block(&artifact).unwrap_err() {
            VgmError::ArtifactWriteFailure { index, offset, path, .. } => {
                assert_eq!(index, 0);
                assert_eq!(offset, 0x40);
                assert!(path.ends_with("song.vgm_data_block_0x0.raw"));
            },
            other => panic!("Expected ArtifactWriteFailure, got {:?}", other),
        }
    }
}
