//! Whole-file decoding
//!
//! Reads the header, walks the command stream, and forwards data blocks to an
//! optional extractor. Header problems fail the call. Problems inside the
//! command stream end the scan but are returned inside [`DecodeOutcome`]
//! together with everything decoded before them.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::Serialize;

use crate::errors::{VgmError, VgmResult};
use crate::extractor::{ArtifactRecord, DataBlockExtractor};
use crate::header::VgmHeader;
use crate::parser_config::ParserConfig;
use crate::traits::{BlockSink, DecodeObserver, TracingObserver};
use crate::validation::{HeaderValidator, HeaderWarning};
use crate::vgm_commands::{
    CommandFamily, DataBlockCommand, DecodedCommand, StreamWalker, Termination, WalkState,
};

/// Everything learned from one pass over a file
#[derive(Debug, Clone, Serialize)]
pub struct DecodeOutcome {
    pub header: VgmHeader,
    pub header_warnings: Vec<HeaderWarning>,
    /// Data blocks in stream order
    pub blocks: Vec<DataBlockCommand>,
    pub commands_decoded: usize,
    pub family_counts: BTreeMap<CommandFamily, usize>,
    /// Sum of all wait commands, comparable to `header.total_samples`
    pub wait_samples: u64,
    /// Offset just past the last decoded command
    pub end_offset: usize,
    /// `None` when the scan failed, see `error`
    pub termination: Option<Termination>,
    pub error: Option<VgmError>,
    pub artifacts: Vec<ArtifactRecord>,
    pub write_failures: Vec<VgmError>,
}

impl DecodeOutcome {
    /// No stream error and no failed writes
    pub fn is_clean(&self) -> bool {
        self.error.is_none() && self.write_failures.is_empty()
    }

    pub fn count_of(&self, family: CommandFamily) -> usize {
        self.family_counts.get(&family).copied().unwrap_or(0)
    }
}

/// Decode a file buffer without extracting anything
pub fn decode(data: impl Into<Bytes>, config: &ParserConfig) -> VgmResult<DecodeOutcome> {
    decode_with(data.into(), config, None, &mut TracingObserver)
}

/// Decode a file buffer, writing data blocks to `sink` when one is given
pub fn decode_with(
    data: Bytes,
    config: &ParserConfig,
    sink: Option<&mut dyn BlockSink>,
    observer: &mut dyn DecodeObserver,
) -> VgmResult<DecodeOutcome> {
    let header = VgmHeader::parse(&data)?;
    let header_warnings = HeaderValidator::validate(&header, data.len())?;
    observer.on_header(&header);

    let mut extractor = sink.map(DataBlockExtractor::new);
    let mut walker = StreamWalker::new(data, header.data_start_offset, config.clone());

    let mut blocks = Vec::new();
    let mut family_counts = BTreeMap::new();
    let mut commands_decoded = 0;
    let mut wait_samples = 0u64;
    let mut error = None;

    for item in walker.by_ref() {
        let decoded = match item {
            Ok(decoded) => decoded,
            Err(e) => {
                observer.on_failure(&e);
                error = Some(e);
                break;
            },
        };

        commands_decoded += 1;
        *family_counts.entry(decoded.family()).or_insert(0) += 1;

        match decoded {
            DecodedCommand::Command(command) => {
                wait_samples += command.wait_samples().unwrap_or(0) as u64;
                observer.on_command(&command);
            },
            DecodedCommand::DataBlock(block) => {
                let index = match extractor.as_mut() {
                    Some(extractor) => extractor.on_data_block(&block),
                    None => blocks.len(),
                };
                observer.on_data_block(&block, index);
                blocks.push(block);
            },
        }
    }

    let termination = match walker.state() {
        WalkState::Done(termination) => Some(termination),
        WalkState::Failed | WalkState::Scanning => None,
    };
    if termination == Some(Termination::BufferExhausted) {
        tracing::warn!(
            offset = format_args!("0x{:X}", walker.cursor()),
            "command stream ended without end of sound data"
        );
    }

    let (artifacts, write_failures) = match extractor {
        Some(extractor) => extractor.finish(),
        None => (Vec::new(), Vec::new()),
    };

    tracing::info!(
        commands = commands_decoded,
        blocks = blocks.len(),
        written = artifacts.len(),
        payload_bytes = walker.tracker().data_block_bytes,
        "scan finished"
    );

    Ok(DecodeOutcome {
        header,
        header_warnings,
        blocks,
        commands_decoded,
        family_counts,
        wait_samples,
        end_offset: walker.cursor(),
        termination,
        error,
        artifacts,
        write_failures,
    })
}
