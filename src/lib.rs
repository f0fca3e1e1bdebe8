pub mod decoder;
pub mod errors;
pub mod extractor;
pub mod header;
pub mod parser_config;
pub mod traits;
pub mod utils;
pub mod validation;
pub mod vgm_commands;

pub use decoder::*;
pub use errors::*;
pub use extractor::*;
pub use header::*;
pub use parser_config::*;
pub use traits::*;
pub use validation::*;
pub use vgm_commands::*;

use std::path::{Path, PathBuf};

use bytes::Bytes;

/// A VGM file loaded into memory, inflated when it was a `.vgz`
#[derive(Debug, Clone)]
pub struct VgmFile {
    /// Where the file came from, used to name extracted artifacts
    pub source: Option<PathBuf>,
    pub data: Bytes,
}

impl VgmFile {
    /// Load a VGM or VGZ file from disk
    pub fn from_path(path: impl AsRef<Path>) -> VgmResult<Self> {
        let path = path.as_ref();
        let data = utils::load_vgm_file(path)?;
        Ok(Self {
            source: Some(path.to_path_buf()),
            data: Bytes::from(data),
        })
    }

    /// Wrap an in-memory file, gzip content is inflated
    pub fn from_bytes(data: Vec<u8>) -> VgmResult<Self> {
        Ok(Self {
            source: None,
            data: Bytes::from(utils::inflate_if_gzipped(data)?),
        })
    }

    /// File name used as the artifact prefix
    pub fn source_name(&self) -> String {
        self.source
            .as_deref()
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "vgm".to_string())
    }

    /// Decode without writing anything
    pub fn decode(&self, config: &ParserConfig) -> VgmResult<DecodeOutcome> {
        decode(self.data.clone(), config)
    }

    /// Decode and hand every data block to `sink`
    pub fn extract(
        &self,
        config: &ParserConfig,
        sink: &mut dyn BlockSink,
        observer: &mut dyn DecodeObserver,
    ) -> VgmResult<DecodeOutcome> {
        decode_with(self.data.clone(), config, Some(sink), observer)
    }
}

/// Extract every data block of the file at `path`
///
/// Artifacts land next to the source file unless `out_dir` is given.
pub fn rip_path(
    path: impl AsRef<Path>,
    out_dir: Option<&Path>,
    config: &ParserConfig,
) -> VgmResult<DecodeOutcome> {
    let path = path.as_ref();
    let file = VgmFile::from_path(path)?;
    let mut sink = FileSink::for_source(path, out_dir);
    file.extract(config, &mut sink, &mut TracingObserver)
}
