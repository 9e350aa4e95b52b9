//! Output stage: normalize the emission buffer and write it to its destination.

use std::io::Write;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::normalize::{NormalizeError, SourceNormalizer};

/// File name assumed for normalization when writing to stdout.
pub const DEFAULT_FILENAME: &str = "dicon_gen.go";

/// Error raised after generation succeeded.
#[derive(Debug, Error, Diagnostic)]
pub enum OutputError {
    /// The normalizer rejected the buffer. `raw` holds the unformatted text for inspection.
    #[error("normalizer `{normalizer}` failed: {source}")]
    #[diagnostic(
        code(dicon::output::normalize),
        help("the unformatted source was printed above; run with --normalizer none to keep it")
    )]
    Normalize {
        normalizer: String,
        #[source]
        source: NormalizeError,
        raw: String,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    #[diagnostic(code(dicon::output::create_dir))]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    #[diagnostic(code(dicon::output::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Run `normalizer` over `source` and copy the result to `writer`.
///
/// Nothing reaches `writer` when normalization fails.
#[tracing::instrument(skip_all, fields(normalizer = normalizer.name(), filename = %filename.display()))]
pub fn write_out<W: Write>(
    source: &str,
    normalizer: &dyn SourceNormalizer,
    filename: &Path,
    writer: &mut W,
) -> Result<usize, OutputError> {
    let formatted = normalizer
        .normalize(filename, source)
        .map_err(|source_err| OutputError::Normalize {
            normalizer: normalizer.name().to_string(),
            source: source_err,
            raw: source.to_string(),
        })?;
    let write_error = |source: std::io::Error| OutputError::Write {
        path: filename.to_path_buf(),
        source,
    };
    writer.write_all(formatted.as_bytes()).map_err(write_error)?;
    writer.flush().map_err(write_error)?;
    Ok(formatted.len())
}

/// Where generated source ends up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl Destination {
    pub fn from_option(path: Option<PathBuf>) -> Self {
        path.map_or(Destination::Stdout, Destination::File)
    }

    /// The file name handed to normalizers.
    pub fn filename(&self) -> &Path {
        match self {
            Destination::Stdout => Path::new(DEFAULT_FILENAME),
            Destination::File(path) => path,
        }
    }

    /// Normalize and write `source`, creating parent directories of a file destination.
    ///
    /// A file is only created once normalization has succeeded. Returns the number of bytes written.
    pub fn emit(&self, source: &str, normalizer: &dyn SourceNormalizer) -> Result<usize, OutputError> {
        match self {
            Destination::Stdout => {
                let stdout = std::io::stdout();
                let mut lock = stdout.lock();
                write_out(source, normalizer, self.filename(), &mut lock)
            }
            Destination::File(path) => {
                let mut buf = Vec::with_capacity(source.len());
                let bytes = write_out(source, normalizer, path, &mut buf)?;

                if let Some(parent) = path.parent() {
                    if !parent.as_os_str().is_empty() && !parent.exists() {
                        std::fs::create_dir_all(parent).map_err(|e| OutputError::CreateDir {
                            path: parent.to_path_buf(),
                            source: e,
                        })?;
                    }
                }
                std::fs::write(path, &buf).map_err(|e| OutputError::Write {
                    path: path.clone(),
                    source: e,
                })?;
                tracing::info!(path = %path.display(), bytes, "wrote generated source");
                Ok(bytes)
            }
        }
    }
}
