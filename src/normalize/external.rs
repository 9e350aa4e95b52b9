//! Normalizers backed by Go tools found on `PATH`.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

use super::{NormalizeError, SourceNormalizer};

/// Pipes the buffer through an external formatter (stdin → stdout).
#[derive(Debug, Clone)]
pub struct ExternalNormalizer {
    program: String,
    args: Vec<String>,
    /// Pass `-srcdir <dir of the output file>` so import resolution sees the destination package.
    srcdir: bool,
}

impl ExternalNormalizer {
    /// Arbitrary program reading source on stdin and writing the result on stdout.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            srcdir: false,
        }
    }

    /// `goimports -srcdir <dir>`: prunes and adds imports relative to the output location.
    pub fn goimports() -> Self {
        Self {
            srcdir: true,
            ..Self::new("goimports")
        }
    }

    /// `gofmt`: formatting only; unused imports are left in place.
    pub fn gofmt() -> Self {
        Self::new("gofmt")
    }

    fn command(&self, filename: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        if self.srcdir {
            let dir = match filename.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent,
                _ => Path::new("."),
            };
            cmd.arg("-srcdir").arg(dir);
        }
        cmd.args(&self.args);
        cmd
    }
}

impl SourceNormalizer for ExternalNormalizer {
    fn name(&self) -> &str {
        &self.program
    }

    fn resolves_imports(&self) -> bool {
        self.srcdir
    }

    #[tracing::instrument(skip_all, fields(program = %self.program, filename = %filename.display()))]
    fn normalize(&self, filename: &Path, source: &str) -> Result<String, NormalizeError> {
        let spawn_error = |source: std::io::Error| NormalizeError::Spawn {
            program: self.program.clone(),
            source,
        };

        let mut child = self
            .command(filename)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        // Feed stdin from a separate thread so a large result cannot fill the stdout pipe while we are still writing.
        let output = std::thread::scope(|scope| {
            let stdin = child.stdin.take();
            let feeder = scope.spawn(move || match stdin {
                Some(mut stdin) => match stdin.write_all(source.as_bytes()) {
                    // the tool may exit without consuming its input; its status decides
                    Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                    other => other,
                },
                None => Ok(()),
            });
            let output = child.wait_with_output();
            let fed = feeder
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            output.and_then(|o| fed.map(|()| o))
        })
        .map_err(spawn_error)?;

        if !output.status.success() {
            return Err(NormalizeError::Tool {
                program: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        tracing::debug!(bytes = output.stdout.len(), "normalized");
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
