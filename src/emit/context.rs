//! Per-run emission state: buffer, emitting package and configuration.

use dicon_model::{TypeDescriptor, go_keywords, qualifier};

use super::imports::ImportTracker;
use super::writer::SourceWriter;
use crate::config::GeneratorConfig;
use crate::errors::{GenerateError, GenerateResult};

/// Import path of the error-wrapping package referenced by generated containers.
pub const ERRORS_IMPORT: &str = "github.com/pkg/errors";

/// The mutable state of one generation run.
///
/// Owned exclusively by the caller for the duration of a run. The emitting package is fixed by the first
/// [`EmissionContext::begin`] and never changes afterwards; every type reference is rendered relative to it.
///
/// Packages referenced through [`EmissionContext::render`] and [`EmissionContext::qualify`] are tracked. Those with a
/// known import path are added to the header's import block by [`EmissionContext::finish`]; the rest are reported by
/// [`EmissionContext::check_imports`].
#[derive(Debug)]
pub struct EmissionContext {
    writer: SourceWriter,
    package: Option<String>,
    config: GeneratorConfig,
    imports: ImportTracker,
    /// Byte offset just past the header's last import spec
    import_at: Option<usize>,
}

impl EmissionContext {
    pub fn new(config: GeneratorConfig) -> Self {
        Self {
            writer: SourceWriter::new("\t"),
            package: None,
            config,
            imports: ImportTracker::default(),
            import_at: None,
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// The emitting package, once the run has begun.
    pub fn package(&self) -> Option<&str> {
        self.package.as_deref()
    }

    pub fn has_begun(&self) -> bool {
        self.package.is_some()
    }

    /// Fix the emitting package and write the file header.
    ///
    /// Calling it again with the same package is a no-op, so several emitters can share one file.
    pub fn begin(&mut self, package: &str) -> GenerateResult<()> {
        match &self.package {
            Some(current) if current == package => Ok(()),
            Some(current) => Err(GenerateError::PackageMismatch {
                current: current.clone(),
                requested: package.to_string(),
            }),
            None => {
                if !go_keywords::is_identifier(package) {
                    return Err(GenerateError::InvalidIdentifier {
                        name: package.to_string(),
                        role: "package name",
                    });
                }
                self.package = Some(package.to_string());
                self.write_header(package);
                Ok(())
            }
        }
    }

    fn write_header(&mut self, package: &str) {
        let marker = format!("// Code generated by \"{}\"; DO NOT EDIT.", self.config.tool_name);
        self.line(&marker);
        self.blank();
        self.line(&format!("package {}", package));
        self.blank();
        self.open("import (");
        self.line("\"log\"");
        if self.config.is_synchronized() {
            self.line("\"sync\"");
        }
        self.blank();
        self.line(&format!("\"{}\"", ERRORS_IMPORT));
        self.import_at = Some(self.writer.as_str().len());
        self.close(")");
    }

    /// Render a type reference relative to the emitting package.
    pub fn render(&mut self, ty: &TypeDescriptor) -> String {
        if let Some(home) = &ty.package {
            self.qualify(home);
        }
        ty.render(self.package.as_deref().unwrap_or_default())
    }

    /// `pkg.` when `home` differs from the emitting package, empty otherwise.
    pub fn qualify(&mut self, home: &str) -> String {
        let prefix = qualifier(Some(home), self.package.as_deref().unwrap_or_default());
        if !prefix.is_empty() {
            self.imports.note(home);
        }
        prefix
    }

    /// Fail on the first referenced package (in name order) whose import path is unknown.
    ///
    /// Needed unless the output goes through a normalizer that adds imports itself.
    pub fn check_imports(&self) -> GenerateResult<()> {
        match self.imports.unresolved(&self.config).first() {
            Some(package) => Err(GenerateError::UnresolvedImport {
                package: package.to_string(),
            }),
            None => Ok(()),
        }
    }

    /// Write one line at the current indentation.
    pub fn line(&mut self, s: &str) {
        self.writer.writeln(s);
    }

    /// Write an empty line (never indented).
    pub fn blank(&mut self) {
        self.writer.blank_lines(1);
    }

    /// Write `s` and indent the following lines.
    pub fn open(&mut self, s: &str) {
        self.writer.writeln(s);
        self.writer.indent();
    }

    /// Dedent and write `s`.
    pub fn close(&mut self, s: &str) {
        self.writer.dedent();
        self.writer.writeln(s);
    }

    /// Write `header {`, the body produced by `f`, then `}`.
    pub fn block<F>(&mut self, header: &str, f: F)
    where
        F: FnOnce(&mut Self),
    {
        self.open(&format!("{} {{", header));
        f(self);
        self.close("}");
    }

    /// Write `name type` pairs with the types aligned in one column, as gofmt lays out struct fields.
    pub fn aligned_fields(&mut self, fields: &[(String, String)]) {
        let width = fields.iter().map(|(name, _)| name.chars().count()).max().unwrap_or(0);
        for (name, ty) in fields {
            let pad = width - name.chars().count() + 1;
            self.line(&format!("{}{}{}", name, " ".repeat(pad), ty));
        }
    }

    /// The text generated so far.
    pub fn as_str(&self) -> &str {
        self.writer.as_str()
    }

    /// End the run and take the generated text, with the imports of referenced packages added as a last group of
    /// the header's import block.
    pub fn finish(mut self) -> String {
        let specs = self.imports.specs(&self.config);
        if let Some(at) = self.import_at.filter(|_| !specs.is_empty()) {
            let group: String = specs.iter().map(|spec| format!("\t{}\n", spec)).collect();
            self.writer.insert(at, &format!("\n{}", group));
        }
        self.writer.finish()
    }
}
