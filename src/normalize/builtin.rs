//! In-process normalizer for generated Go.
//!
//! Covers what the generators rely on a formatter for, without requiring a Go toolchain:
//! - delimiter balance and literal termination (reported as syntax errors with a line number)
//! - pruning imports whose package name is never referenced
//! - trailing whitespace and blank-line cleanup

use std::collections::HashSet;
use std::path::Path;

use super::{NormalizeError, SourceNormalizer};

/// Normalizer implemented in Rust.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinNormalizer;

impl BuiltinNormalizer {
    pub fn new() -> Self {
        Self
    }
}

impl SourceNormalizer for BuiltinNormalizer {
    fn name(&self) -> &str {
        "builtin"
    }

    #[tracing::instrument(skip_all, fields(filename = %filename.display(), source_len = source.len()))]
    fn normalize(&self, filename: &Path, source: &str) -> Result<String, NormalizeError> {
        let masked = mask(source)?;
        let pruned = prune_imports(source, &masked);
        Ok(tidy(&pruned))
    }
}

fn syntax(line: usize, message: impl Into<String>) -> NormalizeError {
    NormalizeError::Syntax {
        line,
        message: message.into(),
    }
}

/// Blank out comments and literal contents (newlines are kept) while checking delimiter balance.
///
/// The result has the same lines as `source`, so identifier searches on it never match inside strings or comments.
fn mask(source: &str) -> Result<String, NormalizeError> {
    let mut out = String::with_capacity(source.len());
    let mut open: Vec<(char, usize)> = Vec::new();
    let mut line = 1;
    let mut chars = source.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => {
                line += 1;
                out.push('\n');
            }
            '/' if chars.peek() == Some(&'/') => {
                out.push(' ');
                while chars.peek().is_some_and(|&n| n != '\n') {
                    chars.next();
                    out.push(' ');
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                out.push_str("  ");
                let start = line;
                let mut closed = false;
                while let Some(n) = chars.next() {
                    if n == '\n' {
                        line += 1;
                        out.push('\n');
                    } else if n == '*' && chars.peek() == Some(&'/') {
                        chars.next();
                        out.push_str("  ");
                        closed = true;
                        break;
                    } else {
                        out.push(' ');
                    }
                }
                if !closed {
                    return Err(syntax(start, "comment not terminated"));
                }
            }
            '"' | '\'' => {
                let what = if c == '"' { "string literal" } else { "rune literal" };
                out.push(c);
                let mut closed = false;
                while let Some(n) = chars.next() {
                    match n {
                        '\\' => {
                            if matches!(chars.next(), None | Some('\n')) {
                                return Err(syntax(line, format!("{} not terminated", what)));
                            }
                            out.push_str("  ");
                        }
                        '\n' => return Err(syntax(line, format!("newline in {}", what))),
                        _ if n == c => {
                            out.push(c);
                            closed = true;
                            break;
                        }
                        _ => out.push(' '),
                    }
                }
                if !closed {
                    return Err(syntax(line, format!("{} not terminated", what)));
                }
            }
            '`' => {
                out.push(c);
                let start = line;
                let mut closed = false;
                for n in chars.by_ref() {
                    match n {
                        '`' => {
                            out.push(n);
                            closed = true;
                            break;
                        }
                        '\n' => {
                            line += 1;
                            out.push('\n');
                        }
                        _ => out.push(' '),
                    }
                }
                if !closed {
                    return Err(syntax(start, "raw string literal not terminated"));
                }
            }
            '(' | '[' | '{' => {
                open.push((c, line));
                out.push(c);
            }
            ')' | ']' | '}' => {
                let expected = match c {
                    ')' => '(',
                    ']' => '[',
                    _ => '{',
                };
                match open.pop() {
                    Some((o, _)) if o == expected => {}
                    Some((o, opened)) => {
                        return Err(syntax(
                            line,
                            format!("unexpected `{}`, `{}` opened on line {} is still open", c, o, opened),
                        ));
                    }
                    None => return Err(syntax(line, format!("unexpected `{}`", c))),
                }
                out.push(c);
            }
            _ => out.push(c),
        }
    }

    if let Some((o, opened)) = open.pop() {
        return Err(syntax(opened, format!("unclosed `{}`", o)));
    }
    Ok(out)
}

/// How an import spec is referenced from code.
#[derive(Debug, PartialEq, Eq)]
enum SpecName {
    /// `_` and `.` imports are kept unconditionally
    Always,
    Named(String),
}

/// Parse `"path"` or `alias "path"` (optionally followed by a comment).
fn parse_spec(spec: &str) -> Option<SpecName> {
    let spec = spec.split("//").next()?.trim();
    let quote = spec.find('"')?;
    let alias = spec[..quote].trim();
    let path = spec[quote + 1..].strip_suffix('"')?;
    if path.contains(['"', '`']) || !alias.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '.') {
        return None;
    }
    match alias {
        "" => Some(SpecName::Named(assumed_package_name(path))),
        "_" | "." => Some(SpecName::Always),
        alias => Some(SpecName::Named(alias.to_string())),
    }
}

/// The package name an import path is assumed to declare (`github.com/pkg/errors` → `errors`,
/// `gopkg.in/yaml.v2` → `yaml`, `example.com/go-redis/v9` → `redis`).
pub(crate) fn assumed_package_name(path: &str) -> String {
    let mut segments = path.rsplit('/');
    let last = segments.next().unwrap_or(path);
    let is_major_version =
        last.len() > 1 && last.starts_with('v') && last[1..].chars().all(|c| c.is_ascii_digit());
    let segment = if is_major_version { segments.next().unwrap_or(last) } else { last };
    let segment = segment.strip_prefix("go-").unwrap_or(segment);
    segment.chars().take_while(|c| c.is_alphanumeric() || *c == '_').collect()
}

/// Whether `ident.` appears in `code` as a selector on a bare identifier.
fn is_referenced(code: &str, ident: &str) -> bool {
    if ident.is_empty() {
        return false;
    }
    let needle = format!("{}.", ident);
    code.match_indices(&needle).any(|(idx, _)| {
        code[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !(c.is_alphanumeric() || c == '_' || c == '.'))
    })
}

#[derive(Debug)]
enum ImportDecl {
    /// `import (` at `start`, `)` at `end`
    Block { start: usize, end: usize },
    Single { line: usize },
}

/// Locate import declarations. Structure is read from the masked text, so `import` inside literals or comments
/// never counts.
fn find_imports(lines: &[&str], masked: &[&str]) -> Vec<ImportDecl> {
    let structural = |i: usize| masked.get(i).map_or("", |l| l.trim());
    let mut decls = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        if structural(i) == "import (" {
            if let Some(end) = (i + 1..lines.len()).find(|&j| structural(j) == ")") {
                decls.push(ImportDecl::Block { start: i, end });
                i = end;
            }
        } else if structural(i).starts_with("import ")
            && lines[i].trim().strip_prefix("import ").is_some_and(|rest| parse_spec(rest).is_some())
        {
            decls.push(ImportDecl::Single { line: i });
        }
        i += 1;
    }
    decls
}

/// Drop import specs whose package is never referenced outside the import declarations.
fn prune_imports(source: &str, masked: &str) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let masked_lines: Vec<&str> = masked.lines().collect();
    let decls = find_imports(&lines, &masked_lines);
    if decls.is_empty() {
        return source.to_string();
    }

    let mut import_lines = HashSet::new();
    for decl in &decls {
        match *decl {
            ImportDecl::Block { start, end } => import_lines.extend(start..=end),
            ImportDecl::Single { line } => {
                import_lines.insert(line);
            }
        }
    }
    let code: String = masked_lines
        .iter()
        .enumerate()
        .filter(|(i, _)| !import_lines.contains(i))
        .map(|(_, l)| *l)
        .collect::<Vec<_>>()
        .join("\n");

    let keep = |spec: &str| match parse_spec(spec) {
        Some(SpecName::Named(ident)) => {
            let used = is_referenced(&code, &ident);
            if !used {
                tracing::debug!(import = %spec, "pruning unused import");
            }
            used
        }
        Some(SpecName::Always) | None => true,
    };

    let mut out: Vec<&str> = Vec::with_capacity(lines.len());
    let mut next = 0;
    for decl in &decls {
        match *decl {
            ImportDecl::Block { start, end } => {
                out.extend_from_slice(&lines[next..start]);
                let mut body: Vec<&str> = Vec::new();
                for &line in &lines[start + 1..end] {
                    if line.trim().is_empty() {
                        if body.last().is_some_and(|l| !l.trim().is_empty()) {
                            body.push(line);
                        }
                    } else if keep(line.trim()) {
                        body.push(line);
                    }
                }
                while body.last().is_some_and(|l| l.trim().is_empty()) {
                    body.pop();
                }
                if !body.is_empty() {
                    out.push(lines[start]);
                    out.extend(body);
                    out.push(lines[end]);
                }
                next = end + 1;
            }
            ImportDecl::Single { line } => {
                out.extend_from_slice(&lines[next..line]);
                let spec = lines[line].trim().trim_start_matches("import ").trim();
                if keep(spec) {
                    out.push(lines[line]);
                }
                next = line + 1;
            }
        }
    }
    out.extend_from_slice(&lines[next..]);
    out.join("\n")
}

/// Strip trailing whitespace, drop leading blank lines, collapse blank runs and end with one newline.
fn tidy(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut pending_blank = false;
    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if pending_blank {
            out.push('\n');
            pending_blank = false;
        }
        out.push_str(line);
        out.push('\n');
    }
    out
}
