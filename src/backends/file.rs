//! Reading table source files.
//!
//! Table files share one line format:
//! - blank lines and lines whose first non-blank character is `#` are ignored
//! - a line starting with whitespace continues the previous logical line

use crate::dict::Owner;
use crate::error::OpenError;
use std::fs;
use std::path::Path;

/// One logical line and the physical line number it starts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    pub lineno: usize,
    pub text: String,
}

#[derive(Debug)]
pub struct TableFile {
    pub text: String,
    pub owner: Owner,
}

impl TableFile {
    pub fn read(spec: &str, path: &Path) -> Result<Self, OpenError> {
        let io_err = |source| OpenError::Io {
            spec: spec.to_string(),
            path: path.to_path_buf(),
            source,
        };
        let meta = fs::metadata(path).map_err(io_err)?;
        let text = fs::read_to_string(path).map_err(io_err)?;
        Ok(Self {
            text,
            owner: Owner::of_file(&meta),
        })
    }

    pub fn lines(&self) -> Vec<LogicalLine> {
        logical_lines(&self.text)
    }
}

pub fn logical_lines(text: &str) -> Vec<LogicalLine> {
    let mut out: Vec<LogicalLine> = Vec::new();
    for (idx, raw) in text.lines().enumerate() {
        let line = raw.trim_end();
        let body = line.trim_start();
        if body.is_empty() || body.starts_with('#') {
            continue;
        }

        if line.len() != body.len() {
            if let Some(last) = out.last_mut() {
                last.text.push(' ');
                last.text.push_str(body);
                continue;
            }
        }

        out.push(LogicalLine {
            lineno: idx + 1,
            text: body.to_string(),
        });
    }
    out
}
