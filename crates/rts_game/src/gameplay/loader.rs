use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use rts_engine::Position;
use thiserror::Error;
use tracing::{debug, warn};

use super::kinds::EntityKind;

/// One `kind,x,y` line of the initialization list.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRecord {
    pub kind: EntityKind,
    pub position: Position,
}

#[derive(Debug, Error)]
pub enum InitLoadError {
    #[error("failed to read initialization list {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InitLineError {
    #[error("expected `kind,x,y`, found {found} field(s)")]
    FieldCount { found: usize },
    #[error("unknown entity kind `{kind}`")]
    UnknownKind { kind: String },
    #[error("invalid {axis} coordinate `{value}`")]
    InvalidCoordinate { axis: &'static str, value: String },
}

/// Parses one line. Blank lines and `#` comments yield `Ok(None)`.
pub fn parse_init_line(line: &str) -> Result<Option<SpawnRecord>, InitLineError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    let [kind, x, y] = fields.as_slice() else {
        return Err(InitLineError::FieldCount {
            found: fields.len(),
        });
    };

    let kind = EntityKind::from_token(kind).ok_or_else(|| InitLineError::UnknownKind {
        kind: (*kind).to_string(),
    })?;
    let x = parse_coordinate("x", x)?;
    let y = parse_coordinate("y", y)?;
    Ok(Some(SpawnRecord {
        kind,
        position: Position::new(x, y),
    }))
}

fn parse_coordinate(axis: &'static str, raw: &str) -> Result<f64, InitLineError> {
    raw.parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| InitLineError::InvalidCoordinate {
            axis,
            value: raw.to_string(),
        })
}

/// Parses a whole list, skipping (and logging) every line that does not yield a record.
pub fn parse_init_list(text: &str) -> Vec<SpawnRecord> {
    let mut records = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        match parse_init_line(line) {
            Ok(Some(record)) => records.push(record),
            Ok(None) => {}
            Err(err @ InitLineError::UnknownKind { .. }) => {
                debug!(line = line_number, error = %err, "init_line_ignored");
            }
            Err(err) => {
                warn!(line = line_number, error = %err, "init_line_skipped");
            }
        }
    }
    records
}

pub fn read_init_file(path: &Path) -> Result<Vec<SpawnRecord>, InitLoadError> {
    let text = fs::read_to_string(path).map_err(|source| InitLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_init_list(&text))
}

/// Like [`read_init_file`], but an unreadable file is logged and yields an empty list.
pub fn load_init_file_or_empty(path: &Path) -> Vec<SpawnRecord> {
    match read_init_file(path) {
        Ok(records) => records,
        Err(err) => {
            warn!(error = %err, "init_file_unavailable");
            Vec::new()
        }
    }
}
