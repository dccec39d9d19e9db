// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! JSON and JSON Lines export of captured events
//!
//! One record per line, `type` carrying the canonical identifier. Reading is
//! strict: a line with an unknown type is reported, not aliased.

use std::fs::{self, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{Error, ErrorContext, Result};
use crate::network::NetworkEvent;
use crate::time::Timestamp;

/// File extension for exports
pub const EXPORT_EXTENSION: &str = "jsonl";

/// Numbered names tried before giving up on a taken export name
const MAX_NAME_ATTEMPTS: usize = 1000;

/// Serialize events as a JSON array
pub fn to_json(events: &[NetworkEvent]) -> Result<String> {
    Ok(serde_json::to_string(events)?)
}

/// Serialize events as JSON Lines
pub fn to_jsonl(events: &[NetworkEvent]) -> Result<String> {
    let mut out = String::new();
    for event in events {
        out.push_str(&serde_json::to_string(event)?);
        out.push('\n');
    }
    Ok(out)
}

/// Parse JSON Lines; blank lines are skipped
pub fn from_jsonl(text: &str) -> Result<Vec<NetworkEvent>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|e| Error::malformed(i + 1, e.to_string()))
        })
        .collect()
}

/// Lowercase a name and replace anything outside `[a-z0-9_-]` with `_`
pub fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| c.to_ascii_lowercase())
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// File name for a session export: `<session>-<unix seconds>.jsonl`
pub fn export_file_name(session_id: &str, started: Timestamp) -> String {
    format!("{}.{}", export_stem(session_id, started), EXPORT_EXTENSION)
}

fn export_stem(session_id: &str, started: Timestamp) -> String {
    let mut session = sanitize_component(session_id);
    if session.is_empty() {
        session.push_str("session");
    }
    format!("{}-{}", session, started.to_unix_seconds())
}

/// Create a new export file, never replacing an existing one
///
/// Distinct session ids can sanitize to the same name. When the plain name is
/// taken a numbered one (`<stem>-1.jsonl`, `<stem>-2.jsonl`, ...) is used.
fn create_export_file(dir: &Path, session_id: &str, started: Timestamp) -> Result<(PathBuf, fs::File)> {
    let stem = export_stem(session_id, started);
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = match attempt {
            0 => format!("{}.{}", stem, EXPORT_EXTENSION),
            n => format!("{}-{}.{}", stem, n, EXPORT_EXTENSION),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                tracing::debug!(path = %path.display(), session = session_id, "Export name taken");
            }
            Err(e) => return Err(Error::file(path, e.to_string())),
        }
    }
    Err(Error::file(dir, format!("no free export name for '{}'", stem)))
}

/// Write events to `dir` as JSON Lines, creating the directory if needed
///
/// The file is named after the session and the first event's timestamp.
/// Existing files are never overwritten. Returns the path written.
pub fn write_jsonl(dir: impl AsRef<Path>, session_id: &str, events: &[NetworkEvent]) -> Result<PathBuf> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir).with_path(dir)?;

    let started = events.first().map(|e| e.timestamp).unwrap_or_else(Timestamp::now);
    let (path, file) = create_export_file(dir, session_id, started)?;

    let mut writer = BufWriter::new(file);
    for event in events {
        serde_json::to_writer(&mut writer, event).with_path(&path)?;
        writer.write_all(b"\n").with_path(&path)?;
    }
    writer.flush().with_path(&path)?;

    tracing::info!(path = %path.display(), events = events.len(), "Exported events");
    Ok(path)
}

/// Read a JSON Lines export
pub fn read_jsonl(path: impl AsRef<Path>) -> Result<Vec<NetworkEvent>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_path(path)?;
    let events = from_jsonl(&text)?;
    tracing::debug!(path = %path.display(), events = events.len(), "Loaded events");
    Ok(events)
}
