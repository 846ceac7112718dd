//! Message inspection without a schema.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bitstream::BitReader;
use codec::EntityHeader;
use glob::Pattern;
use wire::{decode_entity_header, HEADER_SIZE};

/// What can be read from a message without knowing its schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InspectReport {
    pub header: EntityHeader,
    pub total_bytes: usize,
    pub payload_bytes: usize,
}

pub fn inspect_message(bytes: &[u8]) -> Result<InspectReport> {
    let mut reader = BitReader::new(bytes).context("empty message")?;
    let header = decode_entity_header(&mut reader).context("decode entity header")?;
    Ok(InspectReport {
        header,
        total_bytes: bytes.len(),
        payload_bytes: bytes.len() - HEADER_SIZE,
    })
}

impl std::fmt::Display for InspectReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = if self.header.snapshot {
            "snapshot"
        } else {
            "delta"
        };
        write!(
            f,
            "entity: {} kind: {kind} payload: {} bytes ({} total)",
            self.header.entity_id, self.payload_bytes, self.total_bytes
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    pub path: PathBuf,
    pub size: u64,
}

/// Lists the files of `dir`, optionally filtered by a glob on the path or
/// file name.
pub fn collect_message_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<MessageEntry>> {
    let pattern = glob
        .map(Pattern::new)
        .transpose()
        .context("invalid glob pattern")?;

    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(MessageEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

/// Largest first, ties by path.
pub fn sort_by_size(entries: &mut [MessageEntry]) {
    entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
}
