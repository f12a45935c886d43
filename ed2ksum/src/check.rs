//! Verification of previously written checksum lines.

use ed2k_stream::BoundaryMode;
use std::path::Path;

use crate::hashing::hash_path;

const HASH_LEN: usize = 2 * ed2k_stream::SIZE;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum CheckLineError {
    #[error("line too short")]
    TooShort,

    #[error("not a hex hash: {0:?}")]
    InvalidHash(String),

    #[error("expected a space after the hash")]
    MissingSeparator,

    #[error("unknown mode marker {0:?}")]
    UnknownMode(char),

    #[error("missing path")]
    MissingPath,
}

/// One `<hash> <mode><path>` line.
#[derive(Debug, PartialEq, Eq)]
pub struct CheckLine<'a> {
    pub hash: &'a str,
    pub mode: BoundaryMode,
    pub path: &'a str,
}

impl<'a> CheckLine<'a> {
    pub fn parse(line: &'a str) -> Result<Self, CheckLineError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let hash = line.get(..HASH_LEN).ok_or(CheckLineError::TooShort)?;
        if !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CheckLineError::InvalidHash(hash.to_string()));
        }
        let rest = line[HASH_LEN..]
            .strip_prefix(' ')
            .ok_or(CheckLineError::MissingSeparator)?;
        let mut chars = rest.chars();
        let mode = match chars.next() {
            Some(' ') => BoundaryMode::Current,
            Some('*') => BoundaryMode::Legacy,
            Some(other) => return Err(CheckLineError::UnknownMode(other)),
            None => return Err(CheckLineError::MissingPath),
        };
        let path = chars.as_str();
        if path.is_empty() {
            return Err(CheckLineError::MissingPath);
        }
        Ok(CheckLine { hash, mode, path })
    }
}

/// Outcome of checking all lines of one check file.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct CheckStats {
    pub ok: usize,
    pub mismatched: usize,
    pub unreadable: usize,
}

/// Rehash every file listed in `contents`, printing `<path>: OK` or
/// `<path>: FAILED` for each.
pub fn check_listing(contents: &str) -> CheckStats {
    let mut stats = CheckStats::default();
    for (index, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let entry = match CheckLine::parse(line) {
            Ok(entry) => entry,
            Err(err) => {
                log::warn!("line {}: skipped, {err}", index + 1);
                continue;
            }
        };
        match hash_path(Path::new(entry.path), entry.mode) {
            Ok(hash) if hash.eq_ignore_ascii_case(entry.hash) => {
                stats.ok += 1;
                println!("{}: OK", entry.path);
            }
            Ok(_) => {
                stats.mismatched += 1;
                println!("{}: FAILED", entry.path);
            }
            Err(err) => {
                stats.unreadable += 1;
                eprintln!("ed2ksum: {err:#}");
            }
        }
    }
    stats
}
