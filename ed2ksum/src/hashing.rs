//! Streaming files through the ED2K hasher and formatting the results.

use anyhow::{bail, Context, Result};
use ed2k_stream::{BoundaryMode, Ed2kHasher};
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

const READ_BUFFER: usize = 1024 * 1024;

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Hash a file, or stdin for `-`, returning the lowercase hex hash.
pub fn hash_path(path: &Path, mode: BoundaryMode) -> Result<String> {
    if is_stdin(path) {
        return hash_reader(io::stdin().lock(), mode).context("read stdin");
    }
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    hash_reader(f, mode).with_context(|| format!("read {}", path.display()))
}

pub fn hash_reader(mut reader: impl Read, mode: BoundaryMode) -> io::Result<String> {
    let mut hasher = Ed2kHasher::new(mode.ends_with_null_chunk());
    let mut buf = vec![0u8; READ_BUFFER];
    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err),
        };
        hasher.write(&buf[..n]);
    }
    let hash = hasher.hex_digest();
    hasher.close();
    log::debug!("hashed with {mode:?}: {hash}");
    Ok(hash)
}

/// `<hash> <mode><path>`, with `*` marking the red hash.
pub fn checksum_line(hash: &str, mode: BoundaryMode, path: &Path) -> String {
    let marker = if mode.ends_with_null_chunk() { '*' } else { ' ' };
    format!("{hash} {marker}{}", path.display())
}

/// `ed2k://|file|<path>|<size>|<hash>|/`
pub fn uri_line(hash: &str, path: &Path) -> Result<String> {
    if is_stdin(path) {
        bail!("cannot build an ed2k URI for stdin");
    }
    let size = path
        .metadata()
        .with_context(|| format!("stat {}", path.display()))?
        .len();
    Ok(format!("ed2k://|file|{}|{size}|{hash}|/", path.display()))
}
