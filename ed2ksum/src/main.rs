//! ed2ksum: print or check ED2K checksums, in the spirit of md5sum.

mod check;
mod cli;
mod hashing;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use std::process::ExitCode;

use check::{check_listing, CheckStats};
use cli::Opts;
use hashing::{checksum_line, hash_path, uri_line};

fn main() -> ExitCode {
    logging::init();
    let opts = Opts::parse();

    let ok = if opts.check {
        run_check(&opts)
    } else {
        run_digest(&opts)
    };
    if ok {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Print a checksum line or URI for every path.
fn run_digest(opts: &Opts) -> bool {
    let mode = opts.mode();
    let mut ok = true;
    for path in &opts.paths {
        let line = hash_path(path, mode).and_then(|hash| {
            if opts.uri {
                uri_line(&hash, path)
            } else {
                Ok(checksum_line(&hash, mode, path))
            }
        });
        match line {
            Ok(line) => println!("{line}"),
            Err(err) => {
                eprintln!("ed2ksum: {err:#}");
                ok = false;
            }
        }
    }
    ok
}

fn read_listing(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        let mut contents = String::new();
        io::stdin()
            .read_to_string(&mut contents)
            .context("read stdin")?;
        return Ok(contents);
    }
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

/// Verify the checksum lines found in every path.
fn run_check(opts: &Opts) -> bool {
    let mut total = CheckStats::default();
    let mut ok = true;
    for path in &opts.paths {
        match read_listing(path) {
            Ok(contents) => {
                let stats = check_listing(&contents);
                total.ok += stats.ok;
                total.mismatched += stats.mismatched;
                total.unreadable += stats.unreadable;
            }
            Err(err) => {
                eprintln!("ed2ksum: {err:#}");
                ok = false;
            }
        }
    }
    log::info!(
        "{} ok, {} mismatched, {} unreadable",
        total.ok,
        total.mismatched,
        total.unreadable
    );

    if total.unreadable > 0 {
        eprintln!(
            "ed2ksum: WARNING: {} listed {} could not be read",
            total.unreadable,
            plural(total.unreadable, "file")
        );
        ok = false;
    }
    if total.mismatched > 0 {
        eprintln!(
            "ed2ksum: WARNING: {} computed {} did NOT match",
            total.mismatched,
            plural(total.mismatched, "checksum")
        );
        ok = false;
    }
    ok
}

fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
