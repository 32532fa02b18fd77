//! Terminal output helpers.
//!
//! Every user-facing line goes through here so the glyphs stay consistent:
//!
//! - `📦` a step is starting
//! - `✓` something finished
//! - `📌` a checkout was pinned
//! - `!` a warning (stderr)
//! - `x` an error (stderr)
//!
//! Diagnostic lines (`detail`) are only shown with `--verbose`.

use colored::*;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

static VERBOSE: AtomicBool = AtomicBool::new(false);

/// Set once from the parsed command line.
pub fn set_verbose(verbose: bool) {
    VERBOSE.store(verbose, Ordering::Relaxed);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::Relaxed)
}

pub fn step(msg: impl Display) {
    println!("{} {}", "📦".blue(), msg);
}

pub fn success(msg: impl Display) {
    println!("{} {}", "✓".green(), msg);
}

pub fn pinned(msg: impl Display) {
    println!("   {} {}", "📌".blue(), msg);
}

pub fn warn(msg: impl Display) {
    eprintln!("{} {}", "!".yellow(), msg);
}

pub fn error(msg: impl Display) {
    eprintln!("{} {}", "x".red(), msg);
}

pub fn detail(msg: impl Display) {
    if is_verbose() {
        println!("   {}", msg.to_string().dimmed());
    }
}

/// Progress bar for one concurrent level of fetch or pin tasks. Hidden in
/// verbose mode, where worker threads print their own lines.
pub fn level_progress(len: usize, msg: &str) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if is_verbose() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb.set_message(msg.to_string());
    pb
}

/// First seven characters of a commit hash, or the whole thing if shorter.
pub fn short_hash(rev: &str) -> &str {
    match rev.char_indices().nth(7) {
        Some((idx, _)) => &rev[..idx],
        None => rev,
    }
}
