//! Console lines
//!
//! Human-readable progress goes to stdout as tagged lines (`[INFO] ...`).
//! Structured logs go through `tracing` to stderr and are separate.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Info,
    Test,
    Ok,
    Error,
    Fatal,
    Result,
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            Tag::Info => "[INFO]",
            Tag::Test => "[TEST]",
            Tag::Ok => "[OK]",
            Tag::Error => "[ERROR]",
            Tag::Fatal => "[FATAL]",
            Tag::Result => "[RESULT]",
        };
        f.write_str(tag)
    }
}

pub fn line(tag: Tag, message: impl fmt::Display) -> String {
    format!("{tag} {message}")
}

/// Print a tagged line to stdout
pub fn say(tag: Tag, message: impl fmt::Display) {
    println!("{}", line(tag, message));
}
