//! Prefixed status lines for the command-line tool

use std::fmt;

/// Kind of a status line, shown as a bracketed prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Info,
    Warn,
    Error,
    Success,
}

impl Status {
    pub fn prefix(self) -> &'static str {
        match self {
            Status::Info => "[*]",
            Status::Warn => "[!]",
            Status::Error => "[-]",
            Status::Success => "[+]",
        }
    }

    /// Format `message` behind this status' prefix
    pub fn line(self, message: impl fmt::Display) -> String {
        format!("{} {}", self.prefix(), message)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}
