use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Which output stream a redirection applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => f.write_str("output"),
            Stream::Stderr => f.write_str("error"),
        }
    }
}

/// Errors produced while turning tokens into a [`crate::ParsedCommand`].
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command")]
    EmptyCommand,

    #[error("syntax error: missing command before redirection")]
    MissingCommand,

    #[error("syntax error: no file specified for {0} redirection")]
    MissingTarget(Stream),
}

/// Errors that abort a single command without ending the shell.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("cannot create directory '{}': {source}", .path.display())]
    CreateDir { path: PathBuf, source: io::Error },

    #[error("error opening '{}' for writing: {source}", .path.display())]
    OpenTarget { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Io(#[from] io::Error),
}
