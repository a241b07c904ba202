pub mod builtins;
pub mod completion;
pub mod config;
pub mod dispatch;
pub mod editor;
pub mod error;
pub mod logging;
pub mod parser;
pub mod path;
pub mod process;

pub use builtins::Builtin;
pub use completion::{Completer, Completion};
pub use dispatch::Dispatcher;
pub use error::{ParseError, ShellError, Stream};
pub use parser::{ParsedCommand, Redirect, RedirectMode, parse, tokenize};
pub use path::SearchPath;

/// Result of a command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellStatus {
    /// The shell should continue running.
    Continue,
    /// The shell should exit with the provided code.
    Exit(i32),
}
