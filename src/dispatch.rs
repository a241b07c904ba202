use crate::ShellStatus;
use crate::builtins::Builtin;
use crate::error::{ParseError, ShellError};
use crate::parser::{ParsedCommand, Redirect, RedirectMode, parse, tokenize};
use crate::path::SearchPath;
use crate::process::{ProcessRunner, SystemRunner};
use log::{debug, warn};
use std::fs::{self, File, OpenOptions};
use std::io::Write;

/// Files opened for one command's redirections.
///
/// Dropping this closes them; the caller's own streams are never replaced.
struct Redirections {
    stdout: Option<File>,
    stderr: Option<File>,
}

impl Redirections {
    fn open(command: &ParsedCommand) -> Result<Self, ShellError> {
        let stdout = command.stdout.as_ref().map(open_target).transpose()?;
        let stderr = command.stderr.as_ref().map(open_target).transpose()?;
        Ok(Self { stdout, stderr })
    }
}

fn open_target(redirect: &Redirect) -> Result<File, ShellError> {
    let path = &redirect.path;
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
        && !dir.exists()
    {
        fs::create_dir_all(dir).map_err(|source| ShellError::CreateDir {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let mut options = OpenOptions::new();
    options.create(true);
    match redirect.mode {
        RedirectMode::Truncate => options.write(true).truncate(true),
        RedirectMode::Append => options.append(true),
    };
    options.open(path).map_err(|source| ShellError::OpenTarget {
        path: path.clone(),
        source,
    })
}

/// Orchestrates command execution.
///
/// A command is first looked up as a [`Builtin`]; failing that, the search
/// path is consulted and the program is run through the [`ProcessRunner`].
pub struct Dispatcher<R = SystemRunner> {
    path: SearchPath,
    runner: R,
}

impl Dispatcher {
    pub fn new(path: SearchPath) -> Self {
        Self::with_runner(path, SystemRunner)
    }
}

impl<R: ProcessRunner> Dispatcher<R> {
    pub fn with_runner(path: SearchPath, runner: R) -> Self {
        Self { path, runner }
    }

    /// Tokenizes, parses and dispatches one input line.
    ///
    /// A blank line does nothing.
    pub fn execute_line(
        &self,
        line: &str,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<ShellStatus, ShellError> {
        let tokens = tokenize(line);
        debug!("tokens: {tokens:?}");
        let command = match parse(&tokens) {
            Ok(command) => command,
            Err(ParseError::EmptyCommand) => return Ok(ShellStatus::Continue),
            Err(e) => return Err(e.into()),
        };
        self.dispatch(&command, stdout, stderr)
    }

    /// Runs a parsed command with its redirections applied.
    ///
    /// `stdout` and `stderr` are the streams used when the command does not
    /// redirect them. Both active streams are flushed afterwards, and any
    /// redirection files are closed on every path out of this call.
    pub fn dispatch(
        &self,
        command: &ParsedCommand,
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<ShellStatus, ShellError> {
        debug!("dispatching {command:?}");
        let mut targets = Redirections::open(command).inspect_err(|e| warn!("{e}"))?;

        let out: &mut dyn Write = match targets.stdout.as_mut() {
            Some(file) => file,
            None => stdout,
        };
        let err: &mut dyn Write = match targets.stderr.as_mut() {
            Some(file) => file,
            None => stderr,
        };

        let status = self.run(&command.name, &command.args, out, err);
        let flushed = out.flush().and(err.flush());
        let status = status?;
        flushed?;
        Ok(status)
    }

    fn run(
        &self,
        name: &str,
        args: &[String],
        stdout: &mut dyn Write,
        stderr: &mut dyn Write,
    ) -> Result<ShellStatus, ShellError> {
        if let Ok(builtin) = name.parse::<Builtin>() {
            debug!("running builtin {name}");
            return Ok(builtin.execute(args, &self.path, stdout, stderr)?);
        }

        let Some(program) = self.path.find(name) else {
            writeln!(stderr, "{name}: command not found")?;
            return Ok(ShellStatus::Continue);
        };

        debug!("running {}", program.display());
        match self.runner.run(&program, name, args) {
            Ok(output) => {
                debug!("{name} finished: {}", output.status);
                stdout.write_all(&output.stdout)?;
                stderr.write_all(&output.stderr)?;
            }
            Err(e) => {
                warn!("failed to run {}: {e}", program.display());
                writeln!(stderr, "error running {name}: {e}")?;
            }
        }
        Ok(ShellStatus::Continue)
    }
}
