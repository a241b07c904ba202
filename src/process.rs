use bytes::Bytes;
use std::io;
use std::os::unix::process::CommandExt;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};

/// Everything an external program wrote, collected after it finished.
#[derive(Debug, Clone)]
pub struct CapturedOutput {
    pub status: ExitStatus,
    pub stdout: Bytes,
    pub stderr: Bytes,
}

/// Runs an external program to completion.
pub trait ProcessRunner {
    /// Runs `program` with `name` as `argv[0]` followed by `args`.
    fn run(&self, program: &Path, name: &str, args: &[String]) -> io::Result<CapturedOutput>;
}

/// Spawns real child processes.
///
/// Output streams are piped and drained fully; input is the shell's own stdin.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ProcessRunner for SystemRunner {
    fn run(&self, program: &Path, name: &str, args: &[String]) -> io::Result<CapturedOutput> {
        let output = Command::new(program)
            .arg0(name)
            .args(args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;

        Ok(CapturedOutput {
            status: output.status,
            stdout: Bytes::from(output.stdout),
            stderr: Bytes::from(output.stderr),
        })
    }
}
