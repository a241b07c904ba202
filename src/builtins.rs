use crate::ShellStatus;
use crate::path::SearchPath;
use std::fs::{self, FileTimes, OpenOptions};
use std::io::{self, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::SystemTime;

/// Enumeration of all supported builtin commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Exit,
    Echo,
    Type,
    Help,
    Pwd,
    Cd,
    Ls,
    Touch,
    Mv,
}

impl FromStr for Builtin {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Builtin::ALL
            .iter()
            .copied()
            .find(|builtin| builtin.name() == s)
            .ok_or(())
    }
}

impl Builtin {
    /// Every builtin, fixed at compile time.
    pub const ALL: [Builtin; 9] = [
        Builtin::Exit,
        Builtin::Echo,
        Builtin::Type,
        Builtin::Help,
        Builtin::Pwd,
        Builtin::Cd,
        Builtin::Ls,
        Builtin::Touch,
        Builtin::Mv,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Exit => "exit",
            Builtin::Echo => "echo",
            Builtin::Type => "type",
            Builtin::Help => "help",
            Builtin::Pwd => "pwd",
            Builtin::Cd => "cd",
            Builtin::Ls => "ls",
            Builtin::Touch => "touch",
            Builtin::Mv => "mv",
        }
    }

    /// One-line usage shown by `help <name>`.
    pub fn help(self) -> &'static str {
        match self {
            Builtin::Exit => "exit [n] - Exit the shell with optional status n",
            Builtin::Echo => "echo [string...] - Display a line of text",
            Builtin::Type => "type [name] - Display information about command type",
            Builtin::Help => "help [command] - Display help for commands",
            Builtin::Pwd => "pwd - Print current working directory",
            Builtin::Cd => "cd [dir] - Change the current directory to dir",
            Builtin::Ls => "ls [dir] - List directory contents",
            Builtin::Touch => "touch [file...] - Create empty file(s) or update timestamps",
            Builtin::Mv => "mv source dest - Move/rename source to destination",
        }
    }

    /// Names of all builtins, sorted.
    pub fn names() -> Vec<&'static str> {
        let mut names: Vec<_> = Builtin::ALL.iter().map(|b| b.name()).collect();
        names.sort_unstable();
        names
    }

    /// Executes the builtin command.
    ///
    /// Failures of the command itself are reported on `stderr` and do not
    /// produce an `Err`; only failing to write to the given streams does.
    /// Returns a `ShellStatus` indicating whether the shell should continue
    /// or exit with a specific code.
    pub fn execute<W, E>(
        self,
        args: &[String],
        path: &SearchPath,
        stdout: &mut W,
        stderr: &mut E,
    ) -> io::Result<ShellStatus>
    where
        W: Write + ?Sized,
        E: Write + ?Sized,
    {
        match self {
            Builtin::Exit => return exit_cmd(args, stderr),
            Builtin::Echo => writeln!(stdout, "{}", args.join(" "))?,
            Builtin::Type => type_cmd(args, path, stdout, stderr)?,
            Builtin::Help => help_cmd(args, stdout, stderr)?,
            Builtin::Pwd => match std::env::current_dir() {
                Ok(dir) => writeln!(stdout, "{}", dir.display())?,
                Err(e) => writeln!(stderr, "pwd: error retrieving current directory: {e}")?,
            },
            Builtin::Cd => cd_cmd(args, stderr)?,
            Builtin::Ls => ls_cmd(args, stdout, stderr)?,
            Builtin::Touch => touch_cmd(args, stderr)?,
            Builtin::Mv => mv_cmd(args, stderr)?,
        }
        Ok(ShellStatus::Continue)
    }
}

/// Expands a leading `~` against `HOME`. Left untouched when `HOME` is unset.
pub fn expand_tilde(arg: &str) -> PathBuf {
    let rest = match arg.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => return PathBuf::from(arg),
    };
    let Some(home) = std::env::var_os("HOME") else {
        return PathBuf::from(arg);
    };
    let home = PathBuf::from(home);
    match rest.trim_start_matches('/') {
        "" => home,
        rest => home.join(rest),
    }
}

fn exit_cmd<E: Write + ?Sized>(args: &[String], stderr: &mut E) -> io::Result<ShellStatus> {
    let Some(arg) = args.first() else {
        return Ok(ShellStatus::Exit(0));
    };
    match arg.parse::<i32>() {
        Ok(code) => Ok(ShellStatus::Exit(code)),
        Err(_) => {
            writeln!(stderr, "exit: {arg}: numeric argument required")?;
            Ok(ShellStatus::Continue)
        }
    }
}

/// Identifies whether a command is a builtin or an executable in the search path.
fn type_cmd<W, E>(
    args: &[String],
    path: &SearchPath,
    stdout: &mut W,
    stderr: &mut E,
) -> io::Result<()>
where
    W: Write + ?Sized,
    E: Write + ?Sized,
{
    let Some(command) = args.first() else {
        return writeln!(stderr, "type: missing argument");
    };

    if Builtin::from_str(command).is_ok() {
        return writeln!(stdout, "{command} is a shell builtin");
    }

    match path.find(command) {
        Some(found) => writeln!(stdout, "{command} is {}", found.display()),
        None => writeln!(stderr, "{command}: not found"),
    }
}

fn help_cmd<W, E>(args: &[String], stdout: &mut W, stderr: &mut E) -> io::Result<()>
where
    W: Write + ?Sized,
    E: Write + ?Sized,
{
    let Some(command) = args.first() else {
        writeln!(stdout, "Available commands:")?;
        for name in Builtin::names() {
            writeln!(stdout, "  {name}")?;
        }
        return Ok(());
    };

    match Builtin::from_str(command) {
        Ok(builtin) => writeln!(stdout, "{}", builtin.help()),
        Err(()) => writeln!(stderr, "help: '{command}' is not a shell command"),
    }
}

fn cd_cmd<E: Write + ?Sized>(args: &[String], stderr: &mut E) -> io::Result<()> {
    let target = args.first().map_or("~", String::as_str);
    if std::env::set_current_dir(expand_tilde(target)).is_err() {
        writeln!(stderr, "cd: {target}: No such file or directory")?;
    }
    Ok(())
}

fn ls_cmd<W, E>(args: &[String], stdout: &mut W, stderr: &mut E) -> io::Result<()>
where
    W: Write + ?Sized,
    E: Write + ?Sized,
{
    let shown = args.first().map_or(".", String::as_str);
    let entries = match fs::read_dir(expand_tilde(shown)) {
        Ok(entries) => entries,
        Err(e) => {
            return match e.kind() {
                ErrorKind::NotFound => writeln!(stderr, "ls: {shown}: No such file or directory"),
                ErrorKind::PermissionDenied => writeln!(stderr, "ls: {shown}: Permission denied"),
                _ => writeln!(stderr, "ls: {shown}: {e}"),
            };
        }
    };

    let mut names: Vec<String> = entries
        .flatten()
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    for name in names {
        writeln!(stdout, "{name}")?;
    }
    Ok(())
}

fn touch_cmd<E: Write + ?Sized>(args: &[String], stderr: &mut E) -> io::Result<()> {
    if args.is_empty() {
        return writeln!(stderr, "touch: missing file operand");
    }

    for filename in args {
        if let Err(e) = touch_file(&expand_tilde(filename)) {
            match e.kind() {
                ErrorKind::PermissionDenied => {
                    writeln!(stderr, "touch: cannot touch '{filename}': Permission denied")?
                }
                _ => writeln!(stderr, "touch: {filename}: {e}")?,
            }
        }
    }
    Ok(())
}

fn touch_file(path: &Path) -> io::Result<()> {
    create_parent_dir(path)?;
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let now = SystemTime::now();
    file.set_times(FileTimes::new().set_accessed(now).set_modified(now))
}

fn mv_cmd<E: Write + ?Sized>(args: &[String], stderr: &mut E) -> io::Result<()> {
    let [source, dest, ..] = args else {
        return writeln!(stderr, "mv: missing file operand");
    };

    match move_path(&expand_tilde(source), &expand_tilde(dest)) {
        Ok(()) => Ok(()),
        Err(e) => match e.kind() {
            ErrorKind::NotFound => {
                writeln!(stderr, "mv: cannot stat '{source}': No such file or directory")
            }
            ErrorKind::PermissionDenied => {
                writeln!(stderr, "mv: cannot move '{source}': Permission denied")
            }
            _ => writeln!(stderr, "mv: {e}"),
        },
    }
}

fn move_path(source: &Path, dest: &Path) -> io::Result<()> {
    fs::symlink_metadata(source)?;
    create_parent_dir(dest)?;

    let dest = match source.file_name() {
        Some(name) if dest.is_dir() => dest.join(name),
        _ => dest.to_path_buf(),
    };

    match fs::rename(source, &dest) {
        Err(e) if e.kind() == ErrorKind::CrossesDevices && source.is_file() => {
            fs::copy(source, &dest)?;
            fs::remove_file(source)
        }
        result => result,
    }
}

/// Creates the parent directory of `path` when it is named and missing.
fn create_parent_dir(path: &Path) -> io::Result<()> {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() && !dir.exists() => fs::create_dir_all(dir),
        _ => Ok(()),
    }
}
