use crate::error::{ParseError, Stream};
use std::path::PathBuf;

/// Splits an input string into a vector of arguments.
///
/// This tokenizer handles:
/// - Single quotes (`'...'`) and double quotes (`"..."`): whitespace is kept,
///   and a backslash only escapes the active quote character or another backslash.
/// - Unquoted text: split by whitespace, a backslash escapes the next character.
/// - A quote of the other kind inside a quoted section is kept literally.
///
/// An unterminated quote absorbs the rest of the line into the current argument.
///
/// # Example
/// ```
/// let args = rsh::tokenize("echo 'hello world'");
/// assert_eq!(args, vec!["echo", "hello world"]);
/// ```
pub fn tokenize(input: &str) -> Vec<String> {
    let mut args = Vec::new();
    let mut arg = String::new();
    let mut quote: Option<char> = None;
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek().copied() {
                // Trailing backslash is kept as-is
                None => arg.push('\\'),
                Some(next) if quote.is_some_and(|q| next != q && next != '\\') => {
                    arg.push('\\');
                    arg.push(next);
                    chars.next();
                }
                Some(next) => {
                    arg.push(next);
                    chars.next();
                }
            },
            '\'' | '"' => match quote {
                None => quote = Some(c),
                Some(q) if q == c => quote = None,
                Some(_) => arg.push(c),
            },
            c if c.is_whitespace() && quote.is_none() => {
                if !arg.is_empty() {
                    args.push(std::mem::take(&mut arg));
                }
            }
            c => arg.push(c),
        }
    }

    if !arg.is_empty() {
        args.push(arg);
    }
    args
}

/// How a redirection target is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectMode {
    Truncate,
    Append,
}

/// A file that one output stream is rebound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub path: PathBuf,
    pub mode: RedirectMode,
}

/// A command line split into its name, arguments and redirections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCommand {
    pub name: String,
    pub args: Vec<String>,
    pub stdout: Option<Redirect>,
    pub stderr: Option<Redirect>,
}

fn redirect_operator(token: &str) -> Option<(Stream, RedirectMode)> {
    match token {
        ">" | "1>" => Some((Stream::Stdout, RedirectMode::Truncate)),
        ">>" | "1>>" => Some((Stream::Stdout, RedirectMode::Append)),
        "2>" => Some((Stream::Stderr, RedirectMode::Truncate)),
        "2>>" => Some((Stream::Stderr, RedirectMode::Append)),
        _ => None,
    }
}

/// Classifies tokens into a [`ParsedCommand`].
///
/// The last occurrence of each stream's operator wins. Name and arguments are
/// every token before the first operator; anything between operators other
/// than their targets is dropped. This function does not touch the filesystem.
pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<ParsedCommand, ParseError> {
    let mut first_op = None;
    let mut stdout_op = None;
    let mut stderr_op = None;

    for (i, token) in tokens.iter().enumerate() {
        let Some((stream, mode)) = redirect_operator(token.as_ref()) else {
            continue;
        };
        first_op.get_or_insert(i);
        match stream {
            Stream::Stdout => stdout_op = Some((i, mode)),
            Stream::Stderr => stderr_op = Some((i, mode)),
        }
    }

    let end = first_op.unwrap_or(tokens.len());
    let (name, args) = match tokens[..end].split_first() {
        Some((name, args)) => (name, args),
        None if tokens.is_empty() => return Err(ParseError::EmptyCommand),
        None => return Err(ParseError::MissingCommand),
    };

    let target = |op: Option<(usize, RedirectMode)>, stream: Stream| {
        op.map(|(i, mode)| {
            tokens
                .get(i + 1)
                .map(|path| Redirect {
                    path: PathBuf::from(path.as_ref()),
                    mode,
                })
                .ok_or(ParseError::MissingTarget(stream))
        })
        .transpose()
    };

    Ok(ParsedCommand {
        name: name.as_ref().to_string(),
        args: args.iter().map(|s| s.as_ref().to_string()).collect(),
        stdout: target(stdout_op, Stream::Stdout)?,
        stderr: target(stderr_op, Stream::Stderr)?,
    })
}
