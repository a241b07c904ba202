use crate::completion::{Completer, Completion};
use std::io::{self, BufRead, Write};
use termion::event::Key;
use termion::input::TermRead;
use termion::raw::IntoRawMode;

/// How reading a line ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    Eof,
    Interrupted,
}

/// Reads one line from the controlling terminal, or from plain stdin when it
/// is not a terminal. The prompt must already have been printed.
pub fn read_line(prompt: &str, completer: &mut Completer) -> io::Result<ReadOutcome> {
    let stdin = io::stdin();
    if !termion::is_tty(&stdin) {
        return read_plain(&mut stdin.lock());
    }

    // Enter raw mode to handle input character by character
    let mut stdout = io::stdout().into_raw_mode()?;
    read_keys(stdin.keys(), &mut stdout, prompt, completer)
}

/// Reads one line from a buffered reader. Zero bytes read is end of input.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected.
pub fn read_plain<R: BufRead + ?Sized>(reader: &mut R) -> io::Result<ReadOutcome> {
    let mut bytes = Vec::new();
    if reader.read_until(b'\n', &mut bytes)? == 0 {
        return Ok(ReadOutcome::Eof);
    }
    let line = String::from_utf8_lossy(&bytes);
    Ok(ReadOutcome::Line(line.trim_end_matches(['\n', '\r']).to_string()))
}

/// Builds a line from key events, echoing to `out` as a raw-mode terminal expects.
pub fn read_keys<I, W>(
    keys: I,
    out: &mut W,
    prompt: &str,
    completer: &mut Completer,
) -> io::Result<ReadOutcome>
where
    I: IntoIterator<Item = io::Result<Key>>,
    W: Write,
{
    completer.reset();
    let mut buffer = String::new();

    for key in keys {
        match key? {
            Key::Ctrl('c') => {
                write!(out, "\r\n")?;
                out.flush()?;
                return Ok(ReadOutcome::Interrupted);
            }
            Key::Ctrl('d') if buffer.is_empty() => {
                write!(out, "\r\n")?;
                out.flush()?;
                return Ok(ReadOutcome::Eof);
            }
            Key::Char('\n') | Key::Char('\r') => {
                write!(out, "\r\n")?;
                out.flush()?;
                return Ok(ReadOutcome::Line(buffer));
            }
            Key::Char('\t') => complete_word(&mut buffer, out, prompt, completer)?,
            Key::Backspace => {
                if buffer.pop().is_some() {
                    // Move cursor back, erase char with space, move back again
                    write!(out, "\x08 \x08")?;
                }
            }
            Key::Char(c) => {
                buffer.push(c);
                write!(out, "{c}")?;
            }
            _ => {}
        }
        out.flush()?;
    }

    Ok(if buffer.is_empty() {
        ReadOutcome::Eof
    } else {
        ReadOutcome::Line(buffer)
    })
}

/// Completes the word after the last whitespace in `buffer`.
fn complete_word<W: Write>(
    buffer: &mut String,
    out: &mut W,
    prompt: &str,
    completer: &mut Completer,
) -> io::Result<()> {
    let start = buffer
        .char_indices()
        .rev()
        .find(|(_, c)| c.is_whitespace())
        .map_or(0, |(i, c)| i + c.len_utf8());
    let word = buffer[start..].to_string();

    match completer.complete(&word, 0) {
        Completion::Replace(text) => {
            if let Some(rest) = text.strip_prefix(word.as_str()) {
                buffer.push_str(rest);
                write!(out, "{rest}")?;
            }
        }
        Completion::Bell => write!(out, "\x07")?,
        Completion::Listing(candidates) => {
            write!(out, "\r\n{}\r\n{prompt}{buffer}", candidates.join("  "))?
        }
        Completion::Done => {}
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path::SearchPath;
    use std::io::Cursor;

    fn keys(input: &str) -> Vec<io::Result<Key>> {
        input
            .chars()
            .map(|c| match c {
                '\u{3}' => Key::Ctrl('c'),
                '\u{4}' => Key::Ctrl('d'),
                '\u{8}' => Key::Backspace,
                c => Key::Char(c),
            })
            .map(Ok)
            .collect()
    }

    fn read(input: &str, completer: &mut Completer) -> (ReadOutcome, String) {
        let mut out = Vec::new();
        let outcome = read_keys(keys(input), &mut out, "$ ", completer).unwrap();
        (outcome, String::from_utf8(out).unwrap())
    }

    fn completer() -> Completer {
        Completer::new(["echo", "exit", "exec"], SearchPath::new(None))
    }

    #[test]
    fn typed_line_is_echoed_and_returned() {
        let (outcome, out) = read("ls -l\n", &mut completer());
        assert_eq!(outcome, ReadOutcome::Line("ls -l".into()));
        assert_eq!(out, "ls -l\r\n");
    }

    #[test]
    fn backspace_erases_last_char() {
        let (outcome, out) = read("lsx\u{8}\r", &mut completer());
        assert_eq!(outcome, ReadOutcome::Line("ls".into()));
        assert_eq!(out, "lsx\x08 \x08\r\n");
    }

    #[test]
    fn tab_completes_unique_command() {
        let (outcome, out) = read("ech\tx\n", &mut completer());
        assert_eq!(outcome, ReadOutcome::Line("echo x".into()));
        assert_eq!(out, "echo x\r\n");
    }

    #[test]
    fn tab_completes_last_word_only() {
        let (outcome, _) = read("echo ech\t\n", &mut completer());
        assert_eq!(outcome, ReadOutcome::Line("echo echo ".into()));
    }

    #[test]
    fn double_tab_lists_candidates() {
        let (outcome, out) = read("ex\t\t\n", &mut completer());
        assert_eq!(outcome, ReadOutcome::Line("ex".into()));
        assert_eq!(out, "ex\x07\r\nexec  exit\r\n$ ex\r\n");
    }

    #[test]
    fn no_candidates_rings_bell() {
        let (_, out) = read("zz\t\n", &mut completer());
        assert_eq!(out, "zz\x07\r\n");
    }

    #[test]
    fn ctrl_c_interrupts_and_ctrl_d_ends_input() {
        assert_eq!(read("ab\u{3}", &mut completer()).0, ReadOutcome::Interrupted);
        assert_eq!(read("\u{4}", &mut completer()).0, ReadOutcome::Eof);
        // Ctrl-D is ignored once something was typed
        assert_eq!(
            read("a\u{4}b\n", &mut completer()).0,
            ReadOutcome::Line("ab".into())
        );
    }

    #[test]
    fn plain_reader_strips_line_endings() {
        let mut input = Cursor::new("echo hi\r\nexit\n");
        assert_eq!(
            read_plain(&mut input).unwrap(),
            ReadOutcome::Line("echo hi".into())
        );
        assert_eq!(read_plain(&mut input).unwrap(), ReadOutcome::Line("exit".into()));
        assert_eq!(read_plain(&mut input).unwrap(), ReadOutcome::Eof);
    }

    #[test]
    fn plain_reader_replaces_invalid_utf8() {
        let mut input = Cursor::new(b"echo \xff\xfe\nnext\n".to_vec());
        assert_eq!(
            read_plain(&mut input).unwrap(),
            ReadOutcome::Line("echo \u{fffd}\u{fffd}".into())
        );
        assert_eq!(read_plain(&mut input).unwrap(), ReadOutcome::Line("next".into()));
    }

    #[test]
    fn key_read_error_is_returned_to_caller() {
        let keys = vec![
            Ok(Key::Char('a')),
            Err(io::Error::new(io::ErrorKind::InvalidData, "bad key")),
        ];
        let mut out = Vec::new();
        let result = read_keys(keys, &mut out, "$ ", &mut completer());
        assert_eq!(result.unwrap_err().kind(), io::ErrorKind::InvalidData);
    }
}
