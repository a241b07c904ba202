use crate::builtins::Builtin;
use crate::path::SearchPath;
use log::debug;
use std::collections::BTreeSet;

/// What the line editor should do in response to a completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// Replace the word being completed with this text.
    Replace(String),
    /// Ring the terminal bell, insert nothing.
    Bell,
    /// Show every candidate, then redisplay the prompt and the typed line.
    Listing(Vec<String>),
    /// Nothing further to offer for this word.
    Done,
}

/// Completion state for the word currently being completed.
///
/// Lives for one input line; recomputed whenever the queried prefix changes.
#[derive(Debug, Default)]
struct CompletionState {
    query_prefix: Option<String>,
    candidates: Vec<String>,
    disclosure_step: u8,
}

/// Completes command names from the builtin table and the search path.
pub struct Completer {
    builtins: Vec<String>,
    path: SearchPath,
    state: CompletionState,
}

impl Completer {
    pub fn new<I, S>(builtins: I, path: SearchPath) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            builtins: builtins.into_iter().map(Into::into).collect(),
            path,
            state: CompletionState::default(),
        }
    }

    /// A completer over the shell's own builtins.
    pub fn for_shell(path: SearchPath) -> Self {
        Self::new(Builtin::names(), path)
    }

    /// Forgets everything about the previous word. Called once per input line.
    pub fn reset(&mut self) {
        self.state = CompletionState::default();
    }

    /// Every builtin and executable name starting with `prefix`, sorted and deduplicated.
    pub fn candidates(&self, prefix: &str) -> Vec<String> {
        let mut names: BTreeSet<String> = self
            .builtins
            .iter()
            .filter(|name| name.starts_with(prefix))
            .cloned()
            .collect();
        names.extend(self.path.executables(prefix));
        names.into_iter().collect()
    }

    /// Answers the `invocation`-th request for `prefix`.
    ///
    /// Invocation 0 is a fresh tab press. Higher indices enumerate the
    /// candidates one at a time and end with [`Completion::Done`].
    pub fn complete(&mut self, prefix: &str, invocation: usize) -> Completion {
        if self.state.query_prefix.as_deref() != Some(prefix) {
            let candidates = self.candidates(prefix);
            debug!("completion candidates for {prefix:?}: {candidates:?}");
            self.state = CompletionState {
                query_prefix: Some(prefix.to_string()),
                candidates,
                disclosure_step: 0,
            };
        }

        let candidates = &self.state.candidates;
        match candidates.len() {
            0 if invocation == 0 => Completion::Bell,
            0 => Completion::Done,
            1 if invocation == 0 => Completion::Replace(format!("{} ", candidates[0])),
            1 => Completion::Done,
            _ if invocation > 0 => candidates
                .get(invocation)
                .map_or(Completion::Done, |c| Completion::Replace(format!("{c} "))),
            _ => {
                let common = longest_common_prefix(candidates);
                if common.len() > prefix.len() {
                    return Completion::Replace(common.to_string());
                }

                if self.state.disclosure_step == 0 {
                    self.state.disclosure_step = 1;
                    Completion::Bell
                } else {
                    self.state.disclosure_step = 0;
                    Completion::Listing(candidates.clone())
                }
            }
        }
    }
}

fn longest_common_prefix(items: &[String]) -> &str {
    let Some((first, rest)) = items.split_first() else {
        return "";
    };

    let mut len = first.len();
    for item in rest {
        let shared = first
            .char_indices()
            .zip(item.chars())
            .take_while(|((_, a), b)| a == b)
            .last()
            .map_or(0, |((i, a), _)| i + a.len_utf8());
        len = len.min(shared);
    }
    &first[..len]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn executable(dir: &Path, name: &str) {
        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
    }

    fn path_of(dir: &Path) -> SearchPath {
        SearchPath::new(Some(dir.as_os_str().to_owned()))
    }

    #[test]
    fn no_match_rings_bell() {
        let mut completer = Completer::new(["echo", "exit"], SearchPath::new(None));
        assert_eq!(completer.complete("zz", 0), Completion::Bell);
        assert_eq!(completer.complete("zz", 1), Completion::Done);
    }

    #[test]
    fn single_match_completes_with_space() {
        let mut completer = Completer::new(["echo", "exit"], SearchPath::new(None));
        assert_eq!(completer.complete("ex", 0), Completion::Replace("exit ".into()));
        assert_eq!(completer.complete("ex", 1), Completion::Done);
    }

    #[test]
    fn ambiguous_prefix_rings_then_lists() {
        let mut completer = Completer::new(["echo", "exit", "exec"], SearchPath::new(None));
        assert_eq!(completer.complete("ex", 0), Completion::Bell);
        assert_eq!(
            completer.complete("ex", 0),
            Completion::Listing(vec!["exec".into(), "exit".into()])
        );
        // Disclosure starts over after a listing
        assert_eq!(completer.complete("ex", 0), Completion::Bell);
    }

    #[test]
    fn common_prefix_extends_silently() {
        let dir = tempfile::tempdir().unwrap();
        executable(dir.path(), "xyz_foo_bar");
        executable(dir.path(), "xyz_foo_baz");

        let mut completer = Completer::new(["echo"], path_of(dir.path()));
        assert_eq!(completer.complete("xyz", 0), Completion::Replace("xyz_foo_ba".into()));
        assert_eq!(completer.complete("xyz_foo_ba", 0), Completion::Bell);
        assert_eq!(
            completer.complete("xyz_foo_ba", 0),
            Completion::Listing(vec!["xyz_foo_bar".into(), "xyz_foo_baz".into()])
        );
    }

    #[test]
    fn prefix_change_resets_disclosure() {
        let mut completer = Completer::new(["echo", "exit", "exec"], SearchPath::new(None));
        assert_eq!(completer.complete("ex", 0), Completion::Bell);
        assert_eq!(completer.complete("e", 0), Completion::Bell);
        assert_eq!(completer.complete("ex", 0), Completion::Bell);

        completer.reset();
        assert_eq!(completer.complete("ex", 0), Completion::Bell);
    }

    #[test]
    fn enumeration_ends_past_candidate_count() {
        let mut completer = Completer::new(["exec", "exit"], SearchPath::new(None));
        assert_eq!(completer.complete("ex", 1), Completion::Replace("exit ".into()));
        assert_eq!(completer.complete("ex", 2), Completion::Done);
    }

    #[test]
    fn builtins_and_executables_are_merged_and_deduplicated() {
        let dir = tempfile::tempdir().unwrap();
        executable(dir.path(), "echo");
        executable(dir.path(), "echoer");

        let completer = Completer::new(["echo", "exit"], path_of(dir.path()));
        assert_eq!(completer.candidates("ech"), vec!["echo", "echoer"]);
    }

    #[test]
    fn shell_completer_knows_builtins() {
        let mut completer = Completer::for_shell(SearchPath::new(None));
        assert_eq!(completer.complete("pw", 0), Completion::Replace("pwd ".into()));
        assert_eq!(completer.complete("tou", 0), Completion::Replace("touch ".into()));
    }

    #[test]
    fn longest_common_prefix_handles_multibyte() {
        let items = vec!["héllo".to_string(), "hélp".to_string()];
        assert_eq!(longest_common_prefix(&items), "hél");
        let items = vec!["abc".to_string(), "xyz".to_string()];
        assert_eq!(longest_common_prefix(&items), "");
        assert_eq!(longest_common_prefix(&[]), "");
    }
}
