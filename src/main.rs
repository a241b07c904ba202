use log::{info, warn};
use rsh::config::{PROMPT, ShellConfig};
use rsh::editor::{self, ReadOutcome};
use rsh::{Completer, Dispatcher, ShellError, ShellStatus};
use std::io::{self, Write};
use std::process;

fn main() -> anyhow::Result<()> {
    let config = ShellConfig::from_env();
    if let Err(e) = rsh::logging::init(&config) {
        eprintln!("warning: {e:#}");
    }
    info!("search path: {:?}", config.search_path.dirs());

    let dispatcher = Dispatcher::new(config.search_path.clone());
    let mut completer = Completer::for_shell(config.search_path);

    loop {
        print!("{PROMPT}");
        io::stdout().flush()?;

        let line = match editor::read_line(PROMPT, &mut completer) {
            Ok(ReadOutcome::Line(line)) => line,
            Ok(ReadOutcome::Eof) => {
                info!("end of input");
                return Ok(());
            }
            Ok(ReadOutcome::Interrupted) => {
                info!("interrupted");
                return Ok(());
            }
            Err(e) => {
                warn!("reading input failed: {e}");
                eprintln!("error: {e}");
                continue;
            }
        };

        match dispatcher.execute_line(&line, &mut io::stdout(), &mut io::stderr()) {
            Ok(ShellStatus::Continue) => {}
            Ok(ShellStatus::Exit(code)) => {
                info!("exit {code}");
                process::exit(code);
            }
            Err(ShellError::Io(e)) => {
                warn!("{line:?} failed: {e}");
                eprintln!("error: {e}");
            }
            Err(e) => eprintln!("{e}"),
        }
    }
}
