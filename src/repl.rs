use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::io::Write;

use crate::config;
use crate::dispatch::{Dispatcher, ExecOutcome};

/// Runs the interactive command loop until EOF.
///
/// One command at a time: a remote call suspends the loop until it resolves,
/// so the dispatcher's state is never touched concurrently.
pub async fn run(mut dispatcher: Dispatcher, save_history: bool) -> Result<()> {
    println!("reddit--@terminal:~ (type help for available commands)");
    if let Some(user) = dispatcher.current_user() {
        println!("Logged in as: {}", user);
    }

    let mut rl = DefaultEditor::new()?;
    let history_path = config::config_dir()?.join("history.txt");
    if save_history {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let prompt = format!("{} ", dispatcher.prompt());
        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                rl.add_history_entry(line)?;

                match dispatcher.execute(line).await {
                    ExecOutcome::Cleared => {
                        // ANSI clear screen + cursor home.
                        print!("\x1b[2J\x1b[H");
                        std::io::stdout().flush()?;
                    }
                    ExecOutcome::Executed => {
                        if let Some(entry) = dispatcher.transcript().last() {
                            println!("{}", entry.output);
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Press Ctrl-D to exit");
            }
            Err(ReadlineError::Eof) => {
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    if save_history {
        let _ = rl.save_history(&history_path);
    }

    Ok(())
}
