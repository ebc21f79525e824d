//! Raw mode and alternate screen handling.

use std::io::{self, IsTerminal, Stdout};
use std::panic;

use crossterm::cursor::Show;
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::error;

use crate::{CoinsimError, Result};

/// Terminal the client draws on.
pub type Tui = Terminal<CrosstermBackend<Stdout>>;

fn terminal_error(context: &str, e: io::Error) -> CoinsimError {
    CoinsimError::Io(format!("{context}: {e}"))
}

/// Switches stdout to raw mode on the alternate screen.
///
/// Also installs a panic hook that puts the terminal back and logs the
/// panic, so a crash does not leave the shell in raw mode.
///
/// # Errors
///
/// Fails when stdout is not a TTY or the terminal rejects a mode change.
pub fn setup_terminal() -> Result<Tui> {
    if !io::stdout().is_terminal() {
        return Err(CoinsimError::Io(
            "coinsim needs an interactive terminal (stdout is not a TTY)".to_string(),
        ));
    }

    enable_raw_mode().map_err(|e| terminal_error("failed to enable raw mode", e))?;

    let mut stdout = io::stdout();
    if let Err(e) = execute!(stdout, EnterAlternateScreen) {
        let _ = disable_raw_mode();
        return Err(terminal_error("failed to enter alternate screen", e));
    }

    let terminal = match Terminal::new(CrosstermBackend::new(stdout)) {
        Ok(terminal) => terminal,
        Err(e) => {
            let _ = leave_terminal(&mut io::stdout());
            return Err(terminal_error("failed to create terminal", e));
        }
    };

    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let _ = leave_terminal(&mut io::stdout());
        error!(%info, "Panicked");
        previous(info);
    }));

    Ok(terminal)
}

/// Leaves the alternate screen and raw mode and shows the cursor again.
///
/// # Errors
///
/// Fails when the terminal rejects a mode change.
pub fn restore_terminal(terminal: &mut Tui) -> Result<()> {
    leave_terminal(terminal.backend_mut())
        .map_err(|e| terminal_error("failed to restore terminal", e))
}

fn leave_terminal<W: io::Write>(out: &mut W) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(out, LeaveAlternateScreen, Show)
}
