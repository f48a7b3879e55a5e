//! User cancellation: `q` + Enter on an interactive terminal, or Ctrl+C

use is_terminal::IsTerminal;
use log::{debug, info};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::engine::CancellationToken;

/// Spawn the listeners that set `token`. Must be called inside a tokio runtime.
pub fn start_cancellation_listener(token: CancellationToken) {
    let ctrl_c = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            debug!("Ctrl+C received, setting cancellation.");
            ctrl_c.cancel();
        }
    });

    if !std::io::stdin().is_terminal() {
        info!("Input is not an interactive terminal, you must cancel the operation with CTRL+C");
        return;
    }

    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            if is_cancel_command(&line) {
                debug!("Setting cancellation.");
                token.cancel();
                break;
            }
        }
    });
    debug!("Keyboard listener added");
}

fn is_cancel_command(line: &str) -> bool {
    line.trim().eq_ignore_ascii_case("q")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_command() {
        assert!(is_cancel_command("q"));
        assert!(is_cancel_command(" Q \r"));
        assert!(!is_cancel_command("quit"));
        assert!(!is_cancel_command(""));
    }
}
