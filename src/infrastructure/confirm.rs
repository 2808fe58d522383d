//! Terminal yes/no confirmation

use std::io::{self, BufRead, Write};
use std::path::Path;

use crate::application::ports::outbound::ConfirmPort;

/// Asks on stdin. Anything but an explicit `n` counts as yes, matching the
/// tool's historical behavior.
pub struct StdinConfirm;

impl ConfirmPort for StdinConfirm {
    fn confirm_overwrite(&self, path: &Path) -> bool {
        print!("{} already exists, override? (y/n) ", path.display());
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        !line.trim().eq_ignore_ascii_case("n")
    }
}
