use std::io::Write;

use crate::presentation::domain::user_alert::UserAlert;

/// Prints alerts to stderr. The terminal equivalent of a modal dialog.
pub struct StderrAlert;

impl UserAlert for StderrAlert {
    fn alert(&mut self, message: &str) {
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(stderr, "\n{message}");
        let _ = stderr.flush();
    }
}
