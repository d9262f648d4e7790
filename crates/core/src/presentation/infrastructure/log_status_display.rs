use crate::presentation::domain::status_display::StatusDisplay;

/// Logs the status line whenever it changes.
///
/// Repeating the same status every frame would flood the log, so only
/// transitions are emitted.
#[derive(Default)]
pub struct LogStatusDisplay {
    current: Option<String>,
}

impl LogStatusDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}

impl StatusDisplay for LogStatusDisplay {
    fn set_status(&mut self, text: &str) {
        if self.current.as_deref() == Some(text) {
            return;
        }
        log::info!("Status: {text}");
        self.current = Some(text.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracks_latest_status() {
        let mut display = LogStatusDisplay::new();
        assert_eq!(display.current(), None);
        display.set_status("happy");
        display.set_status("happy");
        display.set_status("No face detected");
        assert_eq!(display.current(), Some("No face detected"));
    }
}
