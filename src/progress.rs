use std::io::{self, Write};
use std::time::Instant;

/// Stderr diagnostics with elapsed-time stamps. Warnings are plain lines,
/// one per event, not structured.
pub struct ConsoleProgress {
    enabled: bool,
    started: Instant,
}

impl ConsoleProgress {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            started: Instant::now(),
        }
    }

    pub fn info(&self, msg: impl AsRef<str>) {
        self.emit(msg.as_ref());
    }

    pub fn warn(&self, msg: impl AsRef<str>) {
        self.emit(&format!("WARNING: {}", msg.as_ref()));
    }

    pub fn progress(&self, label: &str, current: usize, total: usize) {
        let total = total.max(1);
        let current = current.min(total);
        let pct = (current as f64 / total as f64) * 100.0;
        self.emit(&format!("{label} {current}/{total} ({pct:5.1}%)"));
    }

    fn emit(&self, msg: &str) {
        if !self.enabled {
            return;
        }
        let stamp = fmt_elapsed(self.started.elapsed().as_secs());
        let mut stderr = io::stderr().lock();
        let _ = writeln!(stderr, "[{stamp}] {msg}");
    }
}

fn fmt_elapsed(seconds: u64) -> String {
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    let s = seconds % 60;
    if h > 0 {
        format!("{h:02}:{m:02}:{s:02}")
    } else {
        format!("{m:02}:{s:02}")
    }
}
