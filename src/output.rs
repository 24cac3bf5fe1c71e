// ABOUTME: Output formatting for CLI feedback.
// ABOUTME: Supports normal (tagged lines), quiet, and JSON output modes.

use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Output mode for CLI feedback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Human-friendly tagged status lines
    Normal,
    /// Warnings, errors and the final report only
    Quiet,
    /// JSON lines for scripting
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stream {
    Stdout,
    Stderr,
}

#[derive(Debug, Clone)]
enum Sink {
    Terminal,
    Capture(Arc<Mutex<Vec<String>>>),
}

/// Handles CLI output based on the configured mode.
#[derive(Debug, Clone)]
pub struct Output {
    mode: OutputMode,
    start_time: Option<Instant>,
    sink: Sink,
}

impl Output {
    pub fn new(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
            sink: Sink::Terminal,
        }
    }

    /// Output that records lines instead of printing them.
    pub fn captured(mode: OutputMode) -> Self {
        Self {
            mode,
            start_time: None,
            sink: Sink::Capture(Arc::new(Mutex::new(Vec::new()))),
        }
    }

    /// Lines recorded so far (empty for terminal output).
    pub fn lines(&self) -> Vec<String> {
        match &self.sink {
            Sink::Terminal => Vec::new(),
            Sink::Capture(lines) => lines.lock().map(|l| l.clone()).unwrap_or_default(),
        }
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Start timing an operation.
    pub fn start_timer(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Get elapsed time since timer started.
    pub fn elapsed_secs(&self) -> f64 {
        self.start_time
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn emit(&self, stream: Stream, line: String) {
        match &self.sink {
            Sink::Terminal => match stream {
                Stream::Stdout => println!("{line}"),
                Stream::Stderr => eprintln!("{line}"),
            },
            Sink::Capture(lines) => {
                if let Ok(mut lines) = lines.lock() {
                    lines.push(line);
                }
            }
        }
    }

    fn event(&self, stream: Stream, event: &str, message: &str) {
        let event = JsonEvent {
            event,
            message,
            duration_secs: self.start_time.map(|_| self.elapsed_secs()),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            self.emit(stream, json);
        }
    }

    /// Untagged progress text (suppressed in quiet/json mode).
    pub fn progress(&self, message: &str) {
        if self.mode == OutputMode::Normal {
            self.emit(Stream::Stdout, message.to_string());
        }
    }

    /// An `[INFO]` status line.
    pub fn info(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => self.emit(Stream::Stdout, format!("[INFO] {message}")),
            OutputMode::Quiet => {}
            OutputMode::Json => self.event(Stream::Stdout, "info", message),
        }
    }

    /// A `[WARN]` status line, shown in every mode.
    pub fn warning(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                self.emit(Stream::Stderr, format!("[WARN] {message}"))
            }
            OutputMode::Json => self.event(Stream::Stderr, "warning", message),
        }
    }

    /// An `[OK]` line with optional timing.
    pub fn success(&self, message: &str) {
        match self.mode {
            OutputMode::Normal => {
                let elapsed = self.elapsed_secs();
                if elapsed > 0.0 {
                    self.emit(Stream::Stdout, format!("[OK] {message} ({elapsed:.1}s)"));
                } else {
                    self.emit(Stream::Stdout, format!("[OK] {message}"));
                }
            }
            OutputMode::Quiet => {}
            OutputMode::Json => self.event(Stream::Stdout, "success", message),
        }
    }

    /// An `[ERROR]` line, shown in every mode.
    pub fn error(&self, message: &str) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                self.emit(Stream::Stderr, format!("[ERROR] {message}"))
            }
            OutputMode::Json => self.event(Stream::Stderr, "error", message),
        }
    }

    /// Final report: rendered text, or the serialized value in JSON mode.
    pub fn report<T: Serialize>(&self, text: &str, value: &T) {
        match self.mode {
            OutputMode::Normal | OutputMode::Quiet => {
                for line in text.lines() {
                    self.emit(Stream::Stdout, line.to_string());
                }
            }
            OutputMode::Json => {
                let wrapped = JsonReport {
                    event: "report",
                    report: value,
                };
                match serde_json::to_string(&wrapped) {
                    Ok(json) => self.emit(Stream::Stdout, json),
                    Err(e) => tracing::error!("failed to serialize report: {e}"),
                }
            }
        }
    }
}

#[derive(Serialize)]
struct JsonEvent<'a> {
    event: &'a str,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_secs: Option<f64>,
}

#[derive(Serialize)]
struct JsonReport<'a, T> {
    event: &'a str,
    report: &'a T,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normal_mode_tags_lines() {
        let out = Output::captured(OutputMode::Normal);
        out.info("probing");
        out.warning("kubectl unreachable");
        out.error("prune failed");
        out.success("done");

        assert_eq!(
            out.lines(),
            vec![
                "[INFO] probing",
                "[WARN] kubectl unreachable",
                "[ERROR] prune failed",
                "[OK] done",
            ]
        );
    }

    #[test]
    fn quiet_mode_keeps_warnings_errors_and_report() {
        let out = Output::captured(OutputMode::Quiet);
        out.info("probing");
        out.progress("step");
        out.success("done");
        out.warning("w");
        out.error("e");
        out.report("Summary\nline", &());

        assert_eq!(out.lines(), vec!["[WARN] w", "[ERROR] e", "Summary", "line"]);
    }

    #[test]
    fn json_mode_emits_objects() {
        let out = Output::captured(OutputMode::Json);
        out.info("probing");
        out.report("ignored", &serde_json::json!({"total": 3}));

        let lines = out.lines();
        let first: serde_json::Value = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(first["event"], "info");
        assert_eq!(first["message"], "probing");
        let second: serde_json::Value = serde_json::from_str(&lines[1]).unwrap();
        assert_eq!(second["report"]["total"], 3);
    }
}
