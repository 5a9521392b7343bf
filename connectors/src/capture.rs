use std::sync::{Arc, Mutex};

use serde::Serialize;

/// Buffers formatted lines while forwarding each one to the logging sink.
///
/// Handlers keep logging normally; whatever they record here also comes
/// back to the caller inside the [`TaskReport`].
#[derive(Clone, Default)]
pub struct Recorder {
    lines: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, line: impl Into<String>) {
        let line = line.into();
        log::info!("{}", line);

        let mut lines = self
            .lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        lines.push(line);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

/// The single completion object handed back to a caller: the captured
/// output plus either the result value or the error message, never both.
#[derive(Debug, Serialize)]
pub struct TaskReport {
    pub stdout: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TaskReport {
    pub fn from_result<T, E>(outcome: std::result::Result<T, E>, recorder: &Recorder) -> Self
    where
        T: Serialize,
        E: std::fmt::Display,
    {
        let stdout = recorder.lines();

        match outcome {
            Ok(value) => match serde_json::to_value(value) {
                Ok(result) => Self {
                    stdout,
                    result: Some(result),
                    error: None,
                },
                Err(err) => Self {
                    stdout,
                    result: None,
                    error: Some(err.to_string()),
                },
            },
            Err(err) => Self {
                stdout,
                result: None,
                error: Some(err.to_string()),
            },
        }
    }
}
