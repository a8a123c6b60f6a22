use std::sync::Mutex;

/// Output classes understood by command output sinks. `Logging` marks trace
/// output so command output capture can ignore it; `Dml` is dropped by sinks
/// without markup support.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum OutputType {
    Normal,
    Error,
    Warning,
    Logging,
    Dml,
}

/// Sink for command and trace output. There are both global and per-command
/// instances; the global one is handed to the extension context at load.
pub trait OutputService: Send + Sync {
    fn output_width(&self) -> u32;

    fn supports_dml(&self) -> bool;

    fn output_string(&self, output_type: OutputType, message: &str);
}

/// Output sink that records everything written to it. Used by embedders to
/// capture command output and by the test suite.
#[derive(Default)]
pub struct CaptureOutput {
    lines: Mutex<Vec<(OutputType, String)>>,
}

impl CaptureOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain captured output.
    pub fn take(&self) -> Vec<(OutputType, String)> {
        std::mem::take(&mut *self.lines.lock().unwrap())
    }
}

impl OutputService for CaptureOutput {
    fn output_width(&self) -> u32 {
        80
    }

    fn supports_dml(&self) -> bool {
        false
    }

    fn output_string(&self, output_type: OutputType, message: &str) {
        self.lines
            .lock()
            .unwrap()
            .push((output_type, message.to_string()));
    }
}
