use crossbeam_channel::{Receiver, Sender};

/// Lifecycle marker carried by every progress event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    /// The run is still going.
    Running,
    /// The output file was written.
    Done,
    /// The run failed; the message says why.
    Error,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RunState::Running)
    }
}

/// One progress notification for the front-end.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ProgressEvent {
    /// 0..=100, non-decreasing within a run.
    pub percent: u8,
    pub message: String,
    pub state: RunState,
}

/// Sending half of a run's progress channel.
///
/// Percentages are clamped so they never decrease, and nothing is sent after the terminal
/// event.
#[derive(Debug)]
pub struct ProgressReporter {
    tx: Sender<ProgressEvent>,
    last_percent: u8,
    finished: bool,
}

impl ProgressReporter {
    /// Create a reporter and the matching receiver.
    pub fn channel() -> (Self, Receiver<ProgressEvent>) {
        let (tx, rx) = crossbeam_channel::unbounded();
        (
            Self {
                tx,
                last_percent: 0,
                finished: false,
            },
            rx,
        )
    }

    /// Report intermediate progress.
    pub fn progress(&mut self, percent: u8, message: impl Into<String>) {
        self.send(percent, message.into(), RunState::Running);
    }

    /// Report a status message without advancing the percentage.
    pub fn status(&mut self, message: impl Into<String>) {
        let percent = self.last_percent;
        self.send(percent, message.into(), RunState::Running);
    }

    /// Report success. Always `100%`.
    pub fn done(&mut self, message: impl Into<String>) {
        self.send(100, message.into(), RunState::Done);
    }

    /// Report a terminal failure, keeping the last percentage.
    pub fn error(&mut self, message: impl Into<String>) {
        let percent = self.last_percent;
        self.send(percent, message.into(), RunState::Error);
    }

    /// Return `true` once a terminal event was sent.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn send(&mut self, percent: u8, message: String, state: RunState) {
        if self.finished {
            tracing::debug!(%message, "dropping progress event after terminal state");
            return;
        }
        let percent = percent.min(100).max(self.last_percent);
        self.last_percent = percent;
        self.finished = state.is_terminal();
        let event = ProgressEvent {
            percent,
            message,
            state,
        };
        if self.tx.send(event).is_err() {
            tracing::debug!("progress receiver disconnected");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/pipeline/progress.rs"]
mod tests;
