//! Run orchestration: progress reporting, the video/audio assembler and the worker thread.

pub mod output;
pub mod progress;
pub mod worker;
