//! Frame storage and the frame-sequence assembler.

pub mod assemble;
pub mod frame;
