// In: src/record/mod.rs

//! The fixed-width encoded record: its byte layout and the packet
//! assembly/parsing logic built on top of the delta kernels.

pub mod format;
pub mod packet;
