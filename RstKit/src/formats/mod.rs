//! File format implementations

pub mod rst;
