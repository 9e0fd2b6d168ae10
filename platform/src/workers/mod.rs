//! Long-running gateway workers

pub mod relay;
