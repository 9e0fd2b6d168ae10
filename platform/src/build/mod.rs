//! Build orchestration
//!
//! Runs once per launched instance: validate the environment, locate the
//! source tree, run the install-and-build command with streamed output,
//! validate the build output and upload every artifact.

pub mod command;
pub mod orchestrator;
pub mod sink;
pub mod upload;
