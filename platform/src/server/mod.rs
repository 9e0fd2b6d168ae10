//! Gateway HTTP server: admission API and viewer socket

pub mod handlers;
pub mod rooms;
pub mod serve;
pub mod state;
pub mod ws;
