//! One-directional replay of serialized visualization instructions.
//!
//! An analysis pipeline (the producer) writes a flat stream of
//! self-describing values; a small interpreter decodes it and replays the
//! instructions against a stateful visualization backend in arrival
//! order. Two session kinds share the codec: the charting session is a
//! sentinel-terminated opcode loop, the rendering session is one bulk
//! setup block replayed through an idempotent per-frame render loop.

pub mod backend;
pub mod buildtool;
pub mod chart;
pub mod config;
pub mod error;
pub mod producer;
pub mod scene;
pub mod stub;
pub mod wire;

pub use error::{Error, ProtocolError, Result};
