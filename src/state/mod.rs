//! State module for tracking pagination walks
//!
//! - `WalkPhase`: the phase a listing walk is in (fetching, extracting, deciding, done)
//! - `WalkState`: enforces the legal phase order for one walk
//! - `StopReason`: why a walk ended

mod walk_state;

pub use walk_state::{StopReason, WalkPhase, WalkState};
