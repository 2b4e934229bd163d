//! Off-line planner for Waypoint command batches.
//!
//! [`planner::BatchPlanner`] accumulates typed commands, validating operands
//! at construction time, and [`encoder::encode_command`] serialises them into
//! the `(command stream, operand blobs)` wire pair the engine consumes. The
//! planner never executes anything.

pub mod encoder;
pub mod planner;


pub use encoder::encode_command;
pub use planner::{BatchPlanner, PlanError};
