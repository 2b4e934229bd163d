//! Shared wire types for the Waypoint batch router.
//!
//! The engine (`waypoint-router`) decodes these types from the wire and the
//! planner (`waypoint-router-planner`) encodes them; keeping the vocabulary in
//! one crate keeps the two sides byte-compatible.

pub mod commands;
pub mod ids;

pub use commands::{
    Command, Opcode, CONTRACT_BALANCE, FEE_BIPS_BASE, FLAG_ALLOW_REVERT, OPCODE_MASK,
};
pub use ids::{Asset, Marketplace, Recipient, SwapProtocol};
