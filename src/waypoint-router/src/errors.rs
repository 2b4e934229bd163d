use alloy_primitives::{Address, U256};
use thiserror::Error;

use waypoint_router_types::{Asset, Opcode, SwapProtocol};

/// Errors while decoding a command byte + operand blob.
///
/// Always fatal to the batch: an undecodable command cannot be safely skipped,
/// so the allow-revert flag does not apply.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("unknown opcode {0:#04x}")]
    UnknownOpcode(u8),
    #[error("unknown swap protocol tag {0}")]
    UnknownProtocol(u8),
    #[error("unknown marketplace tag {0}")]
    UnknownMarketplace(u8),
    #[error("operand blob truncated")]
    Truncated,
    #[error("operand blob carries {0} trailing bytes")]
    TrailingBytes(usize),
    #[error("swap path must contain at least 2 tokens, got {0}")]
    PathTooShort(usize),
}

/// Failures reported by the host environment collaborators.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HostError {
    #[error("insufficient balance of {asset:?}: needed {needed}, available {available}")]
    InsufficientBalance {
        asset: Asset,
        needed: U256,
        available: U256,
    },
    #[error("no {protocol:?} pool for pair ({token_a}, {token_b})")]
    UnknownPool {
        protocol: SwapProtocol,
        token_a: Address,
        token_b: Address,
    },
    #[error("permit rejected")]
    PermitRejected,
    #[error("external protocol failure: {0}")]
    ProtocolFailure(&'static str),
}

/// Failures of a single command's handler.
///
/// Tolerated only when that command's allow-revert bit is set; otherwise the
/// batch aborts.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HandlerError {
    #[error("insufficient balance of {asset:?}: needed {needed}, available {available}")]
    InsufficientBalance {
        asset: Asset,
        needed: U256,
        available: U256,
    },
    #[error("invalid bips {0}")]
    InvalidBips(u16),
    #[error("received {amount}, below minimum {minimum}")]
    TooLittleReceived { amount: U256, minimum: U256 },
    #[error("input {amount} exceeds maximum {maximum}")]
    ExcessiveInputAmount { amount: U256, maximum: U256 },
    #[error("external protocol failure")]
    ExternalProtocol(#[source] HostError),
}

impl From<HostError> for HandlerError {
    fn from(err: HostError) -> Self {
        match err {
            HostError::InsufficientBalance {
                asset,
                needed,
                available,
            } => HandlerError::InsufficientBalance {
                asset,
                needed,
                available,
            },
            other => HandlerError::ExternalProtocol(other),
        }
    }
}

/// Terminal outcome of a failed batch, naming the failing index and kind.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("batch deadline expired")]
    Expired,
    #[error("reentrant call into execute")]
    Reentrant,
    #[error("command stream holds {commands} commands but {inputs} operand blobs")]
    LengthMismatch { commands: usize, inputs: usize },
    #[error("command {index} failed to decode")]
    Decode {
        index: usize,
        #[source]
        source: DecodeError,
    },
    #[error("command {index} ({opcode:?}) failed")]
    Command {
        index: usize,
        opcode: Opcode,
        #[source]
        source: HandlerError,
    },
}
