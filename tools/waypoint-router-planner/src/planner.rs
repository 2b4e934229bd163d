use thiserror::Error;

use waypoint_router_types::{Command, FEE_BIPS_BASE};

use crate::encoder::encode_command;

/// Construction-time validation failure: a caller bug surfaced before the
/// wire, never at dispatch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PlanError {
    #[error("bips {0} outside [0, 10000]")]
    InvalidBips(u16),
    #[error("swap path must contain at least 2 tokens, got {0}")]
    PathTooShort(usize),
    #[error("swap path limited to 255 tokens, got {0}")]
    PathTooLong(usize),
    #[error("permit signature limited to 65535 bytes, got {0}")]
    SignatureTooLong(usize),
    #[error("purchase calldata limited to 4 GiB, got {0} bytes")]
    CalldataTooLong(usize),
}

/// Ordered batch builder.
///
/// Commands are validated and serialised as they are added; `finish` yields
/// the index-aligned `(command stream, operand blobs)` pair for one
/// `execute` call.
#[derive(Debug, Default)]
pub struct BatchPlanner {
    commands: Vec<u8>,
    inputs: Vec<Vec<u8>>,
}

impl BatchPlanner {
    pub fn new() -> Self {
        BatchPlanner::default()
    }

    /// Append a command whose failure aborts the batch.
    pub fn add_command(&mut self, command: Command) -> Result<&mut Self, PlanError> {
        self.push(command, false)
    }

    /// Append a command whose own failure is tolerated at dispatch.
    pub fn add_command_allow_revert(&mut self, command: Command) -> Result<&mut Self, PlanError> {
        self.push(command, true)
    }

    fn push(&mut self, command: Command, allow_revert: bool) -> Result<&mut Self, PlanError> {
        validate(&command)?;
        let (tag, blob) = encode_command(&command, allow_revert);
        self.commands.push(tag);
        self.inputs.push(blob);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// The finished wire pair. The planner never executes.
    pub fn finish(self) -> (Vec<u8>, Vec<Vec<u8>>) {
        (self.commands, self.inputs)
    }
}

fn validate(command: &Command) -> Result<(), PlanError> {
    match command {
        Command::PayPortion { bips, .. } if *bips > FEE_BIPS_BASE => {
            Err(PlanError::InvalidBips(*bips))
        }
        Command::UnwrapNativeWithFee { fee_bips, .. } if *fee_bips > FEE_BIPS_BASE => {
            Err(PlanError::InvalidBips(*fee_bips))
        }
        Command::SwapExactIn { path, .. } | Command::SwapExactOut { path, .. } => {
            if path.len() < 2 {
                Err(PlanError::PathTooShort(path.len()))
            } else if path.len() > u8::MAX as usize {
                Err(PlanError::PathTooLong(path.len()))
            } else {
                Ok(())
            }
        }
        Command::Permit { signature, .. } if signature.len() > u16::MAX as usize => {
            Err(PlanError::SignatureTooLong(signature.len()))
        }
        Command::NftBuy { calldata, .. } if calldata.len() > u32::MAX as usize => {
            Err(PlanError::CalldataTooLong(calldata.len()))
        }
        _ => Ok(()),
    }
}
