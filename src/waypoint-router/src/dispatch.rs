//! Strictly-sequential batch dispatch.

use tracing::{debug, warn};

use waypoint_router_types::Opcode;

use crate::context::ExecutionContext;
use crate::decoder::decode_command;
use crate::errors::{BatchError, HandlerError};
use crate::handlers;
use crate::host::HostEnvironment;

/// A command failure tolerated under the allow-revert flag.
#[derive(Debug)]
pub struct ToleratedFailure {
    pub index: usize,
    pub opcode: Opcode,
    pub error: HandlerError,
}

/// Outcome of a completed batch: empty on a clean run, otherwise the
/// per-command failures that were tolerated and skipped over.
#[derive(Debug, Default)]
pub struct BatchReceipt {
    pub tolerated: Vec<ToleratedFailure>,
}

/// Walk the command stream in order, decoding and dispatching each command.
///
/// Decode failures are fatal regardless of the allow-revert bit: an
/// undecodable command cannot be safely skipped. Handler failures follow the
/// per-command policy: an allow-revert command runs against a pre-command
/// snapshot of the host, so a failure after a partial mutation (a multi-hop
/// swap bailing on a later hop, an exact-in bound violated after the hops ran)
/// is discarded wholesale before the batch moves on. A fatal failure keeps no
/// rollback state here; the returned error is the signal for the committing
/// environment to discard the batch's mutations.
pub(crate) fn run<E: HostEnvironment + Clone>(
    env: &mut E,
    ctx: &ExecutionContext,
    commands: &[u8],
    inputs: &[Vec<u8>],
) -> Result<BatchReceipt, BatchError> {
    if commands.len() != inputs.len() {
        return Err(BatchError::LengthMismatch {
            commands: commands.len(),
            inputs: inputs.len(),
        });
    }

    let mut receipt = BatchReceipt::default();
    for (index, (&tag_byte, blob)) in commands.iter().zip(inputs).enumerate() {
        let (command, allow_revert) =
            decode_command(tag_byte, blob).map_err(|source| BatchError::Decode { index, source })?;
        let opcode = command.opcode();
        debug!(index, ?opcode, allow_revert, "dispatching command");

        if allow_revert {
            let snapshot = env.clone();
            if let Err(error) = handlers::dispatch(env, ctx, command) {
                *env = snapshot;
                warn!(index, ?opcode, %error, "tolerated command failure");
                receipt.tolerated.push(ToleratedFailure {
                    index,
                    opcode,
                    error,
                });
            }
        } else if let Err(source) = handlers::dispatch(env, ctx, command) {
            return Err(BatchError::Command {
                index,
                opcode,
                source,
            });
        }
    }
    Ok(receipt)
}
