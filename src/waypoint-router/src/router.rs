use alloy_primitives::Address;

use crate::context::ExecutionContext;
use crate::dispatch::{self, BatchReceipt};
use crate::errors::BatchError;
use crate::host::HostEnvironment;
use crate::lock::ReentrancyLock;

/// One batch entry point: the custody address, the wrapper-token contract and
/// the reentrancy lock guarding the entry point.
///
/// Cloning a `Router` shares its lock, so a clone models the same entry point
/// (used when an external-protocol delegate might call back in).
#[derive(Clone, Debug)]
pub struct Router {
    address: Address,
    wrapped_native: Address,
    lock: ReentrancyLock,
}

impl Router {
    pub fn new(address: Address, wrapped_native: Address) -> Self {
        Router {
            address,
            wrapped_native,
            lock: ReentrancyLock::new(),
        }
    }

    pub fn address(&self) -> Address {
        self.address
    }

    pub fn wrapped_native(&self) -> Address {
        self.wrapped_native
    }

    /// Execute one command batch.
    ///
    /// Lifecycle: reject `Expired` before anything else, take the reentrancy
    /// lock (released on every exit path), then run the dispatch loop. The
    /// host must be cloneable so a tolerated command failure can restore the
    /// pre-command snapshot. A returned error means the committing environment
    /// must discard every mutation this batch made; `Ok` carries the
    /// tolerated-failure log.
    pub fn execute<E: HostEnvironment + Clone>(
        &self,
        env: &mut E,
        caller: Address,
        commands: &[u8],
        inputs: &[Vec<u8>],
        deadline: u64,
    ) -> Result<BatchReceipt, BatchError> {
        if deadline < env.block_timestamp() {
            return Err(BatchError::Expired);
        }
        let _guard = self.lock.enter().ok_or(BatchError::Reentrant)?;

        let ctx = ExecutionContext {
            caller,
            router: self.address,
            wrapped_native: self.wrapped_native,
        };
        dispatch::run(env, &ctx, commands, inputs)
    }
}

/// Run a batch with committing-environment semantics over a cloneable host:
/// the batch executes against a scratch copy which is published only on
/// success, so a fatal failure leaves the host exactly as if the batch had
/// never been submitted.
pub fn execute_committed<E: HostEnvironment + Clone>(
    router: &Router,
    env: &mut E,
    caller: Address,
    commands: &[u8],
    inputs: &[Vec<u8>],
    deadline: u64,
) -> Result<BatchReceipt, BatchError> {
    let mut scratch = env.clone();
    let receipt = router.execute(&mut scratch, caller, commands, inputs, deadline)?;
    *env = scratch;
    Ok(receipt)
}
