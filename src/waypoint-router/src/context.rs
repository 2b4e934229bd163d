use alloy_primitives::Address;

use waypoint_router_types::Recipient;

/// Transient per-batch state: caller identity, the custody point and the
/// wrapper-token contract, plus placeholder resolution.
///
/// Created when dispatch starts and dropped when the batch ends; it never
/// outlives one batch.
#[derive(Clone, Copy, Debug)]
pub struct ExecutionContext {
    /// The account that submitted the batch.
    pub caller: Address,
    /// The router itself; the single custody point holding funds in transit.
    pub router: Address,
    /// Wrapper-token contract for the native asset.
    pub wrapped_native: Address,
}

impl ExecutionContext {
    /// Resolve a placeholder recipient to a concrete address.
    pub fn resolve(&self, recipient: Recipient) -> Address {
        match recipient {
            Recipient::Caller => self.caller,
            Recipient::Router => self.router,
            Recipient::Address(addr) => addr,
        }
    }
}
