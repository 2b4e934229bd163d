//! Host environment collaborators.
//!
//! The engine owns no balances itself: every value movement goes through the
//! [`HostEnvironment`] trait, implemented on-chain by the committing execution
//! environment and off-chain by [`MemoryHost`].

mod memory;

pub use memory::{MemoryHost, RecordedPermit};

use alloy_primitives::{Address, U256};

use waypoint_router_types::{Asset, Marketplace, SwapProtocol};

use crate::errors::HostError;

/// Collaborator interfaces the engine consumes synchronously: asset transfer,
/// wrapper-token deposit/withdraw, permit verification, deterministic pool
/// discovery, per-hop swaps and marketplace purchase pass-through.
pub trait HostEnvironment {
    fn block_timestamp(&self) -> u64;

    fn balance_of(&self, asset: Asset, owner: Address) -> U256;

    /// Move `amount` of `asset` between accounts.
    fn transfer(
        &mut self,
        asset: Asset,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), HostError>;

    /// Convert `amount` of `owner`'s native asset into the wrapper token, 1:1.
    fn wrap_native(&mut self, owner: Address, amount: U256) -> Result<(), HostError>;

    /// Convert `amount` of `owner`'s wrapper token back into native asset, 1:1.
    fn unwrap_native(&mut self, owner: Address, amount: U256) -> Result<(), HostError>;

    /// Verify a signed allowance of `token` from `owner` to `spender`.
    fn verify_permit(
        &mut self,
        owner: Address,
        spender: Address,
        token: Address,
        amount: U256,
        deadline: u64,
        signature: &[u8],
    ) -> Result<(), HostError>;

    /// Deterministic pool address for a token pair under one protocol
    /// generation.
    fn pool_for(
        &self,
        protocol: SwapProtocol,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, HostError>;

    /// Execute one hop: `owner` pays `amount_in` of `token_in` to `pool` and
    /// receives the returned amount of `token_out`.
    fn swap(
        &mut self,
        protocol: SwapProtocol,
        pool: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        owner: Address,
    ) -> Result<U256, HostError>;

    /// Input amount one hop would require to produce `amount_out`.
    fn quote_exact_out(
        &self,
        protocol: SwapProtocol,
        pool: Address,
        token_in: Address,
        token_out: Address,
        amount_out: U256,
    ) -> Result<U256, HostError>;

    /// Forward raw purchase calldata plus `value` of `buyer`'s native asset to
    /// a marketplace.
    fn buy_nft(
        &mut self,
        marketplace: Marketplace,
        buyer: Address,
        value: U256,
        calldata: &[u8],
    ) -> Result<(), HostError>;
}
