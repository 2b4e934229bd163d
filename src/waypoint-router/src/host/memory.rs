use std::collections::BTreeMap;

use alloy_primitives::{Address, B256, U256};

use waypoint_router_types::{Asset, Marketplace, SwapProtocol};

use crate::errors::HostError;
use crate::host::HostEnvironment;

/// Permit recorded off-line for later verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedPermit {
    pub amount: U256,
    pub deadline: u64,
    pub signature: Vec<u8>,
}

/// In-memory reference host.
///
/// Backs the test suite and any embedding that wants deterministic replay:
/// balances, pools, permits and listings are plain maps, and the whole host is
/// `Clone`, which is what gives [`crate::router::execute_committed`] its
/// all-or-nothing visibility.
///
/// Pools trade at a fixed 1:1 rate bounded by the pool account's balances;
/// pricing formulas are deliberately out of scope.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemoryHost {
    timestamp: u64,
    wrapped: Address,
    balances: BTreeMap<(Asset, Address), U256>,
    pools: BTreeMap<(SwapProtocol, Address, Address), Address>,
    permits: BTreeMap<(Address, Address), RecordedPermit>,
    allowances: BTreeMap<(Address, Address, Address), U256>,
    listings: BTreeMap<(Marketplace, B256), U256>,
    purchases: Vec<(Marketplace, B256)>,
}

impl MemoryHost {
    pub fn new(timestamp: u64, wrapped: Address) -> Self {
        MemoryHost {
            timestamp,
            wrapped,
            ..MemoryHost::default()
        }
    }

    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    /// Credit `owner` with `amount` of `asset`.
    pub fn fund(&mut self, asset: Asset, owner: Address, amount: U256) {
        let entry = self.balances.entry((asset, owner)).or_insert(U256::ZERO);
        *entry += amount;
    }

    /// Register a pool address for a token pair; its liquidity is whatever the
    /// pool address has been funded with.
    pub fn add_pool(
        &mut self,
        protocol: SwapProtocol,
        token_a: Address,
        token_b: Address,
        pool: Address,
    ) {
        self.pools.insert(pool_key(protocol, token_a, token_b), pool);
    }

    pub fn register_permit(&mut self, owner: Address, token: Address, permit: RecordedPermit) {
        self.permits.insert((owner, token), permit);
    }

    pub fn list_nft(&mut self, marketplace: Marketplace, listing: B256, price: U256) {
        self.listings.insert((marketplace, listing), price);
    }

    pub fn allowance(&self, owner: Address, spender: Address, token: Address) -> U256 {
        self.allowances
            .get(&(owner, spender, token))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    pub fn purchases(&self) -> &[(Marketplace, B256)] {
        &self.purchases
    }

    fn debit(&mut self, asset: Asset, owner: Address, amount: U256) -> Result<(), HostError> {
        let available = self.balance_of(asset, owner);
        if available < amount {
            return Err(HostError::InsufficientBalance {
                asset,
                needed: amount,
                available,
            });
        }
        self.balances.insert((asset, owner), available - amount);
        Ok(())
    }

    fn credit(&mut self, asset: Asset, owner: Address, amount: U256) {
        let entry = self.balances.entry((asset, owner)).or_insert(U256::ZERO);
        *entry += amount;
    }
}

fn pool_key(
    protocol: SwapProtocol,
    token_a: Address,
    token_b: Address,
) -> (SwapProtocol, Address, Address) {
    if token_a <= token_b {
        (protocol, token_a, token_b)
    } else {
        (protocol, token_b, token_a)
    }
}

impl HostEnvironment for MemoryHost {
    fn block_timestamp(&self) -> u64 {
        self.timestamp
    }

    fn balance_of(&self, asset: Asset, owner: Address) -> U256 {
        self.balances
            .get(&(asset, owner))
            .copied()
            .unwrap_or(U256::ZERO)
    }

    fn transfer(
        &mut self,
        asset: Asset,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), HostError> {
        self.debit(asset, from, amount)?;
        self.credit(asset, to, amount);
        Ok(())
    }

    fn wrap_native(&mut self, owner: Address, amount: U256) -> Result<(), HostError> {
        self.debit(Asset::Native, owner, amount)?;
        self.credit(Asset::Token(self.wrapped), owner, amount);
        Ok(())
    }

    fn unwrap_native(&mut self, owner: Address, amount: U256) -> Result<(), HostError> {
        self.debit(Asset::Token(self.wrapped), owner, amount)?;
        self.credit(Asset::Native, owner, amount);
        Ok(())
    }

    fn verify_permit(
        &mut self,
        owner: Address,
        spender: Address,
        token: Address,
        amount: U256,
        deadline: u64,
        signature: &[u8],
    ) -> Result<(), HostError> {
        let recorded = self
            .permits
            .get(&(owner, token))
            .ok_or(HostError::PermitRejected)?;
        if recorded.signature != signature
            || recorded.deadline != deadline
            || amount > recorded.amount
            || self.timestamp > deadline
        {
            return Err(HostError::PermitRejected);
        }
        self.allowances.insert((owner, spender, token), amount);
        Ok(())
    }

    fn pool_for(
        &self,
        protocol: SwapProtocol,
        token_a: Address,
        token_b: Address,
    ) -> Result<Address, HostError> {
        self.pools
            .get(&pool_key(protocol, token_a, token_b))
            .copied()
            .ok_or(HostError::UnknownPool {
                protocol,
                token_a,
                token_b,
            })
    }

    fn swap(
        &mut self,
        _protocol: SwapProtocol,
        pool: Address,
        token_in: Address,
        token_out: Address,
        amount_in: U256,
        owner: Address,
    ) -> Result<U256, HostError> {
        let amount_out = amount_in; // fixed 1:1 rate
        let pool_reserve = self.balance_of(Asset::Token(token_out), pool);
        if pool_reserve < amount_out {
            return Err(HostError::ProtocolFailure("pool reserve exhausted"));
        }
        self.transfer(Asset::Token(token_in), owner, pool, amount_in)?;
        self.transfer(Asset::Token(token_out), pool, owner, amount_out)?;
        Ok(amount_out)
    }

    fn quote_exact_out(
        &self,
        _protocol: SwapProtocol,
        _pool: Address,
        _token_in: Address,
        _token_out: Address,
        amount_out: U256,
    ) -> Result<U256, HostError> {
        Ok(amount_out) // fixed 1:1 rate
    }

    fn buy_nft(
        &mut self,
        marketplace: Marketplace,
        buyer: Address,
        value: U256,
        calldata: &[u8],
    ) -> Result<(), HostError> {
        // The reference marketplace understands exactly one calldata shape: a
        // 32-byte listing id.
        if calldata.len() != 32 {
            return Err(HostError::ProtocolFailure("malformed purchase calldata"));
        }
        let listing = B256::from_slice(calldata);
        let price = self
            .listings
            .get(&(marketplace, listing))
            .copied()
            .ok_or(HostError::ProtocolFailure("unknown listing"))?;
        if value < price {
            return Err(HostError::ProtocolFailure("payment below listing price"));
        }
        self.debit(Asset::Native, buyer, price)?;
        self.listings.remove(&(marketplace, listing));
        self.purchases.push((marketplace, listing));
        Ok(())
    }
}
