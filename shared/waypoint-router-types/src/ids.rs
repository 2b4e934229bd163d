use alloy_primitives::Address;

/// Wire sentinel resolved to the batch caller at dispatch time.
pub const MSG_SENDER: Address = Address::with_last_byte(0x01);

/// Wire sentinel resolved to the router (custody point) at dispatch time.
pub const ADDRESS_THIS: Address = Address::with_last_byte(0x02);

/// Asset moved by a command.
///
/// On the wire an asset is 20 bytes; the zero address denotes the chain's
/// native asset rather than a token contract.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Asset {
    Native,
    Token(Address),
}

impl Asset {
    pub fn from_wire(addr: Address) -> Self {
        if addr == Address::ZERO {
            Asset::Native
        } else {
            Asset::Token(addr)
        }
    }

    pub fn to_wire(self) -> Address {
        match self {
            Asset::Native => Address::ZERO,
            Asset::Token(addr) => addr,
        }
    }

    pub fn is_native(self) -> bool {
        matches!(self, Asset::Native)
    }
}

/// Payment destination, with placeholder variants resolved through the
/// execution context rather than compared as magic constants by handlers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Recipient {
    /// The caller of the batch.
    Caller,
    /// The router itself (the custody point).
    Router,
    Address(Address),
}

impl Recipient {
    pub fn from_wire(addr: Address) -> Self {
        if addr == MSG_SENDER {
            Recipient::Caller
        } else if addr == ADDRESS_THIS {
            Recipient::Router
        } else {
            Recipient::Address(addr)
        }
    }

    pub fn to_wire(self) -> Address {
        match self {
            Recipient::Caller => MSG_SENDER,
            Recipient::Router => ADDRESS_THIS,
            Recipient::Address(addr) => addr,
        }
    }
}

/// AMM protocol generation a swap command targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SwapProtocol {
    V2 = 2,
    V3 = 3,
}

impl TryFrom<u8> for SwapProtocol {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            2 => Ok(SwapProtocol::V2),
            3 => Ok(SwapProtocol::V3),
            _ => Err(()),
        }
    }
}

/// NFT marketplace an `NftBuy` command passes its calldata to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Marketplace {
    Seaport = 0,
    LooksRare = 1,
    Nftx = 2,
}

impl TryFrom<u8> for Marketplace {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Marketplace::Seaport),
            1 => Ok(Marketplace::LooksRare),
            2 => Ok(Marketplace::Nftx),
            _ => Err(()),
        }
    }
}
