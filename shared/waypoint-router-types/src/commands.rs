use alloy_primitives::{Address, U256};

use crate::ids::{Asset, Marketplace, Recipient, SwapProtocol};

/// Bit 7 of the command byte: tolerate this command's own failure.
pub const FLAG_ALLOW_REVERT: u8 = 0x80;

/// Bits 0-6 of the command byte carry the opcode.
pub const OPCODE_MASK: u8 = 0x7f;

/// Basis-points denominator for `PayPortion` and unwrap fees.
pub const FEE_BIPS_BASE: u16 = 10_000;

/// Amount sentinel: substitute the custody point's entire current balance.
pub const CONTRACT_BALANCE: U256 = U256::from_limbs([0, 0, 0, 1 << 63]);

/// Opcodes supported by the v1 command stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Transfer = 0x00,
    Sweep = 0x01,
    PayPortion = 0x02,
    WrapNative = 0x03,
    UnwrapNative = 0x04,
    UnwrapNativeWithFee = 0x05,
    Permit = 0x06,
    BalanceCheck = 0x07,

    SwapExactIn = 0x10,
    SwapExactOut = 0x11,

    NftBuy = 0x20,
}

impl TryFrom<u8> for Opcode {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        use Opcode::*;
        let op = match value {
            0x00 => Transfer,
            0x01 => Sweep,
            0x02 => PayPortion,
            0x03 => WrapNative,
            0x04 => UnwrapNative,
            0x05 => UnwrapNativeWithFee,
            0x06 => Permit,
            0x07 => BalanceCheck,
            0x10 => SwapExactIn,
            0x11 => SwapExactOut,
            0x20 => NftBuy,
            _ => return Err(()),
        };
        Ok(op)
    }
}

/// Decoded representation of a single command.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Move `amount` of `asset` from custody to `recipient`.
    Transfer {
        asset: Asset,
        recipient: Recipient,
        amount: U256,
    },
    /// Move the entire custody balance of `asset`, asserting it is at least
    /// `min_amount`.
    Sweep {
        asset: Asset,
        recipient: Recipient,
        min_amount: U256,
    },
    /// Move `balance * bips / 10_000` of `asset` to `recipient`.
    PayPortion {
        asset: Asset,
        recipient: Recipient,
        bips: u16,
    },
    /// Convert native asset held in custody into its wrapper token.
    WrapNative { recipient: Recipient, amount: U256 },
    /// Convert wrapper token held in custody back into native asset.
    UnwrapNative { recipient: Recipient, amount: U256 },
    /// Unwrap with a basis-points cut paid to `fee_recipient` first.
    UnwrapNativeWithFee {
        recipient: Recipient,
        amount: U256,
        fee_recipient: Recipient,
        fee_bips: u16,
    },
    /// Verify a signed allowance with the external permit primitive.
    Permit {
        owner: Address,
        token: Address,
        amount: U256,
        deadline: u64,
        signature: Vec<u8>,
    },
    /// Assert `owner` holds at least `min_balance` of `token`.
    BalanceCheck {
        owner: Address,
        token: Address,
        min_balance: U256,
    },
    /// Multi-hop exact-input swap along `path`.
    SwapExactIn {
        protocol: SwapProtocol,
        amount_in: U256,
        min_amount_out: U256,
        path: Vec<Address>,
        recipient: Recipient,
    },
    /// Multi-hop exact-output swap along `path`.
    SwapExactOut {
        protocol: SwapProtocol,
        amount_out: U256,
        max_amount_in: U256,
        path: Vec<Address>,
        recipient: Recipient,
    },
    /// Raw purchase calldata passed through to an NFT marketplace, funded
    /// with `value` of the native asset from custody.
    NftBuy {
        marketplace: Marketplace,
        value: U256,
        calldata: Vec<u8>,
    },
}

impl Command {
    pub fn opcode(&self) -> Opcode {
        match self {
            Command::Transfer { .. } => Opcode::Transfer,
            Command::Sweep { .. } => Opcode::Sweep,
            Command::PayPortion { .. } => Opcode::PayPortion,
            Command::WrapNative { .. } => Opcode::WrapNative,
            Command::UnwrapNative { .. } => Opcode::UnwrapNative,
            Command::UnwrapNativeWithFee { .. } => Opcode::UnwrapNativeWithFee,
            Command::Permit { .. } => Opcode::Permit,
            Command::BalanceCheck { .. } => Opcode::BalanceCheck,
            Command::SwapExactIn { .. } => Opcode::SwapExactIn,
            Command::SwapExactOut { .. } => Opcode::SwapExactOut,
            Command::NftBuy { .. } => Opcode::NftBuy,
        }
    }
}
