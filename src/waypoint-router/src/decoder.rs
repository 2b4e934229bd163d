use alloy_primitives::{Address, U256};

use waypoint_router_types::{
    Asset, Command, Marketplace, Opcode, Recipient, SwapProtocol, FLAG_ALLOW_REVERT, OPCODE_MASK,
};

use crate::errors::DecodeError;

/// Decode one command byte and its operand blob into a typed command plus the
/// allow-revert flag.
///
/// The blob must be consumed exactly: truncation and trailing bytes are both
/// rejected, so re-encoding the result reproduces the original bytes.
pub fn decode_command(tag_byte: u8, blob: &[u8]) -> Result<(Command, bool), DecodeError> {
    let raw_opcode = tag_byte & OPCODE_MASK;
    let allow_revert = tag_byte & FLAG_ALLOW_REVERT != 0;
    let opcode =
        Opcode::try_from(raw_opcode).map_err(|_| DecodeError::UnknownOpcode(raw_opcode))?;

    let mut i = 0usize;
    let command = match opcode {
        Opcode::Transfer => {
            let asset = read_asset(blob, &mut i)?;
            let recipient = read_recipient(blob, &mut i)?;
            let amount = read_u256(blob, &mut i)?;
            Command::Transfer {
                asset,
                recipient,
                amount,
            }
        }
        Opcode::Sweep => {
            let asset = read_asset(blob, &mut i)?;
            let recipient = read_recipient(blob, &mut i)?;
            let min_amount = read_u256(blob, &mut i)?;
            Command::Sweep {
                asset,
                recipient,
                min_amount,
            }
        }
        Opcode::PayPortion => {
            let asset = read_asset(blob, &mut i)?;
            let recipient = read_recipient(blob, &mut i)?;
            let bips = read_u16(blob, &mut i)?;
            Command::PayPortion {
                asset,
                recipient,
                bips,
            }
        }
        Opcode::WrapNative => {
            let recipient = read_recipient(blob, &mut i)?;
            let amount = read_u256(blob, &mut i)?;
            Command::WrapNative { recipient, amount }
        }
        Opcode::UnwrapNative => {
            let recipient = read_recipient(blob, &mut i)?;
            let amount = read_u256(blob, &mut i)?;
            Command::UnwrapNative { recipient, amount }
        }
        Opcode::UnwrapNativeWithFee => {
            let recipient = read_recipient(blob, &mut i)?;
            let amount = read_u256(blob, &mut i)?;
            let fee_recipient = read_recipient(blob, &mut i)?;
            let fee_bips = read_u16(blob, &mut i)?;
            Command::UnwrapNativeWithFee {
                recipient,
                amount,
                fee_recipient,
                fee_bips,
            }
        }
        Opcode::Permit => {
            let owner = read_address(blob, &mut i)?;
            let token = read_address(blob, &mut i)?;
            let amount = read_u256(blob, &mut i)?;
            let deadline = read_u64(blob, &mut i)?;
            let sig_len = read_u16(blob, &mut i)? as usize;
            let signature = read_vec(blob, &mut i, sig_len)?;
            Command::Permit {
                owner,
                token,
                amount,
                deadline,
                signature,
            }
        }
        Opcode::BalanceCheck => {
            let owner = read_address(blob, &mut i)?;
            let token = read_address(blob, &mut i)?;
            let min_balance = read_u256(blob, &mut i)?;
            Command::BalanceCheck {
                owner,
                token,
                min_balance,
            }
        }
        Opcode::SwapExactIn => {
            let protocol = read_protocol(blob, &mut i)?;
            let amount_in = read_u256(blob, &mut i)?;
            let min_amount_out = read_u256(blob, &mut i)?;
            let path = read_path(blob, &mut i)?;
            let recipient = read_recipient(blob, &mut i)?;
            Command::SwapExactIn {
                protocol,
                amount_in,
                min_amount_out,
                path,
                recipient,
            }
        }
        Opcode::SwapExactOut => {
            let protocol = read_protocol(blob, &mut i)?;
            let amount_out = read_u256(blob, &mut i)?;
            let max_amount_in = read_u256(blob, &mut i)?;
            let path = read_path(blob, &mut i)?;
            let recipient = read_recipient(blob, &mut i)?;
            Command::SwapExactOut {
                protocol,
                amount_out,
                max_amount_in,
                path,
                recipient,
            }
        }
        Opcode::NftBuy => {
            let marketplace = read_marketplace(blob, &mut i)?;
            let value = read_u256(blob, &mut i)?;
            let calldata_len = read_u32(blob, &mut i)? as usize;
            let calldata = read_vec(blob, &mut i, calldata_len)?;
            Command::NftBuy {
                marketplace,
                value,
                calldata,
            }
        }
    };

    if i != blob.len() {
        return Err(DecodeError::TrailingBytes(blob.len() - i));
    }

    Ok((command, allow_revert))
}

fn read_vec(bytes: &[u8], i: &mut usize, len: usize) -> Result<Vec<u8>, DecodeError> {
    if bytes.len() < *i + len {
        return Err(DecodeError::Truncated);
    }
    let out = bytes[*i..*i + len].to_vec();
    *i += len;
    Ok(out)
}

fn read_u16(bytes: &[u8], i: &mut usize) -> Result<u16, DecodeError> {
    if bytes.len() < *i + 2 {
        return Err(DecodeError::Truncated);
    }
    let mut buf = [0u8; 2];
    buf.copy_from_slice(&bytes[*i..*i + 2]);
    *i += 2;
    Ok(u16::from_be_bytes(buf))
}

fn read_u32(bytes: &[u8], i: &mut usize) -> Result<u32, DecodeError> {
    if bytes.len() < *i + 4 {
        return Err(DecodeError::Truncated);
    }
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[*i..*i + 4]);
    *i += 4;
    Ok(u32::from_be_bytes(buf))
}

fn read_u64(bytes: &[u8], i: &mut usize) -> Result<u64, DecodeError> {
    if bytes.len() < *i + 8 {
        return Err(DecodeError::Truncated);
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[*i..*i + 8]);
    *i += 8;
    Ok(u64::from_be_bytes(buf))
}

fn read_u256(bytes: &[u8], i: &mut usize) -> Result<U256, DecodeError> {
    if bytes.len() < *i + 32 {
        return Err(DecodeError::Truncated);
    }
    let word = &bytes[*i..*i + 32];
    *i += 32;
    Ok(U256::from_be_slice(word))
}

fn read_address(bytes: &[u8], i: &mut usize) -> Result<Address, DecodeError> {
    if bytes.len() < *i + 20 {
        return Err(DecodeError::Truncated);
    }
    let addr = Address::from_slice(&bytes[*i..*i + 20]);
    *i += 20;
    Ok(addr)
}

fn read_asset(bytes: &[u8], i: &mut usize) -> Result<Asset, DecodeError> {
    Ok(Asset::from_wire(read_address(bytes, i)?))
}

fn read_recipient(bytes: &[u8], i: &mut usize) -> Result<Recipient, DecodeError> {
    Ok(Recipient::from_wire(read_address(bytes, i)?))
}

fn read_protocol(bytes: &[u8], i: &mut usize) -> Result<SwapProtocol, DecodeError> {
    if bytes.len() <= *i {
        return Err(DecodeError::Truncated);
    }
    let b = bytes[*i];
    *i += 1;
    SwapProtocol::try_from(b).map_err(|_| DecodeError::UnknownProtocol(b))
}

fn read_marketplace(bytes: &[u8], i: &mut usize) -> Result<Marketplace, DecodeError> {
    if bytes.len() <= *i {
        return Err(DecodeError::Truncated);
    }
    let b = bytes[*i];
    *i += 1;
    Marketplace::try_from(b).map_err(|_| DecodeError::UnknownMarketplace(b))
}

fn read_path(bytes: &[u8], i: &mut usize) -> Result<Vec<Address>, DecodeError> {
    if bytes.len() <= *i {
        return Err(DecodeError::Truncated);
    }
    let len = bytes[*i] as usize;
    *i += 1;
    if len < 2 {
        return Err(DecodeError::PathTooShort(len));
    }
    let mut path = Vec::with_capacity(len);
    for _ in 0..len {
        path.push(read_address(bytes, i)?);
    }
    Ok(path)
}
