use alloy_primitives::Address;

use waypoint_router_types::{Command, FLAG_ALLOW_REVERT};

/// Encode one typed command into its command byte and operand blob.
///
/// Exact inverse of the engine's `decode_command`: integers are big-endian,
/// variable sequences are length-prefixed, placeholders are written as their
/// wire sentinels.
pub fn encode_command(command: &Command, allow_revert: bool) -> (u8, Vec<u8>) {
    let mut tag = command.opcode() as u8;
    if allow_revert {
        tag |= FLAG_ALLOW_REVERT;
    }

    let mut buf = Vec::new();
    match command {
        Command::Transfer {
            asset,
            recipient,
            amount,
        } => {
            buf.extend_from_slice(asset.to_wire().as_slice());
            buf.extend_from_slice(recipient.to_wire().as_slice());
            buf.extend_from_slice(&amount.to_be_bytes::<32>());
        }
        Command::Sweep {
            asset,
            recipient,
            min_amount,
        } => {
            buf.extend_from_slice(asset.to_wire().as_slice());
            buf.extend_from_slice(recipient.to_wire().as_slice());
            buf.extend_from_slice(&min_amount.to_be_bytes::<32>());
        }
        Command::PayPortion {
            asset,
            recipient,
            bips,
        } => {
            buf.extend_from_slice(asset.to_wire().as_slice());
            buf.extend_from_slice(recipient.to_wire().as_slice());
            buf.extend_from_slice(&bips.to_be_bytes());
        }
        Command::WrapNative { recipient, amount } => {
            buf.extend_from_slice(recipient.to_wire().as_slice());
            buf.extend_from_slice(&amount.to_be_bytes::<32>());
        }
        Command::UnwrapNative { recipient, amount } => {
            buf.extend_from_slice(recipient.to_wire().as_slice());
            buf.extend_from_slice(&amount.to_be_bytes::<32>());
        }
        Command::UnwrapNativeWithFee {
            recipient,
            amount,
            fee_recipient,
            fee_bips,
        } => {
            buf.extend_from_slice(recipient.to_wire().as_slice());
            buf.extend_from_slice(&amount.to_be_bytes::<32>());
            buf.extend_from_slice(fee_recipient.to_wire().as_slice());
            buf.extend_from_slice(&fee_bips.to_be_bytes());
        }
        Command::Permit {
            owner,
            token,
            amount,
            deadline,
            signature,
        } => {
            buf.extend_from_slice(owner.as_slice());
            buf.extend_from_slice(token.as_slice());
            buf.extend_from_slice(&amount.to_be_bytes::<32>());
            buf.extend_from_slice(&deadline.to_be_bytes());
            buf.extend_from_slice(&(signature.len() as u16).to_be_bytes());
            buf.extend_from_slice(signature);
        }
        Command::BalanceCheck {
            owner,
            token,
            min_balance,
        } => {
            buf.extend_from_slice(owner.as_slice());
            buf.extend_from_slice(token.as_slice());
            buf.extend_from_slice(&min_balance.to_be_bytes::<32>());
        }
        Command::SwapExactIn {
            protocol,
            amount_in,
            min_amount_out,
            path,
            recipient,
        } => {
            buf.push(*protocol as u8);
            buf.extend_from_slice(&amount_in.to_be_bytes::<32>());
            buf.extend_from_slice(&min_amount_out.to_be_bytes::<32>());
            encode_path(&mut buf, path);
            buf.extend_from_slice(recipient.to_wire().as_slice());
        }
        Command::SwapExactOut {
            protocol,
            amount_out,
            max_amount_in,
            path,
            recipient,
        } => {
            buf.push(*protocol as u8);
            buf.extend_from_slice(&amount_out.to_be_bytes::<32>());
            buf.extend_from_slice(&max_amount_in.to_be_bytes::<32>());
            encode_path(&mut buf, path);
            buf.extend_from_slice(recipient.to_wire().as_slice());
        }
        Command::NftBuy {
            marketplace,
            value,
            calldata,
        } => {
            buf.push(*marketplace as u8);
            buf.extend_from_slice(&value.to_be_bytes::<32>());
            buf.extend_from_slice(&(calldata.len() as u32).to_be_bytes());
            buf.extend_from_slice(calldata);
        }
    }

    (tag, buf)
}

fn encode_path(buf: &mut Vec<u8>, path: &[Address]) {
    buf.push(path.len() as u8);
    for token in path {
        buf.extend_from_slice(token.as_slice());
    }
}
