//! One state-transition function per opcode.
//!
//! Every handler operates exclusively on the batch's custody point
//! (`ctx.router`); none creates a new custody point. Failures here are
//! [`HandlerError`]s, subject to the per-command allow-revert policy upstream.

use alloy_primitives::{Address, U256};

use waypoint_router_types::{
    Asset, Command, Marketplace, Recipient, SwapProtocol, CONTRACT_BALANCE, FEE_BIPS_BASE,
};

use crate::context::ExecutionContext;
use crate::errors::{HandlerError, HostError};
use crate::host::HostEnvironment;

pub(crate) fn dispatch<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    command: Command,
) -> Result<(), HandlerError> {
    match command {
        Command::Transfer {
            asset,
            recipient,
            amount,
        } => transfer(env, ctx, asset, recipient, amount),
        Command::Sweep {
            asset,
            recipient,
            min_amount,
        } => sweep(env, ctx, asset, recipient, min_amount),
        Command::PayPortion {
            asset,
            recipient,
            bips,
        } => pay_portion(env, ctx, asset, recipient, bips),
        Command::WrapNative { recipient, amount } => wrap_native(env, ctx, recipient, amount),
        Command::UnwrapNative { recipient, amount } => {
            unwrap_native(env, ctx, recipient, amount, None)
        }
        Command::UnwrapNativeWithFee {
            recipient,
            amount,
            fee_recipient,
            fee_bips,
        } => unwrap_native(env, ctx, recipient, amount, Some((fee_recipient, fee_bips))),
        Command::Permit {
            owner,
            token,
            amount,
            deadline,
            signature,
        } => {
            // The router is the spender: the permit authorises it to pull
            // funds into custody.
            env.verify_permit(owner, ctx.router, token, amount, deadline, &signature)?;
            Ok(())
        }
        Command::BalanceCheck {
            owner,
            token,
            min_balance,
        } => {
            let available = env.balance_of(Asset::Token(token), owner);
            if available < min_balance {
                return Err(HandlerError::InsufficientBalance {
                    asset: Asset::Token(token),
                    needed: min_balance,
                    available,
                });
            }
            Ok(())
        }
        Command::SwapExactIn {
            protocol,
            amount_in,
            min_amount_out,
            path,
            recipient,
        } => swap_exact_in(env, ctx, protocol, amount_in, min_amount_out, &path, recipient),
        Command::SwapExactOut {
            protocol,
            amount_out,
            max_amount_in,
            path,
            recipient,
        } => swap_exact_out(env, ctx, protocol, amount_out, max_amount_in, &path, recipient),
        Command::NftBuy {
            marketplace,
            value,
            calldata,
        } => nft_buy(env, ctx, marketplace, value, &calldata),
    }
}

/// Exact `floor(balance * bips / 10_000)`.
///
/// Decomposed so the intermediate product cannot wrap 256 bits even when
/// `balance` is `U256::MAX`: with `balance = q * 10_000 + r`, the portion is
/// `q * bips + r * bips / 10_000`, and both terms stay in range.
fn portion_of(balance: U256, bips: u16) -> U256 {
    let base = U256::from(FEE_BIPS_BASE);
    let bips = U256::from(bips);
    (balance / base) * bips + (balance % base) * bips / base
}

/// Substitute the custody point's entire balance for the sentinel amount.
fn resolve_amount<E: HostEnvironment>(
    env: &E,
    ctx: &ExecutionContext,
    asset: Asset,
    amount: U256,
) -> U256 {
    if amount == CONTRACT_BALANCE {
        env.balance_of(asset, ctx.router)
    } else {
        amount
    }
}

fn transfer<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    asset: Asset,
    recipient: Recipient,
    amount: U256,
) -> Result<(), HandlerError> {
    let amount = resolve_amount(env, ctx, asset, amount);
    let to = ctx.resolve(recipient);
    if to != ctx.router && amount > U256::ZERO {
        env.transfer(asset, ctx.router, to, amount)?;
    }
    Ok(())
}

fn sweep<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    asset: Asset,
    recipient: Recipient,
    min_amount: U256,
) -> Result<(), HandlerError> {
    let balance = env.balance_of(asset, ctx.router);
    if balance < min_amount {
        return Err(HandlerError::InsufficientBalance {
            asset,
            needed: min_amount,
            available: balance,
        });
    }
    let to = ctx.resolve(recipient);
    if to != ctx.router && balance > U256::ZERO {
        env.transfer(asset, ctx.router, to, balance)?;
    }
    Ok(())
}

fn pay_portion<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    asset: Asset,
    recipient: Recipient,
    bips: u16,
) -> Result<(), HandlerError> {
    if bips > FEE_BIPS_BASE {
        return Err(HandlerError::InvalidBips(bips));
    }
    let balance = env.balance_of(asset, ctx.router);
    let portion = portion_of(balance, bips);
    let to = ctx.resolve(recipient);
    if to != ctx.router && portion > U256::ZERO {
        env.transfer(asset, ctx.router, to, portion)?;
    }
    Ok(())
}

fn wrap_native<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    recipient: Recipient,
    amount: U256,
) -> Result<(), HandlerError> {
    let amount = resolve_amount(env, ctx, Asset::Native, amount);
    if amount > U256::ZERO {
        env.wrap_native(ctx.router, amount)?;
    }
    let to = ctx.resolve(recipient);
    if to != ctx.router && amount > U256::ZERO {
        env.transfer(Asset::Token(ctx.wrapped_native), ctx.router, to, amount)?;
    }
    Ok(())
}

fn unwrap_native<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    recipient: Recipient,
    amount: U256,
    fee: Option<(Recipient, u16)>,
) -> Result<(), HandlerError> {
    if let Some((_, fee_bips)) = fee {
        if fee_bips > FEE_BIPS_BASE {
            return Err(HandlerError::InvalidBips(fee_bips));
        }
    }
    let amount = resolve_amount(env, ctx, Asset::Token(ctx.wrapped_native), amount);
    if amount == U256::ZERO {
        return Ok(());
    }
    env.unwrap_native(ctx.router, amount)?;

    let mut remainder = amount;
    if let Some((fee_recipient, fee_bips)) = fee {
        let cut = portion_of(amount, fee_bips);
        let fee_to = ctx.resolve(fee_recipient);
        if fee_to != ctx.router && cut > U256::ZERO {
            env.transfer(Asset::Native, ctx.router, fee_to, cut)?;
        }
        remainder -= cut;
    }

    let to = ctx.resolve(recipient);
    if to != ctx.router && remainder > U256::ZERO {
        env.transfer(Asset::Native, ctx.router, to, remainder)?;
    }
    Ok(())
}

fn swap_exact_in<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    protocol: SwapProtocol,
    amount_in: U256,
    min_amount_out: U256,
    path: &[Address],
    recipient: Recipient,
) -> Result<(), HandlerError> {
    let Some(&token_in) = path.first() else {
        return Err(HandlerError::ExternalProtocol(HostError::ProtocolFailure(
            "empty swap path",
        )));
    };
    let amount_in = resolve_amount(env, ctx, Asset::Token(token_in), amount_in);
    let amount_out = run_hops(env, ctx, protocol, path, amount_in)?;
    if amount_out < min_amount_out {
        return Err(HandlerError::TooLittleReceived {
            amount: amount_out,
            minimum: min_amount_out,
        });
    }
    deliver_output(env, ctx, path, amount_out, recipient)
}

fn swap_exact_out<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    protocol: SwapProtocol,
    amount_out: U256,
    max_amount_in: U256,
    path: &[Address],
    recipient: Recipient,
) -> Result<(), HandlerError> {
    // Quote backwards through the path first so the input bound is checked
    // before any hop executes.
    let mut required = amount_out;
    for pair in path.windows(2).rev() {
        let pool = env.pool_for(protocol, pair[0], pair[1])?;
        required = env.quote_exact_out(protocol, pool, pair[0], pair[1], required)?;
    }
    if required > max_amount_in {
        return Err(HandlerError::ExcessiveInputAmount {
            amount: required,
            maximum: max_amount_in,
        });
    }
    let received = run_hops(env, ctx, protocol, path, required)?;
    deliver_output(env, ctx, path, received, recipient)
}

fn run_hops<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    protocol: SwapProtocol,
    path: &[Address],
    amount_in: U256,
) -> Result<U256, HandlerError> {
    let mut amount = amount_in;
    for pair in path.windows(2) {
        let pool = env.pool_for(protocol, pair[0], pair[1])?;
        amount = env.swap(protocol, pool, pair[0], pair[1], amount, ctx.router)?;
    }
    Ok(amount)
}

fn deliver_output<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    path: &[Address],
    amount: U256,
    recipient: Recipient,
) -> Result<(), HandlerError> {
    let token_out = *path.last().unwrap_or(&Address::ZERO);
    let to = ctx.resolve(recipient);
    if to != ctx.router && amount > U256::ZERO {
        env.transfer(Asset::Token(token_out), ctx.router, to, amount)?;
    }
    Ok(())
}

fn nft_buy<E: HostEnvironment>(
    env: &mut E,
    ctx: &ExecutionContext,
    marketplace: Marketplace,
    value: U256,
    calldata: &[u8],
) -> Result<(), HandlerError> {
    env.buy_nft(marketplace, ctx.router, value, calldata)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryHost;
    use alloy_primitives::address;

    const WRAPPED: Address = address!("00000000000000000000000000000000000000ee");

    fn ctx() -> ExecutionContext {
        ExecutionContext {
            caller: address!("00000000000000000000000000000000000000c1"),
            router: address!("00000000000000000000000000000000000000d2"),
            wrapped_native: WRAPPED,
        }
    }

    fn host() -> MemoryHost {
        MemoryHost::new(1_000, WRAPPED)
    }

    #[test]
    fn sweep_enforces_minimum_then_moves_everything() {
        let ctx = ctx();
        let dai = address!("00000000000000000000000000000000000000d0");
        let recipient = address!("00000000000000000000000000000000000000aa");
        let mut env = host();
        env.fund(Asset::Token(dai), ctx.router, U256::from(3u64));

        let err = dispatch(
            &mut env,
            &ctx,
            Command::Sweep {
                asset: Asset::Token(dai),
                recipient: Recipient::Address(recipient),
                min_amount: U256::from(5u64),
            },
        )
        .unwrap_err();
        assert!(matches!(err, HandlerError::InsufficientBalance { .. }));
        assert_eq!(env.balance_of(Asset::Token(dai), ctx.router), U256::from(3u64));

        env.fund(Asset::Token(dai), ctx.router, U256::from(2u64));
        dispatch(
            &mut env,
            &ctx,
            Command::Sweep {
                asset: Asset::Token(dai),
                recipient: Recipient::Address(recipient),
                min_amount: U256::from(5u64),
            },
        )
        .unwrap();
        assert_eq!(env.balance_of(Asset::Token(dai), ctx.router), U256::ZERO);
        assert_eq!(env.balance_of(Asset::Token(dai), recipient), U256::from(5u64));
    }

    #[test]
    fn pay_portion_computes_bips_of_balance() {
        let ctx = ctx();
        let dai = address!("00000000000000000000000000000000000000d0");
        let fee_taker = address!("00000000000000000000000000000000000000ab");
        let mut env = host();
        env.fund(Asset::Token(dai), ctx.router, U256::from(1_000u64));

        dispatch(
            &mut env,
            &ctx,
            Command::PayPortion {
                asset: Asset::Token(dai),
                recipient: Recipient::Address(fee_taker),
                bips: 100,
            },
        )
        .unwrap();
        assert_eq!(env.balance_of(Asset::Token(dai), fee_taker), U256::from(10u64));
        assert_eq!(env.balance_of(Asset::Token(dai), ctx.router), U256::from(990u64));
    }

    #[test]
    fn pay_portion_stays_exact_at_maximum_balance() {
        let ctx = ctx();
        let dai = address!("00000000000000000000000000000000000000d0");
        let fee_taker = address!("00000000000000000000000000000000000000ab");
        let mut env = host();
        env.fund(Asset::Token(dai), ctx.router, U256::MAX);

        // 100 bips of U256::MAX would wrap a naive 256-bit product; the
        // portion must still come out as exactly a hundredth.
        dispatch(
            &mut env,
            &ctx,
            Command::PayPortion {
                asset: Asset::Token(dai),
                recipient: Recipient::Address(fee_taker),
                bips: 100,
            },
        )
        .unwrap();
        let expected = U256::MAX / U256::from(100u64);
        assert_eq!(env.balance_of(Asset::Token(dai), fee_taker), expected);
        assert_eq!(
            env.balance_of(Asset::Token(dai), ctx.router),
            U256::MAX - expected
        );
    }

    #[test]
    fn unwrap_fee_cut_stays_exact_at_maximum_amount() {
        let ctx = ctx();
        let recipient = address!("00000000000000000000000000000000000000aa");
        let fee_taker = address!("00000000000000000000000000000000000000ab");
        let mut env = host();
        env.fund(Asset::Token(WRAPPED), ctx.router, U256::MAX);

        dispatch(
            &mut env,
            &ctx,
            Command::UnwrapNativeWithFee {
                recipient: Recipient::Address(recipient),
                amount: U256::MAX,
                fee_recipient: Recipient::Address(fee_taker),
                fee_bips: 100,
            },
        )
        .unwrap();
        let cut = U256::MAX / U256::from(100u64);
        assert_eq!(env.balance_of(Asset::Native, fee_taker), cut);
        assert_eq!(env.balance_of(Asset::Native, recipient), U256::MAX - cut);
    }

    #[test]
    fn pay_portion_rejects_out_of_range_bips() {
        let ctx = ctx();
        let mut env = host();
        let err = dispatch(
            &mut env,
            &ctx,
            Command::PayPortion {
                asset: Asset::Native,
                recipient: Recipient::Caller,
                bips: 10_001,
            },
        )
        .unwrap_err();
        assert_eq!(err, HandlerError::InvalidBips(10_001));
    }

    #[test]
    fn contract_balance_sentinel_wraps_everything() {
        let ctx = ctx();
        let mut env = host();
        env.fund(Asset::Native, ctx.router, U256::from(42u64));

        dispatch(
            &mut env,
            &ctx,
            Command::WrapNative {
                recipient: Recipient::Router,
                amount: CONTRACT_BALANCE,
            },
        )
        .unwrap();
        assert_eq!(env.balance_of(Asset::Native, ctx.router), U256::ZERO);
        assert_eq!(
            env.balance_of(Asset::Token(WRAPPED), ctx.router),
            U256::from(42u64)
        );
    }

    #[test]
    fn unwrap_with_fee_splits_by_bips() {
        let ctx = ctx();
        let recipient = address!("00000000000000000000000000000000000000aa");
        let fee_taker = address!("00000000000000000000000000000000000000ab");
        let mut env = host();
        env.fund(Asset::Token(WRAPPED), ctx.router, U256::from(1_000u64));

        dispatch(
            &mut env,
            &ctx,
            Command::UnwrapNativeWithFee {
                recipient: Recipient::Address(recipient),
                amount: U256::from(1_000u64),
                fee_recipient: Recipient::Address(fee_taker),
                fee_bips: 250,
            },
        )
        .unwrap();
        assert_eq!(env.balance_of(Asset::Native, fee_taker), U256::from(25u64));
        assert_eq!(env.balance_of(Asset::Native, recipient), U256::from(975u64));
        assert_eq!(env.balance_of(Asset::Token(WRAPPED), ctx.router), U256::ZERO);
    }

    #[test]
    fn exact_in_swap_walks_path_and_enforces_minimum() {
        let ctx = ctx();
        let dai = address!("00000000000000000000000000000000000000d0");
        let usdc = address!("00000000000000000000000000000000000000d1");
        let weth = address!("00000000000000000000000000000000000000d3");
        let pool_a = address!("00000000000000000000000000000000000000f0");
        let pool_b = address!("00000000000000000000000000000000000000f1");

        let mut env = host();
        env.add_pool(SwapProtocol::V2, dai, usdc, pool_a);
        env.add_pool(SwapProtocol::V2, usdc, weth, pool_b);
        env.fund(Asset::Token(dai), ctx.router, U256::from(100u64));
        env.fund(Asset::Token(usdc), pool_a, U256::from(1_000u64));
        env.fund(Asset::Token(weth), pool_b, U256::from(1_000u64));

        dispatch(
            &mut env,
            &ctx,
            Command::SwapExactIn {
                protocol: SwapProtocol::V2,
                amount_in: U256::from(100u64),
                min_amount_out: U256::from(100u64),
                path: vec![dai, usdc, weth],
                recipient: Recipient::Caller,
            },
        )
        .unwrap();
        assert_eq!(env.balance_of(Asset::Token(weth), ctx.caller), U256::from(100u64));
        assert_eq!(env.balance_of(Asset::Token(dai), ctx.router), U256::ZERO);

        // A minimum above the 1:1 output trips the slippage guard.
        env.fund(Asset::Token(dai), ctx.router, U256::from(10u64));
        let err = dispatch(
            &mut env,
            &ctx,
            Command::SwapExactIn {
                protocol: SwapProtocol::V2,
                amount_in: U256::from(10u64),
                min_amount_out: U256::from(11u64),
                path: vec![dai, usdc, weth],
                recipient: Recipient::Caller,
            },
        )
        .unwrap_err();
        assert!(matches!(err, HandlerError::TooLittleReceived { .. }));
    }

    #[test]
    fn exact_out_swap_bounds_the_input() {
        let ctx = ctx();
        let dai = address!("00000000000000000000000000000000000000d0");
        let usdc = address!("00000000000000000000000000000000000000d1");
        let pool = address!("00000000000000000000000000000000000000f0");

        let mut env = host();
        env.add_pool(SwapProtocol::V3, dai, usdc, pool);
        env.fund(Asset::Token(dai), ctx.router, U256::from(100u64));
        env.fund(Asset::Token(usdc), pool, U256::from(1_000u64));

        let err = dispatch(
            &mut env,
            &ctx,
            Command::SwapExactOut {
                protocol: SwapProtocol::V3,
                amount_out: U256::from(50u64),
                max_amount_in: U256::from(49u64),
                path: vec![dai, usdc],
                recipient: Recipient::Caller,
            },
        )
        .unwrap_err();
        assert!(matches!(err, HandlerError::ExcessiveInputAmount { .. }));
        // Bound check happens before any hop runs.
        assert_eq!(env.balance_of(Asset::Token(dai), ctx.router), U256::from(100u64));

        dispatch(
            &mut env,
            &ctx,
            Command::SwapExactOut {
                protocol: SwapProtocol::V3,
                amount_out: U256::from(50u64),
                max_amount_in: U256::from(50u64),
                path: vec![dai, usdc],
                recipient: Recipient::Caller,
            },
        )
        .unwrap();
        assert_eq!(env.balance_of(Asset::Token(usdc), ctx.caller), U256::from(50u64));
    }

    #[test]
    fn missing_pool_is_an_external_failure() {
        let ctx = ctx();
        let dai = address!("00000000000000000000000000000000000000d0");
        let usdc = address!("00000000000000000000000000000000000000d1");
        let mut env = host();
        env.fund(Asset::Token(dai), ctx.router, U256::from(10u64));

        let err = dispatch(
            &mut env,
            &ctx,
            Command::SwapExactIn {
                protocol: SwapProtocol::V2,
                amount_in: U256::from(10u64),
                min_amount_out: U256::ZERO,
                path: vec![dai, usdc],
                recipient: Recipient::Caller,
            },
        )
        .unwrap_err();
        assert!(matches!(
            err,
            HandlerError::ExternalProtocol(crate::errors::HostError::UnknownPool { .. })
        ));
    }
}
