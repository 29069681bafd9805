use solana_program::{entrypoint::ProgramResult, msg, pubkey::Pubkey};

use crate::{
    engine::CollateralEngine,
    instructions::EngineInstruction,
    token::{CollateralToken, IssuanceToken},
};

/// Decode `instruction_data` and run it against `engine` as `caller`
pub fn process_instruction<C: CollateralToken, I: IssuanceToken>(
    engine: &CollateralEngine<C, I>,
    caller: &Pubkey,
    instruction_data: &[u8],
) -> ProgramResult {
    let instruction = EngineInstruction::unpack(instruction_data)?;

    match instruction {
        EngineInstruction::DepositCollateralAndMint {
            asset,
            collateral_amount,
            debt_amount,
        } => {
            msg!("Instruction: DepositCollateralAndMint");
            process_deposit_collateral_and_mint(engine, caller, &asset, collateral_amount, debt_amount)
        }

        EngineInstruction::DepositCollateral { asset, amount } => {
            msg!("Instruction: DepositCollateral");
            process_deposit_collateral(engine, caller, &asset, amount)
        }

        EngineInstruction::RedeemCollateralForDebt {
            asset,
            collateral_amount,
            debt_amount,
        } => {
            msg!("Instruction: RedeemCollateralForDebt");
            process_redeem_collateral_for_debt(engine, caller, &asset, collateral_amount, debt_amount)
        }

        EngineInstruction::RedeemCollateral { asset, amount } => {
            msg!("Instruction: RedeemCollateral");
            process_redeem_collateral(engine, caller, &asset, amount)
        }

        EngineInstruction::MintDebt { amount } => {
            msg!("Instruction: MintDebt");
            process_mint_debt(engine, caller, amount)
        }

        EngineInstruction::BurnDebt { amount } => {
            msg!("Instruction: BurnDebt");
            process_burn_debt(engine, caller, amount)
        }

        EngineInstruction::Liquidate {
            asset,
            victim,
            debt_to_cover,
        } => {
            msg!("Instruction: Liquidate");
            process_liquidate(engine, caller, &asset, &victim, debt_to_cover)
        }
    }
}

fn process_deposit_collateral_and_mint<C: CollateralToken, I: IssuanceToken>(
    engine: &CollateralEngine<C, I>,
    caller: &Pubkey,
    asset: &Pubkey,
    collateral_amount: u128,
    debt_amount: u128,
) -> ProgramResult {
    engine.deposit_collateral_and_mint(caller, asset, collateral_amount, debt_amount)?;

    msg!("Deposited {} and minted {}", collateral_amount, debt_amount);
    Ok(())
}

fn process_deposit_collateral<C: CollateralToken, I: IssuanceToken>(
    engine: &CollateralEngine<C, I>,
    caller: &Pubkey,
    asset: &Pubkey,
    amount: u128,
) -> ProgramResult {
    engine.deposit_collateral(caller, asset, amount)?;
    Ok(())
}

fn process_redeem_collateral_for_debt<C: CollateralToken, I: IssuanceToken>(
    engine: &CollateralEngine<C, I>,
    caller: &Pubkey,
    asset: &Pubkey,
    collateral_amount: u128,
    debt_amount: u128,
) -> ProgramResult {
    engine.redeem_collateral_for_debt(caller, asset, collateral_amount, debt_amount)?;

    msg!("Remaining debt {}", engine.debt_of(caller));
    Ok(())
}

fn process_redeem_collateral<C: CollateralToken, I: IssuanceToken>(
    engine: &CollateralEngine<C, I>,
    caller: &Pubkey,
    asset: &Pubkey,
    amount: u128,
) -> ProgramResult {
    engine.redeem_collateral(caller, asset, amount)?;
    Ok(())
}

fn process_mint_debt<C: CollateralToken, I: IssuanceToken>(
    engine: &CollateralEngine<C, I>,
    caller: &Pubkey,
    amount: u128,
) -> ProgramResult {
    engine.mint_debt(caller, amount)?;

    if let Ok(health_factor) = engine.health_factor(caller) {
        msg!("Health factor after mint: {}", health_factor);
    }
    Ok(())
}

fn process_burn_debt<C: CollateralToken, I: IssuanceToken>(
    engine: &CollateralEngine<C, I>,
    caller: &Pubkey,
    amount: u128,
) -> ProgramResult {
    engine.burn_debt(caller, amount)?;
    Ok(())
}

fn process_liquidate<C: CollateralToken, I: IssuanceToken>(
    engine: &CollateralEngine<C, I>,
    caller: &Pubkey,
    asset: &Pubkey,
    victim: &Pubkey,
    debt_to_cover: u128,
) -> ProgramResult {
    let outcome = engine.liquidate(caller, asset, victim, debt_to_cover)?;

    msg!(
        "Liquidation complete: seized {} for {} of debt",
        outcome.collateral_seized,
        outcome.debt_covered
    );
    Ok(())
}
