use anchor_lang::prelude::*;

pub mod constants;
pub mod error;
pub mod instructions;
pub mod state;
pub mod utils;

#[cfg(test)]
mod tests;

use instructions::*;

declare_id!("7ZP1Ysq2EWvGQapeYDkQbFEAR3RLWCBgzev1bH2iELzW");

#[program]
pub mod stream_vesting {
    use super::*;

    /// Create the campaign factory and its custody for `asset_mint`
    pub fn initialize_factory(
        ctx: Context<InitializeFactory>,
        campaign: Pubkey,
        treasury: Pubkey,
        metadata_base: String,
    ) -> Result<()> {
        instructions::initialize_factory::handler(ctx, campaign, treasury, metadata_base)
    }

    /// Create a schedule (administrator only)
    pub fn create_schedule(
        ctx: Context<CreateSchedule>,
        recipient: Pubkey,
        rate_per_second: u64,
        start_time: i64,
        end_time: i64,
    ) -> Result<()> {
        instructions::create_schedule::handler(ctx, recipient, rate_per_second, start_time, end_time)
    }

    /// Fund factory custody
    pub fn deposit_to_factory(ctx: Context<DepositToFactory>, amount: u64) -> Result<()> {
        instructions::deposit_to_factory::handler(ctx, amount)
    }

    /// Recipient claim: fund a controller, mint the ownership token, open the flow
    pub fn execute_schedule(ctx: Context<ExecuteSchedule>) -> Result<()> {
        instructions::execute_schedule::handler(ctx)
    }

    /// Administrative override: mint the ownership token without funding
    pub fn direct_execute_schedule(ctx: Context<DirectExecuteSchedule>) -> Result<()> {
        instructions::direct_execute_schedule::handler(ctx)
    }

    /// Transfer the ownership token; the live flow follows it
    pub fn transfer_rights(ctx: Context<TransferRights>) -> Result<()> {
        instructions::transfer_rights::handler(ctx)
    }

    /// Burn the ownership token; stops the flow and retires the schedule
    pub fn burn_rights(ctx: Context<BurnRights>) -> Result<()> {
        instructions::burn_rights::handler(ctx)
    }

    /// Close the flow and sweep custody to treasury (administrator only)
    pub fn stop_stream(ctx: Context<StopStream>) -> Result<()> {
        instructions::stop_stream::handler(ctx)
    }

    /// Pay the current holder its accrued flow
    pub fn settle_stream(ctx: Context<SettleStream>) -> Result<()> {
        instructions::settle_stream::handler(ctx)
    }

    pub fn set_treasury(ctx: Context<SetTreasury>, new_treasury: Pubkey) -> Result<()> {
        instructions::set_treasury::handler(ctx, new_treasury)
    }

    pub fn set_administrator(ctx: Context<SetAdministrator>, new_admin: Pubkey) -> Result<()> {
        instructions::set_administrator::handler(ctx, new_admin)
    }

    pub fn set_asset_mint(ctx: Context<SetAssetMint>) -> Result<()> {
        instructions::set_asset_mint::handler(ctx)
    }

    pub fn set_metadata_base(ctx: Context<SetMetadataBase>, metadata_base: String) -> Result<()> {
        instructions::set_metadata_base::handler(ctx, metadata_base)
    }

    /// Emit a read-only snapshot of a schedule and its stream
    pub fn emit_schedule_quote(ctx: Context<EmitScheduleQuote>) -> Result<()> {
        instructions::emit_schedule_quote::handler(ctx)
    }
}
