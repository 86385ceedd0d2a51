use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::core::log::LogLogic;
use crate::errors::AppResult;

pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if matches!(cmd, Commands::Log { print: true }) {
        let mut store = ctx.open_store()?;
        LogLogic::print_log(&mut store.pool)?;
    }

    Ok(())
}
