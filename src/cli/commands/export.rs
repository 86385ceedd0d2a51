use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::export::ExportLogic;

pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        range,
        force,
    } = cmd
    {
        let store = ctx.open_store()?;
        ExportLogic::export(&store, ctx.offset, *format, file, range, *force, ctx.now)?;
    }
    Ok(())
}
