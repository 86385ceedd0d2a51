use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::core::config::ConfigLogic;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `config` subcommand
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Config {
        print_config,
        check,
        edit_config,
        editor,
    } = cmd
    {
        if *print_config {
            ConfigLogic::print(&ctx.cfg)?;
        }

        if *check {
            let n = ConfigLogic::check(&ctx.cfg)?;
            success(format!(
                "Configuration OK: utc_offset {} and {} trigger(s) valid.",
                ctx.cfg.utc_offset, n
            ));
        }

        if *edit_config {
            ConfigLogic::edit(&ctx.config_path, editor)?;
        }
    }

    Ok(())
}
