use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::core::calculator::summary::summarize;
use crate::core::timeclock::TimeClockLogic;
use crate::errors::AppResult;
use crate::utils::colors::{colorize_optional, colorize_status};
use crate::utils::formatting::mins2readable;
use crate::utils::time::fmt_local;

pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Status { employee } = cmd {
        let employee = ctx.employee(employee)?;
        let mut store = ctx.open_store()?;
        let session = TimeClockLogic::new(&mut store).open_session(&employee)?;
        let summary = summarize(&session, ctx.now);

        println!("👷 {} | session #{}", employee, session.id);
        println!("   Status    : {}", colorize_status(summary.status));
        println!("   Clock in  : {}", fmt_local(session.clock_in_at, ctx.offset));
        println!(
            "   Location  : {}",
            colorize_optional(
                &session
                    .clock_in_location
                    .map(|l| l.to_string())
                    .unwrap_or_else(|| "--".into())
            )
        );
        println!("   Elapsed   : {}", mins2readable(summary.elapsed_minutes, false, false));
        println!(
            "   Breaks    : {} ({})",
            mins2readable(summary.break_minutes, false, false),
            summary.break_count
        );
        println!("   Worked    : {}", mins2readable(summary.worked_minutes, false, false));

        if let Some(open) = session.open_break() {
            println!("   On break since {}", fmt_local(open.start_at, ctx.offset));
        }
    }

    Ok(())
}
