use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::core::calculator::duration::{total_break_duration, worked_duration};
use crate::core::punch::{Punch, PunchLogic};
use crate::errors::AppResult;
use crate::ui::messages::{info, success};
use crate::utils::formatting::duration2readable;
use crate::utils::time::{fmt_local, fmt_local_time};

/// Handle `in`, `break`, `resume` and `out`.
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    let (employee_arg, punch) = match cmd {
        Commands::In { employee, location } => (
            employee,
            Punch::In {
                location: ctx.location(location),
            },
        ),
        Commands::Break { employee } => (employee, Punch::BreakStart),
        Commands::Resume { employee } => (employee, Punch::BreakEnd),
        Commands::Out {
            employee,
            notes,
            location,
        } => (
            employee,
            Punch::Out {
                notes: notes.clone(),
                location: ctx.location(location),
            },
        ),
        _ => return Ok(()),
    };

    let employee = ctx.employee(employee_arg)?;
    let engine = ctx.cfg.trigger_engine()?;
    let mut store = ctx.open_store()?;

    let outcome = PunchLogic::apply(&mut store, &engine, &employee, punch, ctx.now)?;
    let s = &outcome.session;
    let at = fmt_local_time(outcome.event.at, ctx.offset);

    match cmd {
        Commands::In { .. } => success(format!(
            "🟢 {} clocked in at {} (session #{}).",
            employee, at, s.id
        )),
        Commands::Break { .. } => success(format!("☕ {} started a break at {}.", employee, at)),
        Commands::Resume { .. } => {
            let last = s
                .breaks
                .last()
                .and_then(|b| b.end_at.map(|end| end - b.start_at))
                .unwrap_or_default();
            success(format!(
                "▶️  {} back to work at {} (break {}).",
                employee,
                at,
                duration2readable(last)
            ))
        }
        _ => success(format!(
            "🔴 {} clocked out at {}. Worked {} | breaks {}.",
            employee,
            at,
            duration2readable(worked_duration(s, ctx.now)),
            duration2readable(total_break_duration(s, ctx.now))
        )),
    }

    for t in &outcome.tasks {
        info(format!(
            "⏰ Task '{}' scheduled for {} (trigger {}).",
            t.title,
            fmt_local(t.due_at, ctx.offset),
            t.trigger
        ));
    }

    Ok(())
}
