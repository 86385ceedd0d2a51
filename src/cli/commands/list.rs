use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::core::calculator::summary::{summarize, total_worked_minutes};
use crate::core::store::{SessionFilter, SessionStore};
use crate::errors::AppResult;
use crate::models::session::EmployeeId;
use crate::utils::colors::{colorize_approval, colorize_optional, colorize_status};
use crate::utils::date::{day_bounds_utc, parse_period};
use crate::utils::formatting::{bold, mins2readable};
use crate::utils::table::Table;
use crate::utils::time::{fmt_local, fmt_local_time};

pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::List {
        employee,
        period,
        open,
        details,
    } = cmd
    {
        let mut filter = SessionFilter {
            employee: employee.as_deref().map(EmployeeId::new).transpose()?,
            open_only: *open,
            ..Default::default()
        };

        if let Some(p) = period.as_deref().filter(|p| !p.eq_ignore_ascii_case("all")) {
            let (first, last) = parse_period(p)?;
            let (from, to) = day_bounds_utc(first, last, ctx.offset)?;
            filter.from = Some(from);
            filter.to = Some(to);
        }

        let store = ctx.open_store()?;
        let sessions = store.list(&filter)?;

        if sessions.is_empty() {
            println!("No sessions found.");
            return Ok(());
        }

        let mut table = Table::new(&[
            "#", "Employee", "Clock in", "Clock out", "Status", "Breaks", "Worked", "Approved",
        ]);

        let mut summaries = Vec::with_capacity(sessions.len());
        for s in &sessions {
            let sum = summarize(s, ctx.now);
            table.add_row(vec![
                s.id.to_string(),
                s.employee_id.to_string(),
                fmt_local(s.clock_in_at, ctx.offset),
                colorize_optional(
                    &s.clock_out_at
                        .map(|t| fmt_local(t, ctx.offset))
                        .unwrap_or_else(|| "--".into()),
                ),
                colorize_status(sum.status),
                format!(
                    "{} ({})",
                    mins2readable(sum.break_minutes, false, true),
                    sum.break_count
                ),
                mins2readable(sum.worked_minutes, false, true),
                colorize_approval(sum.supervisor_approved),
            ]);
            summaries.push(sum);
        }

        print!("{}", table.render());
        println!(
            "{} {}",
            bold("Total worked:"),
            mins2readable(total_worked_minutes(&summaries), false, false)
        );

        if *details {
            for s in &sessions {
                if s.breaks.is_empty() && s.notes.is_none() {
                    continue;
                }
                println!("\n#{} {}", s.id, s.employee_id);
                for (i, b) in s.breaks.iter().enumerate() {
                    let end = b
                        .end_at
                        .map(|e| fmt_local_time(e, ctx.offset))
                        .unwrap_or_else(|| "--:--".into());
                    println!(
                        "   break {}: {} → {}",
                        i + 1,
                        fmt_local_time(b.start_at, ctx.offset),
                        colorize_optional(&end)
                    );
                }
                if let Some(n) = &s.notes {
                    println!("   notes: {}", n);
                }
            }
        }
    }

    Ok(())
}
