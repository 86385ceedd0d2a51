use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::core::store::{TaskFilter, TriggerLedger};
use crate::errors::AppResult;
use crate::models::session::EmployeeId;
use crate::utils::colors::{colorize_check, colorize_optional};
use crate::utils::table::Table;
use crate::utils::time::fmt_local;

pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Tasks { employee, due } = cmd {
        let filter = TaskFilter {
            employee: employee.as_deref().map(EmployeeId::new).transpose()?,
            due_by: due.then_some(ctx.now),
        };

        let store = ctx.open_store()?;
        let tasks = store.tasks(&filter)?;

        if tasks.is_empty() {
            println!("No scheduled tasks.");
            return Ok(());
        }

        let mut table = Table::new(&[
            "#", "Due", "Employee", "Session", "Title", "Trigger", "On", "Field",
        ]);
        for t in &tasks {
            let is_due = t.due_at <= ctx.now;
            table.add_row(vec![
                t.id.to_string(),
                colorize_check(!is_due, &fmt_local(t.due_at, ctx.offset)),
                t.employee_id.to_string(),
                t.session_id
                    .map(|s| format!("#{}", s))
                    .unwrap_or_else(|| colorize_optional("--")),
                t.title.clone(),
                t.trigger.clone(),
                t.event.to_db_str().to_string(),
                match &t.text_field {
                    Some(l) if t.text_required => format!("{} *", l),
                    Some(l) => l.clone(),
                    None => colorize_optional("--"),
                },
            ]);
        }
        print!("{}", table.render());
    }

    Ok(())
}
