use crate::cli::context::Context;
use crate::cli::parser::{Commands, TriggerAction};
use crate::core::store::SessionStore;
use crate::core::triggers::{Alert, Audience, TaskTrigger, TextField};
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::colors::{colorize_check, colorize_optional};
use crate::utils::table::Table;
use crate::utils::time::fmt_local;

pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Trigger { action } = cmd {
        let engine = ctx.cfg.trigger_engine()?;

        match action {
            TriggerAction::List => {
                if engine.triggers().is_empty() {
                    println!("No triggers configured.");
                    return Ok(());
                }

                let mut table = Table::new(&[
                    "Name", "On", "Enabled", "Days", "Window", "For", "Cap", "Delay", "Alert",
                    "Field",
                ]);
                for t in engine.triggers() {
                    table.add_row(row(t));
                }
                print!("{}", table.render());
            }

            TriggerAction::Fire { name, employee } => {
                let employee = ctx.employee(employee)?;
                let mut store = ctx.open_store()?;
                let session = store.find_open(&employee)?.map(|s| s.id);

                match engine.fire_manual(&mut store, name, &employee, session, ctx.now)? {
                    Some(task) => {
                        ttlog(
                            &store.pool.conn,
                            "trigger",
                            &task.trigger,
                            &format!(
                                "manual '{}' for {} due {}",
                                task.title,
                                task.employee_id,
                                task.due_at.to_rfc3339()
                            ),
                        )?;
                        success(format!(
                            "⏰ Task '{}' scheduled for {} at {}.",
                            task.title,
                            employee,
                            fmt_local(task.due_at, ctx.offset)
                        ));
                    }
                    None => warning(format!(
                        "Trigger '{}' did not fire for {} (filtered out or daily cap reached).",
                        name, employee
                    )),
                }
            }
        }
    }

    Ok(())
}

fn row(t: &TaskTrigger) -> Vec<String> {
    let dash = || colorize_optional("--");
    vec![
        t.name.clone(),
        t.on_event.to_db_str().to_string(),
        colorize_check(t.enabled, if t.enabled { "yes" } else { "no" }),
        t.days.map(|d| d.to_string()).unwrap_or_else(dash),
        t.window.map(|w| w.to_string()).unwrap_or_else(dash),
        match &t.audience {
            Audience::Everyone => "everyone".to_string(),
            Audience::Only(list) => list
                .iter()
                .map(|e| e.as_str())
                .collect::<Vec<_>>()
                .join(","),
        },
        t.max_firings_per_day
            .map(|c| c.to_string())
            .unwrap_or_else(dash),
        format!("{}m", t.delay.num_minutes()),
        match t.alert {
            Alert::Silent => "silent".to_string(),
            Alert::Visible { sound: true } => "alert+sound".to_string(),
            Alert::Visible { sound: false } => "alert".to_string(),
        },
        match &t.text_field {
            TextField::Hidden => dash(),
            TextField::Optional(l) => l.clone(),
            TextField::Required(l) => format!("{} *", l),
        },
    ]
}
