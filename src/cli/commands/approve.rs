use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::core::timeclock::TimeClockLogic;
use crate::db::log::ttlog;
use crate::errors::AppResult;
use crate::models::session::SessionId;
use crate::ui::messages::success;

/// Handle the `approve` command (supervisor sign-off of a closed session).
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Approve { session, revoke } = cmd {
        let id = SessionId(*session);
        let mut store = ctx.open_store()?;
        let updated = TimeClockLogic::new(&mut store).approve(id, !*revoke)?;

        let operation = if *revoke { "revoke" } else { "approve" };
        ttlog(
            &store.pool.conn,
            operation,
            &format!("#{}", id),
            &format!("{} session of {}", operation, updated.employee_id),
        )?;

        if *revoke {
            success(format!("Approval revoked for session #{}.", id));
        } else {
            success(format!("Session #{} approved.", id));
        }
    }

    Ok(())
}
