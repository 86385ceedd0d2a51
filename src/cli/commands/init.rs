use crate::cli::context::Context;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log::ttlog_soft;
use crate::db::store::SqliteStore;
use crate::errors::AppResult;
use crate::ui::messages::success;

/// Handle the `init` command
///
/// This initializes:
///  - the config directory (if missing)
///  - the configuration file (skipped with `--test`)
///  - the SQLite database and all pending migrations
pub fn handle(cli: &Cli, ctx: &Context) -> AppResult<()> {
    let db_path = Config::init_all(&ctx.config_path, cli.db.as_deref(), cli.test)?;
    let db_str = db_path.to_string_lossy().to_string();

    println!("⚙️  Initializing fieldclock…");
    if !cli.test {
        println!("📄 Config file : {}", ctx.config_path.display());
    }
    println!("🗄️  Database   : {}", db_str);

    let store = SqliteStore::open(&db_str)?;

    ttlog_soft(
        &store.pool.conn,
        "init",
        "database",
        &format!("Database initialized at {}", db_str),
    );

    success(format!("Database initialized at {}", db_str));
    Ok(())
}
