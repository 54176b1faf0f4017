use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::run_pending_migrations;
use crate::db::session::{Access, Session};
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, RED, RESET};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        vacuum,
    } = cmd
    {
        if !(*migrate || *check || *vacuum) {
            return Ok(());
        }
        let session = Session::open(&cfg.database_path(), Access::ReadWrite)?;

        if *migrate {
            println!("{}▶ Running migrations…{}", CYAN, RESET);
            let applied = run_pending_migrations(&session.conn)?;
            println!(
                "{}✔ Migration completed ({} applied).{}\n",
                GREEN,
                applied.len(),
                RESET
            );
        }

        if *check {
            println!("{}▶ Running integrity check…{}", CYAN, RESET);
            let integrity: String =
                session
                    .conn
                    .query_row("PRAGMA integrity_check;", [], |row| row.get(0))?;
            let running: i64 = session.conn.query_row(
                "SELECT COUNT(*) FROM slot WHERE lst IS NULL",
                [],
                |row| row.get(0),
            )?;

            if integrity == "ok" && running <= 1 {
                println!("{}✔ Integrity check passed.{}\n", GREEN, RESET);
            } else if integrity != "ok" {
                println!("{}✘ Integrity check failed:{} {}\n", RED, RESET, integrity);
            } else {
                println!("{}✘ {} timers are running at once.{}\n", RED, running, RESET);
            }
        }

        if *vacuum {
            println!("{}▶ Running VACUUM…{}", CYAN, RESET);
            session.conn.execute_batch("VACUUM;")?;
            println!("{}✔ Vacuum completed.{}\n", GREEN, RESET);
        }

        session.close()?;
    }

    Ok(())
}
