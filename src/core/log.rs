use crate::db::log::load_log;
use crate::errors::AppResult;
use ansi_term::Colour;
use rusqlite::Connection;

const OP_WIDTH_MAX: usize = 40;

/// ANSI colour for an operation name.
fn color_for_operation(op: &str) -> Colour {
    match op {
        "start" => Colour::Green,
        "stop" => Colour::Yellow,
        "add" => Colour::Cyan,
        "migration_applied" => Colour::Purple,
        "init" => Colour::RGB(255, 153, 51),
        _ => Colour::White,
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

pub struct LogLogic;

impl LogLogic {
    pub fn print_log(conn: &Connection) -> AppResult<()> {
        let entries = load_log(conn)?;
        if entries.is_empty() {
            println!("Internal log is empty.");
            return Ok(());
        }

        let rows: Vec<(i64, String, String, String, String)> = entries
            .into_iter()
            .map(|(id, raw_date, op, target, message)| {
                let date = chrono::DateTime::parse_from_rfc3339(&raw_date)
                    .map(|dt| dt.format("%FT%T%:z").to_string())
                    .unwrap_or(raw_date);
                (id, date, op, target, message)
            })
            .collect();

        let id_w = rows.iter().map(|r| r.0.to_string().len()).max().unwrap_or(1);
        let date_w = rows.iter().map(|r| r.1.len()).max().unwrap_or(10);

        // width computed on plain text; colour is applied after padding
        let plain: Vec<String> = rows
            .iter()
            .map(|(_, _, op, target, _)| {
                if target.is_empty() {
                    truncate(op, OP_WIDTH_MAX)
                } else {
                    truncate(&format!("{op} ({target})"), OP_WIDTH_MAX)
                }
            })
            .collect();
        let op_w = plain.iter().map(|s| s.chars().count()).max().unwrap_or(10);

        println!("Internal log:\n");
        for ((id, date, op, _, message), op_target) in rows.iter().zip(plain) {
            let padding = " ".repeat(op_w.saturating_sub(op_target.chars().count()));
            let colored = match op_target.split_once(' ') {
                Some((head, rest)) => format!("{} {}", color_for_operation(op).paint(head), rest),
                None => color_for_operation(op).paint(op_target.as_str()).to_string(),
            };
            println!(
                "{:>id_w$}: {:<date_w$} | {}{} => {}",
                id,
                date,
                colored,
                padding,
                message,
                id_w = id_w,
                date_w = date_w
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_operation_names_are_cut() {
        assert_eq!(truncate("stop (12)", 40), "stop (12)");
        assert_eq!(truncate("abcdefghij", 6), "abc...");
    }
}
