use crate::cli::parser::Commands;
use super::start::display_name;
use crate::config::Config;
use crate::core::list::{ListLogic, ListPage};
use crate::errors::{AppError, AppResult};
use crate::models::Direction;
use crate::msg::RaySlotFetchRequest;
use crate::ui::messages::{header, info};
use crate::utils::date::{format_date, parse_date, start_of, today};
use crate::utils::formatting::{local_date, local_ts};
use crate::utils::table::{Column, Table};
use crate::utils::time::now_utc;
use chrono::NaiveDate;

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::List {
        offset,
        direction,
        dates_dir,
        times_dir,
        page,
        page_size,
        json,
    } = cmd
    {
        let direction = direction.unwrap_or(Direction::FutureToPast);
        let offset = match offset {
            Some(s) => parse_date(s).ok_or_else(|| AppError::InvalidDate(s.clone()))?,
            None => default_offset(direction),
        };
        let size = page_size.unwrap_or(cfg.page_size).max(1);

        let request = RaySlotFetchRequest::new(start_of(offset), direction)
            .with_dates_dir(dates_dir.unwrap_or(cfg.dates_dir))
            .with_times_dir(times_dir.unwrap_or(cfg.times_dir))
            .with_page(*page, size);

        let page_data = ListLogic::fetch(&cfg.database_path(), request)?;

        if *json {
            print_json(&page_data)?;
        } else {
            print_page(page_data, *page)?;
        }
    }
    Ok(())
}

/// Looking back starts today; looking forward starts at the beginning.
fn default_offset(direction: Direction) -> NaiveDate {
    match direction {
        Direction::FutureToPast => today(),
        Direction::PastToFuture => NaiveDate::from_ymd_opt(1, 1, 1).unwrap_or_default(),
    }
}

fn print_json(page: &ListPage) -> AppResult<()> {
    let value = serde_json::json!({
        "request": page.response.request,
        "dates": page.response.dates.iter().map(format_date).collect::<Vec<_>>(),
        "rows": page.response.rows,
        "timer": page.timer,
    });
    let out = serde_json::to_string_pretty(&value).map_err(|e| AppError::Other(e.to_string()))?;
    println!("{}", out);
    Ok(())
}

fn print_page(page: ListPage, page_no: usize) -> AppResult<()> {
    if page.response.is_empty() {
        info("No time slots in this window.");
        return Ok(());
    }

    let width = page.response.request.width();
    let more = page.response.dates.len() == width;
    let table = ListLogic::project(page.response)?;
    let now = now_utc();

    let mut current: Option<NaiveDate> = None;
    let mut section: Option<Table> = None;

    for (i, row) in table.rows().iter().enumerate() {
        let date = local_date(&row.slot.fst);
        if current != Some(date) {
            if let Some(t) = section.take() {
                println!("{}", t.render());
            }
            header(format!("📅 {}", date));
            current = Some(date);
            section = Some(new_section());
        }
        if let (Some(t), Some(cols)) = (section.as_mut(), table.display_row(i, now)) {
            t.add_row(cols.to_vec());
        }
    }
    if let Some(t) = section {
        println!("{}", t.render());
    }

    if let Some(timer) = &page.timer {
        info(format!(
            "Timer running on {} since {}",
            display_name(&timer.task.name),
            local_ts(&timer.slot.fst)
        ));
    }
    if more {
        info(format!("More dates may follow: --page {}", page_no + 1));
    }
    Ok(())
}

fn new_section() -> Table {
    Table::new(vec![
        Column::left("Task"),
        Column::left("Tag"),
        Column::left("Started"),
        Column::left("Stopped"),
        Column::right("Elapsed"),
    ])
}
