//! Distinct-date pagination over slots.
//!
//! Pass one picks the window of calendar dates, pass two loads every slot on
//! those dates. Paging over dates keeps a page to whole days no matter how
//! many slots a day holds.

use crate::db::queries::{ENTRY_COLUMNS, get_date, map_entry};
use crate::db::session::{Access, Session};
use crate::errors::AppResult;
use crate::models::{Direction, Tag};
use crate::msg::{FetchResponse, RaySlotFetchRequest, RaySlotFetchResponse, SlotRow};
use crate::utils::date::format_date;
use crate::utils::time::format_ts;
use crate::worker::Operation;
use chrono::NaiveDate;
use rusqlite::{Connection, params_from_iter};

pub struct RaySlotReader {
    request: RaySlotFetchRequest,
}

impl RaySlotReader {
    pub fn new(request: RaySlotFetchRequest) -> Self {
        Self { request }
    }

    pub fn request(&self) -> &RaySlotFetchRequest {
        &self.request
    }
}

impl Operation for RaySlotReader {
    type Output = FetchResponse;
    const NAME: &'static str = "ray_slot_reader";
    const ACCESS: Access = Access::ReadOnly;

    fn work(&mut self, session: &mut Session) -> AppResult<FetchResponse> {
        let response = fetch_ray_slots(&mut session.conn, &self.request)?;
        log::debug!(
            "{}: {} rows over {} dates",
            Self::NAME,
            response.rows.len(),
            response.dates.len()
        );
        Ok(FetchResponse::RaySlots(response))
    }
}

/// Both passes in one read transaction.
pub fn fetch_ray_slots(
    conn: &mut Connection,
    request: &RaySlotFetchRequest,
) -> AppResult<RaySlotFetchResponse> {
    if request.width() == 0 {
        return Ok(RaySlotFetchResponse::empty(request.clone()));
    }

    let tx = conn.transaction()?;
    let dates = fetch_date_window(&tx, request)?;
    let rows = fetch_slots_on(&tx, &dates, request.dates_dir, request.times_dir)?;
    tx.commit()?;

    Ok(RaySlotFetchResponse {
        rows,
        dates,
        request: request.clone(),
    })
}

/// Pass one: distinct start dates on the `direction` side of `dt_offset`,
/// sorted by `dates_dir`, windowed to `[slice_fst, slice_lst)`.
pub fn fetch_date_window(
    conn: &Connection,
    request: &RaySlotFetchRequest,
) -> AppResult<Vec<NaiveDate>> {
    let width = request.width();
    if width == 0 {
        return Ok(Vec::new());
    }

    let sql = format!(
        "SELECT DISTINCT DATE(fst) AS fst_date
         FROM slot
         WHERE DATE(fst) {} DATE(?1)
         ORDER BY fst_date {}
         LIMIT ?2 OFFSET ?3",
        request.direction.sql_comparator(),
        request.dates_dir.sql_order(),
    );

    let limit = i64::try_from(width).unwrap_or(i64::MAX);
    let offset = i64::try_from(request.slice_fst).unwrap_or(i64::MAX);

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(
        rusqlite::params![format_ts(&request.dt_offset), limit, offset],
        |row| get_date(row, 0),
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Pass two: every slot starting on one of `dates`, with its task and the
/// task's primary tag.
pub fn fetch_slots_on(
    conn: &Connection,
    dates: &[NaiveDate],
    dates_dir: Direction,
    times_dir: Direction,
) -> AppResult<Vec<SlotRow>> {
    if dates.is_empty() {
        return Ok(Vec::new());
    }

    let placeholders = std::iter::repeat_n("?", dates.len())
        .collect::<Vec<_>>()
        .join(",");

    let sql = format!(
        "SELECT {ENTRY_COLUMNS}, g.id, g.name
         FROM slot s
         JOIN task t ON t.id = s.task_id
         LEFT JOIN tag g ON g.id = (
             SELECT MIN(tt.tag_id) FROM tag_task tt WHERE tt.task_id = t.id
         )
         WHERE DATE(s.fst) IN ({placeholders})
         ORDER BY DATE(s.fst) {dates}, TIME(s.fst) {times}, s.id {times}",
        dates = dates_dir.sql_order(),
        times = times_dir.sql_order(),
    );

    let mut stmt = conn.prepare(&sql)?;
    let params = dates.iter().map(format_date);
    let rows = stmt.query_map(params_from_iter(params), |row| {
        let entry = map_entry(row)?;
        let tag_id: Option<i64> = row.get(5)?;
        let tag_name: Option<String> = row.get(6)?;
        Ok(SlotRow {
            slot: entry.slot,
            task: entry.task,
            tag: tag_id.zip(tag_name).map(|(id, name)| Tag::new(id, name)),
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::queries::{attach_tags, insert_closed_slot, insert_task};
    use crate::utils::date::start_of;
    use crate::utils::time::parse_ts;
    use chrono::NaiveDateTime;

    fn ts(s: &str) -> NaiveDateTime {
        parse_ts(s).unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    /// Two slots per day on the 1st, 2nd, 3rd and 5th.
    fn seeded() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_db(&conn).unwrap();
        let task = insert_task(&conn, "Read").unwrap();
        for d in [1, 2, 3, 5] {
            for (a, b) in [("14:00:00", "15:00:00"), ("08:00:00", "09:00:00")] {
                insert_closed_slot(
                    &conn,
                    task,
                    &ts(&format!("2025-03-0{} {}", d, a)),
                    &ts(&format!("2025-03-0{} {}", d, b)),
                )
                .unwrap();
            }
        }
        conn
    }

    fn request(offset_day: u32, direction: Direction) -> RaySlotFetchRequest {
        RaySlotFetchRequest::new(start_of(day(offset_day)), direction)
    }

    #[test]
    fn days_two_and_three_after_offset() {
        let mut conn = seeded();
        let req = request(2, Direction::PastToFuture).with_slice(0, 2);

        let resp = fetch_ray_slots(&mut conn, &req).unwrap();
        assert_eq!(resp.dates, vec![day(2), day(3)]);

        let starts: Vec<String> = resp.rows.iter().map(|r| format_ts(&r.slot.fst)).collect();
        assert_eq!(
            starts,
            vec![
                "2025-03-02 08:00:00",
                "2025-03-02 14:00:00",
                "2025-03-03 08:00:00",
                "2025-03-03 14:00:00",
            ]
        );
        assert_eq!(resp.request, req);
    }

    #[test]
    fn offset_date_is_inclusive_in_both_directions() {
        let mut conn = seeded();

        let req = request(3, Direction::FutureToPast)
            .with_dates_dir(Direction::FutureToPast)
            .with_slice(0, 10);
        let resp = fetch_ray_slots(&mut conn, &req).unwrap();
        assert_eq!(resp.dates, vec![day(3), day(2), day(1)]);

        let req = request(3, Direction::PastToFuture).with_slice(0, 10);
        let resp = fetch_ray_slots(&mut conn, &req).unwrap();
        assert_eq!(resp.dates, vec![day(3), day(5)]);
    }

    #[test]
    fn times_direction_is_independent_of_dates_direction() {
        let mut conn = seeded();
        let req = request(1, Direction::PastToFuture)
            .with_dates_dir(Direction::PastToFuture)
            .with_times_dir(Direction::FutureToPast)
            .with_slice(0, 1);

        let resp = fetch_ray_slots(&mut conn, &req).unwrap();
        let starts: Vec<String> = resp.rows.iter().map(|r| format_ts(&r.slot.fst)).collect();
        assert_eq!(starts, vec!["2025-03-01 14:00:00", "2025-03-01 08:00:00"]);
    }

    #[test]
    fn window_past_the_end_is_empty_not_an_error() {
        let mut conn = seeded();
        let req = request(1, Direction::PastToFuture).with_slice(10, 20);
        let resp = fetch_ray_slots(&mut conn, &req).unwrap();
        assert!(resp.is_empty());
        assert!(resp.dates.is_empty());

        let inverted = request(1, Direction::PastToFuture).with_slice(3, 1);
        assert!(fetch_ray_slots(&mut conn, &inverted).unwrap().is_empty());
    }

    #[test]
    fn rows_carry_the_primary_tag() {
        let mut conn = seeded();
        let tagged = insert_task(&conn, "Gym").unwrap();
        attach_tags(&conn, tagged, &["Health".into(), "Sport".into()]).unwrap();
        insert_closed_slot(
            &conn,
            tagged,
            &ts("2025-03-07 07:00:00"),
            &ts("2025-03-07 07:30:00"),
        )
        .unwrap();

        let req = request(7, Direction::PastToFuture).with_slice(0, 1);
        let resp = fetch_ray_slots(&mut conn, &req).unwrap();
        assert_eq!(resp.len(), 1);
        assert_eq!(resp.rows[0].tag.as_ref().map(|t| t.name.as_str()), Some("Health"));

        let req = request(1, Direction::PastToFuture).with_slice(0, 1);
        let resp = fetch_ray_slots(&mut conn, &req).unwrap();
        assert!(resp.rows.iter().all(|r| r.tag.is_none()));
    }
}
