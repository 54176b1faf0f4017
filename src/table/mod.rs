//! Ordered in-memory projection of fetched and freshly stashed entries.
//!
//! Rows are kept ascending by a key extractor and new rows go in at the
//! leftmost insertion point, so a fetched page or a new timer can be merged
//! without reloading the whole table.

use crate::errors::{AppError, AppResult};
use crate::models::{Direction, Entry, Slot, Tag, Task};
use crate::msg::{RaySlotFetchResponse, SlotRow, StashResponse};
use crate::utils::formatting::{duration_to_str, local_ts};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// One (Tag, Task, Slot) triple. A task without tags has no tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub tag: Option<Tag>,
    pub task: Task,
    pub slot: Slot,
}

impl From<SlotRow> for TableRow {
    fn from(r: SlotRow) -> Self {
        Self {
            tag: r.tag,
            task: r.task,
            slot: r.slot,
        }
    }
}

impl From<Entry> for TableRow {
    fn from(e: Entry) -> Self {
        Self {
            tag: None,
            task: e.task,
            slot: e.slot,
        }
    }
}

impl From<StashResponse> for TableRow {
    fn from(r: StashResponse) -> Self {
        Self {
            tag: r.tags.into_iter().next(),
            task: r.entry.task,
            slot: r.entry.slot,
        }
    }
}

/// Smallest index at which `entry` can be inserted into the ascending `seq`
/// while staying ahead of every element with an equal key.
pub fn find_leftmost_index<T, K, F>(seq: &[T], entry: &T, key: F) -> usize
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    let target = key(entry);
    // hi is exclusive here; `hi = mid` is the `hi = mid - 1` step of the
    // inclusive formulation without going below zero.
    let mut lo = 0;
    let mut hi = seq.len();
    while lo < hi {
        let mid = lo + (hi - lo) / 2;
        if target <= key(&seq[mid]) {
            hi = mid;
        } else {
            lo = mid + 1;
        }
    }
    lo
}

type KeyFn<K> = Box<dyn Fn(&TableRow) -> K + Send>;

pub struct SortedEntryTable<K: PartialOrd = NaiveDateTime> {
    rows: Vec<TableRow>,
    key: KeyFn<K>,
}

impl SortedEntryTable<NaiveDateTime> {
    /// Ordered by slot start time.
    pub fn new() -> Self {
        Self::with_key(|row: &TableRow| row.slot.fst)
    }
}

impl Default for SortedEntryTable<NaiveDateTime> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort key reproducing a ray fetch's order: date by `dates_dir`, then time
/// of day and slot id by `times_dir`.
pub type RayKey = (i64, i64, i64);

/// Key extractor matching a ray fetch with the given directions.
pub fn ray_key(dates_dir: Direction, times_dir: Direction) -> impl Fn(&TableRow) -> RayKey + Send {
    fn signed(dir: Direction, v: i64) -> i64 {
        match dir {
            Direction::PastToFuture => v,
            Direction::FutureToPast => -v,
        }
    }

    move |row: &TableRow| {
        let epoch = NaiveDate::default();
        let days = (row.slot.fst.date() - epoch).num_days();
        let secs = (row.slot.fst.time() - NaiveTime::MIN).num_seconds();
        let id = row.slot.id.unwrap_or(i64::MAX);
        (
            signed(dates_dir, days),
            signed(times_dir, secs),
            signed(times_dir, id),
        )
    }
}

impl SortedEntryTable<RayKey> {
    /// Ordered the way a ray fetch with these directions returns rows.
    pub fn for_ray(dates_dir: Direction, times_dir: Direction) -> Self {
        Self::with_key(ray_key(dates_dir, times_dir))
    }
}

impl<K: PartialOrd> SortedEntryTable<K> {
    pub fn with_key<F>(key: F) -> Self
    where
        F: Fn(&TableRow) -> K + Send + 'static,
    {
        Self {
            rows: Vec::new(),
            key: Box::new(key),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[TableRow] {
        &self.rows
    }

    pub fn find_leftmost_index(&self, row: &TableRow) -> usize {
        find_leftmost_index(&self.rows, row, &self.key)
    }

    fn in_order(&self, a: usize, b: usize) -> bool {
        (self.key)(&self.rows[a]) <= (self.key)(&self.rows[b])
    }

    /// Insert at the leftmost index and check the row against its new
    /// neighbours. Returns the index the row landed at.
    pub fn insert(&mut self, row: TableRow) -> AppResult<usize> {
        let i = self.find_leftmost_index(&row);
        self.rows.insert(i, row);

        let before_ok = i == 0 || self.in_order(i - 1, i);
        let after_ok = i + 1 >= self.rows.len() || self.in_order(i, i + 1);
        if !(before_ok && after_ok) {
            let row = self.rows.remove(i);
            return Err(AppError::InvariantViolation(format!(
                "row for slot {:?} breaks table order at index {}",
                row.slot.id, i
            )));
        }
        Ok(i)
    }

    pub fn merge_ray_response(&mut self, response: RaySlotFetchResponse) -> AppResult<usize> {
        let n = response.rows.len();
        for row in response.rows {
            self.insert(row.into())?;
        }
        Ok(n)
    }

    pub fn merge_entry(&mut self, entry: Entry) -> AppResult<usize> {
        self.insert(entry.into())
    }

    pub fn position_of_slot(&self, slot_id: i64) -> Option<usize> {
        self.rows.iter().position(|r| r.slot.id == Some(slot_id))
    }

    /// Replace the row with the same slot id, or insert it if absent.
    pub fn upsert(&mut self, row: TableRow) -> AppResult<usize> {
        if let Some(id) = row.slot.id {
            if let Some(i) = self.position_of_slot(id) {
                self.rows.remove(i);
            }
        }
        self.insert(row)
    }

    pub fn is_sorted(&self) -> bool {
        (1..self.rows.len()).all(|i| self.in_order(i - 1, i))
    }

    /// Task, Tag, Started, Stopped, Elapsed. A running slot has an empty
    /// Stopped and is measured against `now`.
    pub fn display_row(&self, i: usize, now: NaiveDateTime) -> Option<[String; 5]> {
        let row = self.rows.get(i)?;
        Some([
            row.task.name.clone(),
            row.tag.as_ref().map(|t| t.name.clone()).unwrap_or_default(),
            local_ts(&row.slot.fst),
            row.slot.lst.as_ref().map(local_ts).unwrap_or_default(),
            duration_to_str(row.slot.elapsed(now)),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::RaySlotFetchRequest;
    use crate::utils::time::parse_ts;

    fn row(id: i64, fst: &str) -> TableRow {
        let mut slot = Slot::closed(parse_ts(fst).unwrap(), parse_ts(fst).unwrap());
        slot.id = Some(id);
        TableRow {
            tag: None,
            task: Task::with_id(1, "t"),
            slot,
        }
    }

    fn fst(r: &TableRow) -> NaiveDateTime {
        r.slot.fst
    }

    #[test]
    fn leftmost_index_cases() {
        let ten = row(9, "2025-01-01 10:00:00");

        assert_eq!(find_leftmost_index(&[], &ten, fst), 0);

        let seq = [row(1, "2025-01-01 09:00:00"), row(2, "2025-01-01 11:00:00")];
        assert_eq!(find_leftmost_index(&seq, &ten, fst), 1);

        let seq = [row(1, "2025-01-01 10:00:00"), row(2, "2025-01-01 10:00:00")];
        assert_eq!(find_leftmost_index(&seq, &ten, fst), 0);
    }

    #[test]
    fn leftmost_index_at_both_ends() {
        let seq = [row(1, "2025-01-01 09:00:00"), row(2, "2025-01-01 11:00:00")];
        assert_eq!(find_leftmost_index(&seq, &row(3, "2025-01-01 08:00:00"), fst), 0);
        assert_eq!(find_leftmost_index(&seq, &row(3, "2025-01-01 12:00:00"), fst), 2);
    }

    #[test]
    fn equal_keys_go_in_front() {
        let mut table = SortedEntryTable::new();
        table.insert(row(1, "2025-01-01 10:00:00")).unwrap();
        table.insert(row(2, "2025-01-01 09:00:00")).unwrap();
        let i = table.insert(row(3, "2025-01-01 10:00:00")).unwrap();

        assert_eq!(i, 1);
        let ids: Vec<i64> = table.rows().iter().filter_map(|r| r.slot.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        assert!(table.is_sorted());
    }

    #[test]
    fn upsert_moves_a_row_by_slot_id() {
        let mut table = SortedEntryTable::new();
        table.insert(row(1, "2025-01-01 09:00:00")).unwrap();
        table.insert(row(2, "2025-01-01 10:00:00")).unwrap();

        table.upsert(row(1, "2025-01-01 11:00:00")).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.position_of_slot(1), Some(1));
        assert!(table.is_sorted());
    }

    #[test]
    fn ray_key_follows_fetch_order() {
        let mut table = SortedEntryTable::for_ray(Direction::FutureToPast, Direction::PastToFuture);
        let offset = parse_ts("2025-01-03 00:00:00").unwrap();
        let response = RaySlotFetchResponse {
            rows: vec![
                row(1, "2025-01-01 09:00:00"),
                row(2, "2025-01-02 14:00:00"),
                row(3, "2025-01-02 08:00:00"),
            ]
            .into_iter()
            .map(|r| SlotRow {
                slot: r.slot,
                task: r.task,
                tag: r.tag,
            })
            .collect(),
            dates: Vec::new(),
            request: RaySlotFetchRequest::new(offset, Direction::FutureToPast),
        };

        assert_eq!(table.merge_ray_response(response).unwrap(), 3);
        let ids: Vec<i64> = table.rows().iter().filter_map(|r| r.slot.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[test]
    fn running_row_displays_elapsed_against_now() {
        let mut table = SortedEntryTable::new();
        let start = parse_ts("2025-01-01 09:00:00").unwrap();
        table
            .merge_entry(Entry::new(Task::with_id(1, "Write"), Slot::open(start)))
            .unwrap();

        let now = parse_ts("2025-01-01 10:15:30").unwrap();
        let cols = table.display_row(0, now).unwrap();
        assert_eq!(cols[0], "Write");
        assert_eq!(cols[1], "");
        assert_eq!(cols[3], "");
        assert_eq!(cols[4], " 1:15:30");
        assert!(table.display_row(1, now).is_none());
    }
}
