use crate::models::{Direction, Slot, Tag, Task};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Request a window of slots, paginated over distinct calendar dates.
///
/// `[slice_fst, slice_lst)` indexes the sorted distinct dates on the
/// `direction` side of `dt_offset`, not individual slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RaySlotFetchRequest {
    pub dates_dir: Direction,
    pub times_dir: Direction,
    pub slice_fst: usize,
    pub slice_lst: usize,
    pub dt_offset: NaiveDateTime,
    pub direction: Direction,
}

impl RaySlotFetchRequest {
    /// Dates ascending, times ascending, first seven dates.
    pub fn new(dt_offset: NaiveDateTime, direction: Direction) -> Self {
        Self {
            dates_dir: Direction::PastToFuture,
            times_dir: Direction::PastToFuture,
            slice_fst: 0,
            slice_lst: 7,
            dt_offset,
            direction,
        }
    }

    pub fn with_dates_dir(mut self, dir: Direction) -> Self {
        self.dates_dir = dir;
        self
    }

    pub fn with_times_dir(mut self, dir: Direction) -> Self {
        self.times_dir = dir;
        self
    }

    pub fn with_slice(mut self, slice_fst: usize, slice_lst: usize) -> Self {
        self.slice_fst = slice_fst;
        self.slice_lst = slice_lst;
        self
    }

    /// Select page `page` (0-based) of `size` dates.
    pub fn with_page(self, page: usize, size: usize) -> Self {
        let fst = page.saturating_mul(size);
        self.with_slice(fst, fst.saturating_add(size))
    }

    /// Number of dates the window spans; 0 for an empty or inverted window.
    pub fn width(&self) -> usize {
        self.slice_lst.saturating_sub(self.slice_fst)
    }

    /// The adjacent window `[slice_lst, slice_lst + width)`.
    pub fn next_page(&self) -> Self {
        let width = self.width();
        self.clone()
            .with_slice(self.slice_lst, self.slice_lst.saturating_add(width))
    }
}

/// One (Slot, Task) pair of a ray fetch, with the task's primary tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SlotRow {
    pub slot: Slot,
    pub task: Task,
    pub tag: Option<Tag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RaySlotFetchResponse {
    /// Ordered by date (`dates_dir`), then time of day (`times_dir`).
    pub rows: Vec<SlotRow>,
    /// The windowed distinct dates, in `dates_dir` order.
    pub dates: Vec<NaiveDate>,
    pub request: RaySlotFetchRequest,
}

impl RaySlotFetchResponse {
    pub fn empty(request: RaySlotFetchRequest) -> Self {
        Self {
            rows: Vec::new(),
            dates: Vec::new(),
            request,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::date::start_of;

    #[test]
    fn pages_are_adjacent_windows() {
        let offset = start_of(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let first = RaySlotFetchRequest::new(offset, Direction::PastToFuture).with_page(0, 3);
        assert_eq!((first.slice_fst, first.slice_lst), (0, 3));

        let second = first.next_page();
        assert_eq!((second.slice_fst, second.slice_lst), (3, 6));
        assert_eq!(second, first.clone().with_page(1, 3));
    }

    #[test]
    fn inverted_window_has_no_width() {
        let offset = start_of(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        let req = RaySlotFetchRequest::new(offset, Direction::FutureToPast).with_slice(5, 2);
        assert_eq!(req.width(), 0);
    }
}
