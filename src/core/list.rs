use crate::db::{RaySlotReader, TimerReader};
use crate::errors::{AppError, AppResult};
use crate::models::Entry;
use crate::msg::{EventKind, FetchResponse, RaySlotFetchRequest, RaySlotFetchResponse};
use crate::table::{RayKey, SortedEntryTable};
use crate::worker::Dispatcher;
use std::path::Path;

/// One page of the listing plus the running timer.
pub struct ListPage {
    pub response: RaySlotFetchResponse,
    pub timer: Option<Entry>,
}

pub struct ListLogic;

impl ListLogic {
    /// Fetch the page and the running timer concurrently. Responses are
    /// matched to their requests by worker id, not by arrival order.
    pub fn fetch(db: &Path, request: RaySlotFetchRequest) -> AppResult<ListPage> {
        let mut dispatcher = Dispatcher::new(db);
        let ray_id = dispatcher.dispatch(RaySlotReader::new(request))?;
        let timer_id = dispatcher.dispatch(TimerReader::default())?;

        let mut response = None;
        let mut timer = None;
        let mut failure = None;

        while let Some(event) = dispatcher.recv() {
            match event.kind {
                EventKind::Fetched(FetchResponse::RaySlots(r)) if event.worker == ray_id => {
                    response = Some(r)
                }
                EventKind::Fetched(FetchResponse::Timer(t)) if event.worker == timer_id => {
                    timer = Some(t.timer)
                }
                EventKind::Failed(f) => {
                    // keep the first failure, still drain the other worker
                    failure.get_or_insert(f);
                }
                other => log::trace!("{}: {:?}", event.worker, other),
            }
        }

        if let Some(f) = failure {
            return Err(AppError::from(f));
        }
        let response = response
            .ok_or_else(|| AppError::QueryFailure("ray slot fetch produced no rows".into()))?;
        Ok(ListPage {
            response,
            timer: timer.flatten(),
        })
    }

    /// Project a page into a table sorted the way it was fetched.
    pub fn project(response: RaySlotFetchResponse) -> AppResult<SortedEntryTable<RayKey>> {
        let req = &response.request;
        let mut table = SortedEntryTable::for_ray(req.dates_dir, req.times_dir);
        table.merge_ray_response(response)?;
        Ok(table)
    }
}
