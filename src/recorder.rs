use anyhow::Result;
use std::sync::{mpsc, Mutex};

use crate::gps_processor::{Point, RawData};
use crate::map_renderer::{self, MapRegion, MapRenderer, RouteOverlay};
use crate::route::RouteSegment;
use crate::route_segmenter;
use crate::storage::RoutePointStore;
use crate::tracker::{AuthorizationStatus, LocationTracker, StartAction, TrackerEvent};

/// Glues the location source, the admission filter and the store together.
///
/// Segments are never cached here: every query re-reads the store and runs
/// the segmentation again.
pub struct RouteRecorder<S> {
    store: S,
    tracker: Mutex<LocationTracker>,
    map_renderer: Mutex<MapRenderer>,
}

impl<S: RoutePointStore> RouteRecorder<S> {
    pub fn new(store: S) -> Self {
        RouteRecorder {
            store,
            tracker: Mutex::new(LocationTracker::new()),
            map_renderer: Mutex::new(MapRenderer::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn start(&self) -> StartAction {
        self.tracker.lock().unwrap().start()
    }

    pub fn authorization_status(&self) -> AuthorizationStatus {
        self.tracker.lock().unwrap().authorization_status()
    }

    pub fn on_authorization_change(&self, status: AuthorizationStatus) -> StartAction {
        self.tracker.lock().unwrap().on_authorization_change(status)
    }

    pub fn subscribe(&self) -> mpsc::Receiver<TrackerEvent> {
        self.tracker.lock().unwrap().subscribe()
    }

    pub fn latest_location(&self) -> Option<Point> {
        self.tracker.lock().unwrap().latest_location().cloned()
    }

    /// Handles a batch of fixes from the location source and returns how many
    /// were accepted.
    ///
    /// A failed write does not stop the batch and does not undo the filter
    /// state, the first error is returned once the whole batch is processed.
    pub fn on_location_update(&self, mut raw_data_list: Vec<RawData>) -> Result<usize> {
        // NOTE: batches are not guaranteed to be ordered.
        raw_data_list.sort_by(|a, b| a.timestamp_ms.cmp(&b.timestamp_ms));

        // we need handle a batch in one go so we hold the lock for the whole time
        let mut tracker = self.tracker.lock().unwrap();
        let mut num_of_accepted = 0;
        let mut num_of_failed = 0;
        let mut first_error = None;
        for raw_data in raw_data_list.iter().filter(|x| x.is_valid()) {
            let (process_result, route_point) = tracker.on_location(raw_data);
            if route_point.is_some() {
                num_of_accepted += 1;
            }
            if let Err(error) = self.store.record_gps_data(raw_data, process_result) {
                error!(
                    "[recorder] failed to persist fix at {:?}: {}",
                    raw_data.timestamp_ms, error
                );
                num_of_failed += 1;
                first_error.get_or_insert(error);
            }
        }
        drop(tracker);

        match first_error {
            None => Ok(num_of_accepted),
            Some(error) => Err(error.context(format!(
                "{} of {} fixes failed to persist",
                num_of_failed,
                raw_data_list.len()
            ))),
        }
    }

    pub fn route_segments(&self) -> Result<Vec<RouteSegment>> {
        let route_points = self.store.read_all()?;
        Ok(route_segmenter::build_route_segments(&route_points))
    }

    /// Returns `true` if the route needs to be redrawn.
    pub fn update_latitude_delta(&self, latitude_delta: f64) -> bool {
        self.map_renderer
            .lock()
            .unwrap()
            .update_latitude_delta(latitude_delta)
    }

    pub fn route_overlay(&self) -> Result<RouteOverlay> {
        let live_location = self.latest_location();
        let route_points = self.store.read_all()?;
        let map_renderer = self.map_renderer.lock().unwrap();
        Ok(map_renderer.render(&route_points, live_location.as_ref()))
    }

    pub fn center_on_latest_location(&self) -> Result<Option<MapRegion>> {
        let live_location = self.latest_location();
        if let Some(live_location) = live_location {
            return Ok(Some(MapRegion::centered_on(live_location)));
        }
        let route_points = self.store.read_all()?;
        Ok(map_renderer::center_target(None, &route_points))
    }
}
