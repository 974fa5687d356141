use std::fs::File;
use std::sync::{mpsc, OnceLock};

use crate::gps_processor::{self, Point};
use crate::map_renderer::{MapRegion, RouteOverlay};
use crate::recorder::RouteRecorder;
use crate::route::RouteSegment;
use crate::storage::{self, Storage};
use crate::tracker::{AuthorizationStatus, StartAction, TrackerEvent};
use crate::{export_data, import_data, logs};
use anyhow::Result;

struct MainState {
    cache_dir: String,
    recorder: RouteRecorder<Storage>,
}

static MAIN_STATE: OnceLock<MainState> = OnceLock::new();

/// Sets up logging and storage. Storage falls back to memory if the on-disk
/// database cannot be opened, so recording keeps working for the session. It
/// is an error only if no storage option works at all.
pub fn init(support_dir: String, cache_dir: String) -> Result<()> {
    if MAIN_STATE.get().is_some() {
        warn!("`init` is called multiple times");
        return Ok(());
    }

    // init logging
    if let Err(error) = logs::init(&cache_dir) {
        eprintln!("failed to initialize logging: {error}");
    }

    let storage = Storage::init_default(support_dir)?;
    let state = MainState {
        cache_dir,
        recorder: RouteRecorder::new(storage),
    };
    if MAIN_STATE.set(state).is_err() {
        warn!("`init` is called multiple times");
    } else {
        info!("initialized");
    }
    Ok(())
}

fn get() -> &'static MainState {
    MAIN_STATE.get().expect("main state is not initialized")
}

pub fn start() -> StartAction {
    get().recorder.start()
}

pub fn on_authorization_change(status: AuthorizationStatus) -> StartAction {
    get().recorder.on_authorization_change(status)
}

pub fn authorization_status_message() -> String {
    get().recorder.authorization_status().status_message().to_string()
}

pub fn subscribe_tracker_events() -> mpsc::Receiver<TrackerEvent> {
    get().recorder.subscribe()
}

pub fn subscribe_logs() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    logs::set_log_sink(tx);
    rx
}

pub fn on_location_update(raw_data_list: Vec<gps_processor::RawData>) -> Result<usize> {
    get().recorder.on_location_update(raw_data_list)
}

pub fn latest_location() -> Option<Point> {
    get().recorder.latest_location()
}

pub fn on_map_camera_change(latitude_delta: f64) -> bool {
    get().recorder.update_latitude_delta(latitude_delta)
}

pub fn get_route_segments() -> Result<Vec<RouteSegment>> {
    get().recorder.route_segments()
}

pub fn get_route_overlay() -> Result<RouteOverlay> {
    get().recorder.route_overlay()
}

pub fn get_route_overlay_json() -> Result<String> {
    get().recorder.route_overlay()?.to_json()
}

pub fn center_on_latest_location() -> Result<Option<MapRegion>> {
    get().recorder.center_on_latest_location()
}

pub fn get_raw_data_mode() -> bool {
    get().recorder.store().get_raw_data_mode()
}

pub fn toggle_raw_data_mode(enable: bool) -> Result<()> {
    get().recorder.store().toggle_raw_data_mode(enable)
}

pub fn list_all_raw_data() -> Result<Vec<storage::RawDataFile>> {
    get().recorder.store().list_all_raw_data()
}

pub fn import_gpx(file_path: String, run_preprocessor: bool) -> Result<usize> {
    let route_points = import_data::load_gpx_route_points(&file_path, run_preprocessor)?;
    get().recorder.store().import_route_points(&route_points)?;
    info!("imported {} route points from gpx", route_points.len());
    Ok(route_points.len())
}

pub fn export_route_as_gpx(target_filepath: String) -> Result<()> {
    let route_segments = get().recorder.route_segments()?;
    let mut file = File::create(target_filepath)?;
    export_data::route_segments_to_gpx_file(&route_segments, &mut file)?;
    Ok(())
}

pub fn flush() -> Result<()> {
    get().recorder.store().flush()
}

pub fn export_logs(target_file_path: String) -> Result<()> {
    logs::export(&get().cache_dir, &target_file_path)
}
