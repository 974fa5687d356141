#![allow(dead_code)]

use chrono::DateTime;
use stray_core::gps_processor::{Point, RawData};
use stray_core::route::RoutePoint;

// meters covered by one degree of latitude
pub const METERS_PER_DEGREE: f64 = 111_194.93;

pub const START_TIMESTAMP_SEC: i64 = 1_714_550_400; // 2024-05-01T08:00:00Z
pub const START_LAT: f64 = 31.2;
pub const START_LNG: f64 = 121.4;

pub fn raw_data(timestamp_sec: i64, latitude: f64, longitude: f64) -> RawData {
    RawData {
        point: Point {
            latitude,
            longitude,
        },
        timestamp_ms: Some(timestamp_sec * 1000),
        accuracy: Some(5.0),
        altitude: None,
        speed: None,
    }
}

pub fn route_point(timestamp_sec: i64, latitude: f64, longitude: f64) -> RoutePoint {
    RoutePoint {
        latitude: Some(latitude),
        longitude: Some(longitude),
        timestamp: DateTime::from_timestamp(timestamp_sec, 0),
    }
}

/// A walk heading north, one fix every `interval_sec` seconds, `step_in_m`
/// meters apart.
pub fn walk(
    start_timestamp_sec: i64,
    start_lat: f64,
    num_of_fixes: usize,
    interval_sec: i64,
    step_in_m: f64,
) -> Vec<RawData> {
    (0..num_of_fixes)
        .map(|i| {
            raw_data(
                start_timestamp_sec + i as i64 * interval_sec,
                start_lat + i as f64 * step_in_m / METERS_PER_DEGREE,
                START_LNG,
            )
        })
        .collect()
}

/// Two walks separated by a long break: 200 fixes, a 20 minute pause, then
/// another 100 fixes.
pub fn two_walks() -> Vec<RawData> {
    let mut data = walk(START_TIMESTAMP_SEC, START_LAT, 200, 6, 8.0);
    let second_start = START_TIMESTAMP_SEC + 200 * 6 + 20 * 60;
    data.extend(walk(second_start, START_LAT + 0.02, 100, 6, 8.0));
    data
}
