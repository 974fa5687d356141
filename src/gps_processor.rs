use crate::route::RoutePoint;
use chrono::DateTime;
use geo::{Distance, Haversine};
use serde::Serialize;
use std::f64::consts::PI;

// mean earth radius, the one `geo` uses for haversine.
const EARTH_RADIUS_IN_M: f64 = 6_371_008.8;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Point {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance in meters.
    pub fn haversine_distance(&self, other: &Point) -> f64 {
        let distance = Haversine::distance(self.to_geo(), other.to_geo());
        if distance.is_nan() && self.is_finite() && other.is_finite() {
            // rounding pushes the haversine term just above 1 for (nearly)
            // antipodal points
            return PI * EARTH_RADIUS_IN_M;
        }
        distance
    }

    fn to_geo(&self) -> geo::Point<f64> {
        geo::Point::new(self.longitude, self.latitude)
    }

    fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawData {
    pub point: Point,
    pub timestamp_ms: Option<i64>,
    // horizontal accuracy in meters, negative means the fix is invalid
    pub accuracy: Option<f32>,
    pub altitude: Option<f32>,
    pub speed: Option<f32>,
}

impl RawData {
    pub fn is_valid(&self) -> bool {
        match self.accuracy {
            Some(accuracy) => accuracy >= 0.0,
            None => true,
        }
    }

    pub fn to_route_point(&self) -> RoutePoint {
        RoutePoint {
            latitude: Some(self.point.latitude),
            longitude: Some(self.point.longitude),
            timestamp: self.timestamp_ms.and_then(DateTime::from_timestamp_millis),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(i8)]
pub enum ProcessResult {
    Accept = 0,
    // negative values are for ones that should not be stored in the
    // `route_point` table.
    Reject = -1,
}

impl ProcessResult {
    pub fn to_int(&self) -> i8 {
        *self as i8
    }
}

pub const MIN_DISTANCE_IN_M: f64 = 10.0;
pub const MIN_TIME_INTERVAL_IN_MS: i64 = 5 * 1000;

/// Decides whether `curr_data` is worth persisting given the last accepted fix.
///
/// Moving far enough or waiting long enough are each sufficient on their own.
/// A fix that is back-dated relative to `last_accepted` can only qualify by
/// distance.
pub fn evaluate(curr_data: &RawData, last_accepted: Option<&RawData>) -> ProcessResult {
    if !curr_data.is_valid() {
        return ProcessResult::Reject;
    }
    let last_accepted = match last_accepted {
        None => return ProcessResult::Accept,
        Some(last_accepted) => last_accepted,
    };

    let moved_enough =
        curr_data.point.haversine_distance(&last_accepted.point) >= MIN_DISTANCE_IN_M;
    let waited_enough = match curr_data
        .timestamp_ms
        .zip(last_accepted.timestamp_ms)
        .and_then(|(now, prev)| now.checked_sub(prev))
    {
        None => false,
        Some(time_diff_in_ms) => time_diff_in_ms >= MIN_TIME_INTERVAL_IN_MS,
    };

    if moved_enough || waited_enough {
        ProcessResult::Accept
    } else {
        ProcessResult::Reject
    }
}

pub struct GpsProcessor {
    last_accepted: Option<RawData>,
    // most recent valid fix, accepted or not. Only used for the live marker.
    latest: Option<RawData>,
}

impl GpsProcessor {
    pub fn new() -> Self {
        GpsProcessor {
            last_accepted: None,
            latest: None,
        }
    }

    pub fn last_accepted(&self) -> Option<&RawData> {
        self.last_accepted.as_ref()
    }

    pub fn latest(&self) -> Option<&RawData> {
        self.latest.as_ref()
    }

    pub fn preprocess(&mut self, curr_data: &RawData) -> ProcessResult {
        if !curr_data.is_valid() {
            return ProcessResult::Reject;
        }
        let result = evaluate(curr_data, self.last_accepted.as_ref());
        self.latest = Some(curr_data.clone());
        if result == ProcessResult::Accept {
            self.last_accepted = Some(curr_data.clone());
        }
        result
    }
}
