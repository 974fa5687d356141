use crate::gps_processor::Point;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// One accepted location sample as it is stored. Rows written by older versions
/// or imported from elsewhere may miss any of the fields.
#[derive(Clone, Debug, PartialEq)]
pub struct RoutePoint {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl RoutePoint {
    pub fn coordinate(&self) -> Option<Point> {
        match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => Some(Point {
                latitude,
                longitude,
            }),
            _ => None,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct RouteSegment {
    pub track_points: Vec<Point>,
}
