use crate::gps_processor::{GpsProcessor, Point, ProcessResult, RawData};
use crate::route::RoutePoint;
use anyhow::{Error, Result};
use chrono::{DateTime, Utc};
use gpx::read;
use std::{fs::File, io::BufReader};

/// Reads every track segment of a GPX file as a list of raw fixes.
pub fn load_gpx(file_path: &str) -> Result<Vec<Vec<RawData>>> {
    let gpx_data = read(BufReader::new(File::open(file_path)?))?;
    let mut raw_data_segments = Vec::new();
    for track in &gpx_data.tracks {
        for segment in &track.segments {
            let mut raw_data_list = Vec::with_capacity(segment.points.len());
            for point in &segment.points {
                let timestamp = match &point.time {
                    Some(time) => Some(DateTime::<Utc>::from(DateTime::parse_from_rfc3339(
                        &time.format()?,
                    )?)),
                    None => None,
                };
                raw_data_list.push(RawData {
                    point: Point {
                        latitude: point.point().y(),
                        longitude: point.point().x(),
                    },
                    timestamp_ms: timestamp.map(|x| x.timestamp_millis()),
                    accuracy: point.hdop.map(|hdop| hdop as f32),
                    altitude: point.elevation.map(|value| value as f32),
                    speed: point.speed.map(|value| value as f32),
                });
            }
            raw_data_segments.push(raw_data_list);
        }
    }
    Ok(raw_data_segments)
}

/// Turns raw fixes into route points ready to be stored. With
/// `run_preprocessor` every segment goes through its own admission filter, so
/// the first fix of a segment is always kept.
pub fn raw_data_to_route_points(
    raw_data_segments: Vec<Vec<RawData>>,
    run_preprocessor: bool,
) -> Result<Vec<RoutePoint>> {
    let mut route_points = Vec::new();
    for raw_data_list in raw_data_segments {
        let mut gps_processor = GpsProcessor::new();
        for raw_data in raw_data_list {
            let keep = if run_preprocessor {
                gps_processor.preprocess(&raw_data) == ProcessResult::Accept
            } else {
                raw_data.is_valid()
            };
            if keep {
                route_points.push(raw_data.to_route_point());
            }
        }
    }
    if route_points.is_empty() {
        return Err(Error::msg("No data found"));
    }
    Ok(route_points)
}

pub fn load_gpx_route_points(file_path: &str, run_preprocessor: bool) -> Result<Vec<RoutePoint>> {
    raw_data_to_route_points(load_gpx(file_path)?, run_preprocessor)
}
