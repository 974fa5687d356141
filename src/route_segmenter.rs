use crate::gps_processor::Point;
use crate::route::{RoutePoint, RouteSegment};
use chrono::{DateTime, TimeDelta, Utc};

pub const TIME_GAP_THRESHOLD_IN_MIN: i64 = 15;
pub const DISTANCE_GAP_THRESHOLD_IN_M: f64 = 500.0;

/// Splits the stored history into drawable segments.
///
/// `points` should be sorted by timestamp. Points without a coordinate or a
/// timestamp are skipped and never cause a break. A break happens when two
/// neighbouring valid points are more than 15 minutes or more than 500 meters
/// apart; runs shorter than two points are dropped since they cannot form a
/// line.
pub fn build_route_segments(points: &[RoutePoint]) -> Vec<RouteSegment> {
    let mut segments = Vec::new();
    let mut current_segment: Vec<Point> = Vec::new();
    let mut previous: Option<(Point, DateTime<Utc>)> = None;
    let time_gap_threshold = TimeDelta::minutes(TIME_GAP_THRESHOLD_IN_MIN);

    let valid_points = points
        .iter()
        .filter_map(|point| point.coordinate().zip(point.timestamp));

    for (point, timestamp) in valid_points {
        if let Some((prev_point, prev_timestamp)) = &previous {
            // unsorted input gives a negative gap here, which never breaks
            let time_gap = timestamp - *prev_timestamp;
            let distance_gap = point.haversine_distance(prev_point);
            let need_break = time_gap > time_gap_threshold
                || distance_gap > DISTANCE_GAP_THRESHOLD_IN_M;
            if need_break {
                close_segment(&mut segments, std::mem::take(&mut current_segment));
            }
        }
        current_segment.push(point.clone());
        previous = Some((point, timestamp));
    }
    close_segment(&mut segments, current_segment);

    segments
}

fn close_segment(segments: &mut Vec<RouteSegment>, track_points: Vec<Point>) {
    if track_points.len() >= 2 {
        segments.push(RouteSegment { track_points });
    }
}
