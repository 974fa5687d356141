pub mod test_utils;

use stray_core::gps_processor::Point;
use stray_core::route::RoutePoint;
use stray_core::route_segmenter::build_route_segments;
use test_utils::{route_point, METERS_PER_DEGREE, START_LAT, START_LNG, START_TIMESTAMP_SEC};

fn coordinates(points: &[RoutePoint]) -> Vec<Point> {
    points.iter().filter_map(RoutePoint::coordinate).collect()
}

#[test]
fn empty() {
    assert!(build_route_segments(&[]).is_empty());
}

#[test]
fn two_close_points() {
    let points = vec![route_point(0, 0.0, 0.0), route_point(10, 0.0, 0.0001)];
    let segments = build_route_segments(&points);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].track_points, coordinates(&points));
}

#[test]
fn long_pause_leaves_only_single_points() {
    let points = vec![route_point(0, 0.0, 0.0), route_point(1000, 0.0, 0.0)];
    assert!(build_route_segments(&points).is_empty());
}

#[test]
fn keeps_input_order() {
    let step = 100.0 / METERS_PER_DEGREE;
    let points = vec![
        route_point(START_TIMESTAMP_SEC, START_LAT, START_LNG),
        route_point(START_TIMESTAMP_SEC + 60, START_LAT + step, START_LNG),
        route_point(START_TIMESTAMP_SEC + 120, START_LAT + 2.0 * step, START_LNG),
    ];
    let segments = build_route_segments(&points);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].track_points, coordinates(&points));
}

#[test]
fn missing_coordinate_is_skipped() {
    let points = vec![
        route_point(START_TIMESTAMP_SEC, START_LAT, START_LNG),
        RoutePoint {
            latitude: None,
            longitude: Some(START_LNG),
            timestamp: route_point(START_TIMESTAMP_SEC + 5, 0.0, 0.0).timestamp,
        },
        route_point(START_TIMESTAMP_SEC + 10, START_LAT + 0.0001, START_LNG),
    ];
    let segments = build_route_segments(&points);
    assert_eq!(segments.len(), 1);
    assert_eq!(
        segments[0].track_points,
        vec![
            Point::new(START_LAT, START_LNG),
            Point::new(START_LAT + 0.0001, START_LNG)
        ]
    );
}

#[test]
fn missing_timestamp_is_skipped() {
    let points = vec![
        route_point(START_TIMESTAMP_SEC, START_LAT, START_LNG),
        // far away, would break the segment if it counted
        RoutePoint {
            latitude: Some(START_LAT + 1.0),
            longitude: Some(START_LNG),
            timestamp: None,
        },
        route_point(START_TIMESTAMP_SEC + 10, START_LAT + 0.0001, START_LNG),
    ];
    let segments = build_route_segments(&points);
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].track_points.len(), 2);
}

#[test]
fn all_invalid() {
    let points = vec![
        RoutePoint {
            latitude: None,
            longitude: None,
            timestamp: None,
        },
        RoutePoint {
            latitude: Some(START_LAT),
            longitude: None,
            timestamp: route_point(START_TIMESTAMP_SEC, 0.0, 0.0).timestamp,
        },
    ];
    assert!(build_route_segments(&points).is_empty());
}

#[test]
fn distance_gap_breaks_segment() {
    // 600m jump within 30 seconds, e.g. a gps glitch
    let jump = 600.0 / METERS_PER_DEGREE;
    let points = vec![
        route_point(START_TIMESTAMP_SEC, START_LAT, START_LNG),
        route_point(START_TIMESTAMP_SEC + 10, START_LAT + 0.0001, START_LNG),
        route_point(START_TIMESTAMP_SEC + 40, START_LAT + 0.0001 + jump, START_LNG),
        route_point(START_TIMESTAMP_SEC + 50, START_LAT + 0.0002 + jump, START_LNG),
        route_point(START_TIMESTAMP_SEC + 60, START_LAT + 0.0003 + jump, START_LNG),
    ];
    let segments = build_route_segments(&points);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].track_points.len(), 2);
    assert_eq!(segments[1].track_points.len(), 3);
    assert_eq!(segments[1].track_points[0], points[2].coordinate().unwrap());
}

#[test]
fn isolated_point_between_breaks_is_dropped() {
    let points = vec![
        route_point(START_TIMESTAMP_SEC, START_LAT, START_LNG),
        route_point(START_TIMESTAMP_SEC + 10, START_LAT, START_LNG),
        // alone: 30 minutes after and before its neighbours
        route_point(START_TIMESTAMP_SEC + 1810, START_LAT, START_LNG),
        route_point(START_TIMESTAMP_SEC + 3610, START_LAT, START_LNG),
        route_point(START_TIMESTAMP_SEC + 3620, START_LAT, START_LNG),
    ];
    let segments = build_route_segments(&points);
    assert_eq!(segments.len(), 2);
    assert!(segments.iter().all(|x| x.track_points.len() == 2));
}

#[test]
fn no_segment_shorter_than_two_points() {
    let points: Vec<RoutePoint> = test_utils::two_walks()
        .iter()
        .enumerate()
        // sprinkle some long pauses in
        .map(|(i, data)| {
            let mut point = data.to_route_point();
            if i % 7 == 0 {
                point.timestamp = point
                    .timestamp
                    .map(|x| x + chrono::Duration::hours(i as i64));
            }
            point
        })
        .collect();
    for segment in build_route_segments(&points) {
        assert!(segment.track_points.len() >= 2);
    }
}

#[test]
fn two_walks() {
    let points: Vec<RoutePoint> = test_utils::two_walks()
        .iter()
        .map(|x| x.to_route_point())
        .collect();
    let segments = build_route_segments(&points);
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].track_points.len(), 200);
    assert_eq!(segments[1].track_points.len(), 100);
}

#[test]
fn idempotent() {
    let points: Vec<RoutePoint> = test_utils::two_walks()
        .iter()
        .map(|x| x.to_route_point())
        .collect();
    assert_eq!(build_route_segments(&points), build_route_segments(&points));
}

#[test]
fn unsorted_input_does_not_panic() {
    let mut points: Vec<RoutePoint> = test_utils::two_walks()
        .iter()
        .map(|x| x.to_route_point())
        .collect();
    points.reverse();
    let segments = build_route_segments(&points);
    let total: usize = segments.iter().map(|x| x.track_points.len()).sum();
    assert!(total <= points.len());
}

#[test]
fn jump_to_the_other_side_of_the_earth_breaks_segment() {
    let points = vec![
        route_point(0, 2.5, 0.0),
        route_point(10, 2.5, 0.0),
        route_point(20, -2.5, 180.0),
        route_point(30, -2.5, 180.0001),
    ];
    let segments = build_route_segments(&points);
    let lengths: Vec<usize> = segments.iter().map(|x| x.track_points.len()).collect();
    assert_eq!(lengths, vec![2, 2]);
}
