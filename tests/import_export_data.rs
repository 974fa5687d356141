pub mod test_utils;

use assert_float_eq::*;
use stray_core::export_data;
use stray_core::import_data;
use stray_core::route_segmenter::build_route_segments;
use tempdir::TempDir;
use test_utils::START_TIMESTAMP_SEC;

const SHORT_WALK: &str = "./tests/data/short_walk.gpx";

#[test]
fn load_gpx() {
    let raw_data_segments = import_data::load_gpx(SHORT_WALK).unwrap();
    assert_eq!(raw_data_segments.len(), 1);
    let raw_data_list = &raw_data_segments[0];
    assert_eq!(raw_data_list.len(), 8);
    assert_eq!(raw_data_list[0].timestamp_ms, Some(START_TIMESTAMP_SEC * 1000));
    assert_float_absolute_eq!(raw_data_list[0].point.latitude, 31.2);
    assert_float_absolute_eq!(raw_data_list[0].point.longitude, 121.4);
    assert!(raw_data_list[0].accuracy.is_none());
}

#[test]
fn import_with_preprocessor() {
    let route_points = import_data::load_gpx_route_points(SHORT_WALK, true).unwrap();
    assert_eq!(route_points.len(), 7);
    let segments = build_route_segments(&route_points);
    let lengths: Vec<usize> = segments.iter().map(|x| x.track_points.len()).collect();
    assert_eq!(lengths, vec![5, 2]);
}

#[test]
fn import_without_preprocessor() {
    let route_points = import_data::load_gpx_route_points(SHORT_WALK, false).unwrap();
    assert_eq!(route_points.len(), 8);
    let segments = build_route_segments(&route_points);
    let lengths: Vec<usize> = segments.iter().map(|x| x.track_points.len()).collect();
    assert_eq!(lengths, vec![6, 2]);
}

#[test]
fn import_empty() {
    assert!(import_data::raw_data_to_route_points(vec![], true).is_err());
    assert!(import_data::raw_data_to_route_points(vec![vec![]], false).is_err());
}

#[test]
fn missing_file() {
    assert!(import_data::load_gpx("./tests/data/no_such_file.gpx").is_err());
}

#[test]
fn every_segment_keeps_its_first_fix() {
    let first = test_utils::walk(START_TIMESTAMP_SEC, 31.2, 3, 1, 1.0);
    // starts right where the first one ended, a shared filter would drop it
    let second = test_utils::walk(START_TIMESTAMP_SEC + 3, 31.2, 3, 1, 1.0);
    let route_points = import_data::raw_data_to_route_points(vec![first, second], true).unwrap();
    assert_eq!(route_points.len(), 2);
}

#[test]
fn export_then_load() {
    let route_points = import_data::load_gpx_route_points(SHORT_WALK, true).unwrap();
    let segments = build_route_segments(&route_points);

    let gpx = export_data::route_segments_to_gpx(&segments);
    assert_eq!(gpx.creator.as_deref(), Some(export_data::GPX_CREATOR));
    assert_eq!(gpx.tracks.len(), 1);
    assert_eq!(gpx.tracks[0].segments.len(), 2);

    let temp_dir = TempDir::new("import_export_data-export_then_load").unwrap();
    let path = temp_dir.path().join("routes.gpx");
    let mut file = std::fs::File::create(&path).unwrap();
    export_data::route_segments_to_gpx_file(&segments, &mut file).unwrap();
    drop(file);

    let raw_data_segments = import_data::load_gpx(path.to_str().unwrap()).unwrap();
    assert_eq!(raw_data_segments.len(), 2);
    for (raw_data_list, segment) in raw_data_segments.iter().zip(segments.iter()) {
        assert_eq!(raw_data_list.len(), segment.track_points.len());
        for (raw_data, point) in raw_data_list.iter().zip(segment.track_points.iter()) {
            assert_float_absolute_eq!(raw_data.point.latitude, point.latitude, 1e-9);
            assert_float_absolute_eq!(raw_data.point.longitude, point.longitude, 1e-9);
            // only coordinates are exported
            assert!(raw_data.timestamp_ms.is_none());
        }
    }
}
