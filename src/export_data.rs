use crate::route::RouteSegment;
use anyhow::Result;
use geo_types::Point;
use gpx::{Gpx, GpxVersion, Track, TrackSegment, Waypoint};
use std::io::Write;

pub const GPX_CREATOR: &str = "Stray";

pub fn route_segments_to_gpx(route_segments: &[RouteSegment]) -> Gpx {
    let segments = route_segments
        .iter()
        .map(|route_segment| TrackSegment {
            points: route_segment
                .track_points
                .iter()
                .map(|point| Waypoint::new(Point::new(point.longitude, point.latitude)))
                .collect(),
        })
        .collect();
    let track = Track {
        name: Some("Walk routes".to_string()),
        segments,
        ..Default::default()
    };
    Gpx {
        version: GpxVersion::Gpx11,
        creator: Some(GPX_CREATOR.to_string()),
        tracks: vec![track],
        ..Default::default()
    }
}

pub fn route_segments_to_gpx_file<W: Write>(
    route_segments: &[RouteSegment],
    writer: &mut W,
) -> Result<()> {
    let gpx = route_segments_to_gpx(route_segments);
    gpx::write(&gpx, writer)?;
    Ok(())
}
