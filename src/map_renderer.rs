use crate::gps_processor::Point;
use crate::route::{RoutePoint, RouteSegment};
use crate::route_segmenter;
use serde::Serialize;

// `latitude_delta` is the span of latitude currently shown on the map, in
// degrees. Smaller means more zoomed in.
const DOTS_MAX_LATITUDE_DELTA: f64 = 0.09;
const DETAIL_MAX_LATITUDE_DELTA: f64 = 0.02;
const WIDE_LINE_MIN_LATITUDE_DELTA: f64 = 0.09;

pub const DEFAULT_LATITUDE_DELTA: f64 = 0.01;
pub const CENTER_SPAN_IN_DEGREES: f64 = 0.01;

const LIVE_MARKER_SIZE: f64 = 12.0;
const LIVE_MARKER_BORDER_WIDTH: f64 = 2.0;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderStyle {
    pub show_dots: bool,
    pub dot_size: f64,
    pub dot_border_width: f64,
    pub line_width: f64,
}

impl RenderStyle {
    pub fn for_latitude_delta(latitude_delta: f64) -> Self {
        let detailed = latitude_delta < DETAIL_MAX_LATITUDE_DELTA;
        RenderStyle {
            show_dots: latitude_delta < DOTS_MAX_LATITUDE_DELTA,
            dot_size: if detailed { 7.0 } else { 5.0 },
            dot_border_width: if detailed { 1.0 } else { 0.0 },
            line_width: if latitude_delta > WIDE_LINE_MIN_LATITUDE_DELTA {
                4.5
            } else {
                3.0
            },
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct LiveMarker {
    pub point: Point,
    pub size: f64,
    pub border_width: f64,
}

/// Everything the map view needs to draw the recorded route.
#[derive(Debug, PartialEq, Serialize)]
pub struct RouteOverlay {
    pub segments: Vec<RouteSegment>,
    // empty unless `style.show_dots`
    pub dots: Vec<Point>,
    pub style: RenderStyle,
    pub live_marker: Option<LiveMarker>,
}

impl RouteOverlay {
    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapRegion {
    pub center: Point,
    pub latitude_delta: f64,
    pub longitude_delta: f64,
}

impl MapRegion {
    pub fn centered_on(center: Point) -> Self {
        MapRegion {
            center,
            latitude_delta: CENTER_SPAN_IN_DEGREES,
            longitude_delta: CENTER_SPAN_IN_DEGREES,
        }
    }
}

pub fn render_route_overlay(
    points: &[RoutePoint],
    latitude_delta: f64,
    live_location: Option<&Point>,
) -> RouteOverlay {
    let style = RenderStyle::for_latitude_delta(latitude_delta);
    let dots = if style.show_dots {
        points
            .iter()
            .filter(|point| point.timestamp.is_some())
            .filter_map(RoutePoint::coordinate)
            .collect()
    } else {
        Vec::new()
    };
    RouteOverlay {
        segments: route_segmenter::build_route_segments(points),
        dots,
        style,
        live_marker: live_location.map(|point| LiveMarker {
            point: point.clone(),
            size: LIVE_MARKER_SIZE,
            border_width: LIVE_MARKER_BORDER_WIDTH,
        }),
    }
}

/// Where the map should be centered: the live position if there is one,
/// otherwise the most recent stored point with a coordinate.
pub fn center_target(live_location: Option<&Point>, points: &[RoutePoint]) -> Option<MapRegion> {
    live_location
        .cloned()
        .or_else(|| points.iter().rev().find_map(RoutePoint::coordinate))
        .map(MapRegion::centered_on)
}

pub struct MapRenderer {
    latitude_delta: f64,
}

impl MapRenderer {
    pub fn new() -> Self {
        MapRenderer {
            latitude_delta: DEFAULT_LATITUDE_DELTA,
        }
    }

    pub fn latitude_delta(&self) -> f64 {
        self.latitude_delta
    }

    /// Returns `true` if the new zoom level changes how the route is styled,
    /// i.e. the caller needs to redraw.
    pub fn update_latitude_delta(&mut self, latitude_delta: f64) -> bool {
        let old_style = RenderStyle::for_latitude_delta(self.latitude_delta);
        self.latitude_delta = latitude_delta;
        old_style != RenderStyle::for_latitude_delta(latitude_delta)
    }

    pub fn render(&self, points: &[RoutePoint], live_location: Option<&Point>) -> RouteOverlay {
        render_route_overlay(points, self.latitude_delta, live_location)
    }
}
