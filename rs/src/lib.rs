//! Route geometry for a running planner: loop generation against a
//! directions service, point-to-point assembly, polyline simplification
//! and post-run analysis.

pub mod analysis;
pub mod core;
pub mod routing;
pub mod spatial;

pub use crate::analysis::{
    analyze_run, compute_intervals, find_duplicate, is_loop, polylines_equal, summarize_trail,
    RunAnalysis, TrailSummary, DEFAULT_DUPLICATE_TOLERANCE_KM, DEFAULT_LOOP_THRESHOLD_KM,
};
pub use crate::core::errors::{Result, RouteError};
pub use crate::core::options::{
    DirectionsOptions, LoopOptions, SimplifyOptions, FEED_PREVIEW_TOLERANCE_KM,
    MAX_SIMPLIFIED_POINTS, ROUTE_SAVE_TOLERANCE_KM,
};
pub use crate::core::types::{
    GeneratedLoopCore, GeoPoint, PaceInterval, Route, UnitSystem, Waypoint,
};
pub use crate::routing::{
    assemble_route, insertion_order, reroute, DirectionsPath, DirectionsProvider,
    GoogleDirectionsProvider, LoopGeneration, LoopRouteGenerator, PathSegment, WaypointList,
};
pub use crate::spatial::encoding::{decode_polyline, encode_polyline};
pub use crate::spatial::geometry::{
    degrees_per_km, haversine_distance_km, perpendicular_distance_km, DegreesPerKm,
};
pub use crate::spatial::simplify::{simplify_polyline, simplify_with_options};
