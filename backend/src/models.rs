use serde::{Deserialize, Serialize};

pub use shared::{
    Anchor, ApiError, Coordinate, Day, NamedCoordinate, PlanHints, PlanKind, PlanRequest,
    PlanResponse, PlanSeed, RouteRequest, RouteResponse, TravelProfile,
};

/// Result of one successful provider call across an ordered list of waypoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub encoded_path: String,
    pub distance_km: f64,
    pub duration_min: f64,
}

impl From<RouteSegment> for RouteResponse {
    fn from(segment: RouteSegment) -> Self {
        RouteResponse {
            encoded_path: segment.encoded_path,
            distance_km: segment.distance_km,
            duration_min: segment.duration_min,
        }
    }
}
