use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// True when both components are finite and inside the WGS84 ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn named(self, name: impl Into<String>) -> NamedCoordinate {
        NamedCoordinate {
            lat: self.lat,
            lng: self.lng,
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedCoordinate {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
}

impl NamedCoordinate {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate {
            lat: self.lat,
            lng: self.lng,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanKind {
    Bike,
    Trek,
}

impl PlanKind {
    pub fn profile(self) -> TravelProfile {
        match self {
            PlanKind::Bike => TravelProfile::Cycling,
            PlanKind::Trek => TravelProfile::Foot,
        }
    }
}

impl std::fmt::Display for PlanKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlanKind::Bike => f.write_str("bike"),
            PlanKind::Trek => f.write_str("trek"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelProfile {
    Cycling,
    Foot,
}

/// Numeric guidance produced by a plan seeder. Every field is optional and
/// consumers fall back to their own defaults when a value is missing or malformed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanHints {
    /// Bike: bearing for day 1 and day 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bearings_deg: Option<Vec<f64>>,
    /// Bike: target distance for day 1 and day 2.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day_distances_km: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_bearings_deg: Option<Vec<f64>>,
    /// Second spoke length relative to the first.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_skew: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSeed {
    pub location_query: String,
    pub kind: PlanKind,
    pub days: u32,
    #[serde(default)]
    pub anchors: Vec<Anchor>,
    #[serde(default)]
    pub hints: PlanHints,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Day {
    pub date_offset_days: u32,
    pub distance_km: f64,
    pub duration_min: u32,
    pub encoded_path: String,
    pub summary: String,
    pub start: NamedCoordinate,
    pub end: NamedCoordinate,
    /// Set when the loop search ran out of attempts and kept its closest result.
    #[serde(default)]
    pub approximate: bool,
    #[serde(default)]
    pub gpx_base64: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanRequest {
    pub kind: PlanKind,
    pub location_query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hints: Option<PlanHints>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchors: Option<Vec<Anchor>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanResponse {
    pub days: Vec<Day>,
    pub start: NamedCoordinate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteRequest {
    pub profile: TravelProfile,
    pub waypoints: Vec<Coordinate>,
    #[serde(default)]
    pub close_loop: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteResponse {
    pub encoded_path: String,
    pub distance_km: f64,
    pub duration_min: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}
