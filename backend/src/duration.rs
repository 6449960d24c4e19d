/// Average speeds a traveller can plausibly hold for a given mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedBand {
    pub min_kmh: f64,
    pub max_kmh: f64,
    pub default_kmh: f64,
}

impl SpeedBand {
    pub const BIKE: SpeedBand = SpeedBand {
        min_kmh: 10.0,
        max_kmh: 28.0,
        default_kmh: 16.0,
    };

    pub const TREK: SpeedBand = SpeedBand {
        min_kmh: 2.5,
        max_kmh: 6.5,
        default_kmh: 4.5,
    };

    pub fn contains(&self, speed_kmh: f64) -> bool {
        speed_kmh.is_finite() && speed_kmh >= self.min_kmh && speed_kmh <= self.max_kmh
    }
}

/// Replace a provider duration whose implied speed falls outside `band` with
/// one derived from the band's default speed. Result is in whole minutes.
pub fn sanitize_duration(band: SpeedBand, distance_km: f64, duration_min: f64) -> u32 {
    let speed_kmh = distance_km / (duration_min / 60.0).max(0.0001);
    let minutes = if band.contains(speed_kmh) {
        duration_min
    } else {
        tracing::debug!(
            "Replacing implausible duration {:.1} min for {:.2} km ({:.1} km/h)",
            duration_min,
            distance_km,
            speed_kmh
        );
        distance_km / band.default_kmh * 60.0
    };
    minutes.round().max(0.0) as u32
}
