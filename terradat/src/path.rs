//! Path sampling between two endpoints.
//!
//! Sampling a flight path into discrete coordinates is the job of the
//! surrounding system; the query service only consumes the sampled
//! sequence. [`PathSampler`] is that boundary, and [`FixedStepSampler`]
//! is the default implementation used when no external sampler is wired in.

use crate::geodesy::{
    distance_m, longitude_scale, offset_latlon, wrap_longitude, Coordinate, DEG_E7_PER_METER,
};

/// A sampled path: the coordinate sequence plus its distances.
#[derive(Debug, Clone, PartialEq)]
pub struct PathSample {
    /// Sampled coordinates from start to end inclusive, in path order.
    pub coordinates: Vec<Coordinate>,
    /// Great-circle length of the whole path in meters.
    pub total_distance: f64,
    /// Distance in meters from the last intermediate sample to the end
    /// point.
    pub final_segment_distance: f64,
}

/// Converts a `(from, to)` pair into the coordinate sequence to query.
pub trait PathSampler {
    /// Sample the path between two coordinates.
    fn path_to_coords(&self, from: Coordinate, to: Coordinate) -> PathSample;
}

/// Samples a path at a fixed step length along the great circle.
///
/// Both endpoints are always included. Intermediate samples are placed
/// every `step_m` meters by offsetting the start point north/east, so the
/// samples follow the same fixed-point arithmetic as block indexing.
#[derive(Debug, Clone, Copy)]
pub struct FixedStepSampler {
    step_m: f64,
}

impl FixedStepSampler {
    /// Create a sampler with the given step length in meters (minimum 1 m).
    pub fn new(step_m: f64) -> Self {
        Self {
            step_m: step_m.max(1.0),
        }
    }

    /// The configured step length in meters.
    pub fn step_m(&self) -> f64 {
        self.step_m
    }
}

impl PathSampler for FixedStepSampler {
    fn path_to_coords(&self, from: Coordinate, to: Coordinate) -> PathSample {
        let total = distance_m(from, to);
        if total == 0.0 {
            return PathSample {
                coordinates: vec![from],
                total_distance: 0.0,
                final_segment_distance: 0.0,
            };
        }

        // full-path offsets in meters, derived from the fixed-point deltas
        let dlat_e7 = i64::from(to.lat_e7()) - i64::from(from.lat_e7());
        let dlon_e7 = wrap_longitude(i64::from(to.lon_e7()) - i64::from(from.lon_e7()));
        let mid_lat = ((i64::from(from.lat_e7()) + i64::from(to.lat_e7())) / 2) as i32;
        let north = dlat_e7 as f64 / DEG_E7_PER_METER;
        let east = f64::from(dlon_e7) * longitude_scale(mid_lat) / DEG_E7_PER_METER;

        let steps = (total / self.step_m) as usize;
        let mut coordinates = Vec::with_capacity(steps + 2);
        coordinates.push(from);
        for i in 1..=steps {
            let fraction = i as f64 * self.step_m / total;
            if fraction >= 1.0 {
                break;
            }
            coordinates.push(offset_latlon(from, north * fraction, east * fraction));
        }
        coordinates.push(to);

        let intermediate = (coordinates.len() - 2) as f64;
        PathSample {
            coordinates,
            total_distance: total,
            final_segment_distance: total - intermediate * self.step_m,
        }
    }
}
