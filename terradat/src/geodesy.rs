//! Fixed-point coordinate arithmetic.
//!
//! Index math runs on latitude/longitude scaled to integer degrees times
//! 10^7 so repeated offsets cannot accumulate floating-point drift. The
//! conversions here mirror the fixed-point conventions of block-oriented
//! terrain stores: latitudes mirror across the poles rather than clamping,
//! and longitudes wrap into [-180, 180] degrees.

/// Degrees×10^7 of latitude per meter travelled north.
///
/// Inverse of the ~0.01113 m per 10^-7 degree scaling factor.
pub const DEG_E7_PER_METER: f64 = 89.832_049_533_689_22;

/// Mean Earth radius in meters, used for great-circle distances.
const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;

/// A geographic position in decimal degrees (WGS84).
///
/// Stored as floating-point degrees; all index arithmetic converts to the
/// fixed-point degrees×10^7 representation via [`Coordinate::lat_e7`] and
/// [`Coordinate::lon_e7`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    /// Latitude in decimal degrees, positive north.
    pub lat: f64,
    /// Longitude in decimal degrees, positive east.
    pub lon: f64,
}

impl Coordinate {
    /// Create a coordinate from decimal degrees.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Latitude as fixed-point degrees×10^7, truncated toward zero.
    pub fn lat_e7(&self) -> i32 {
        (self.lat * 1e7) as i32
    }

    /// Longitude as fixed-point degrees×10^7, truncated toward zero.
    pub fn lon_e7(&self) -> i32 {
        (self.lon * 1e7) as i32
    }

    /// Build a coordinate back from fixed-point degrees×10^7.
    pub fn from_e7(lat_e7: i32, lon_e7: i32) -> Self {
        Self {
            lat: f64::from(lat_e7) / 1e7,
            lon: f64::from(lon_e7) / 1e7,
        }
    }
}

/// Cosine of the latitude, floored at 0.01.
///
/// Used as the divisor that shrinks a meters-east offset into degrees of
/// longitude; the floor keeps near-pole divisions bounded.
pub fn longitude_scale(lat_e7: i32) -> f64 {
    let scale = (f64::from(lat_e7) * 1e-7).to_radians().cos();
    scale.max(0.01)
}

/// Limit a fixed-point latitude to [-90e7, 90e7] by mirroring across the pole.
///
/// Continuing past a pole comes back down the far side, so an input just
/// over +90 degrees reflects to just under it.
pub fn limit_latitude(lat_e7: i32) -> i32 {
    if lat_e7 > 900_000_000 {
        (1_800_000_000i64 - i64::from(lat_e7)) as i32
    } else if lat_e7 < -900_000_000 {
        (-(1_800_000_000i64 + i64::from(lat_e7))) as i32
    } else {
        lat_e7
    }
}

/// Wrap a fixed-point longitude into [-180e7, 180e7].
///
/// Takes a 64-bit value: the sum that produces an out-of-range longitude
/// can itself overflow 32 bits before wrapping.
pub fn wrap_longitude(lon_e7: i64) -> i32 {
    if lon_e7 > 1_800_000_000 {
        (lon_e7 - 3_600_000_000i64) as i32
    } else if lon_e7 < -1_800_000_000 {
        (lon_e7 + 3_600_000_000i64) as i32
    } else {
        lon_e7 as i32
    }
}

/// Extrapolate a coordinate by distances in meters north and east.
///
/// The longitude scale is sampled at the midpoint of the latitude change to
/// reduce error over the offset span. The result is pole-mirrored and
/// longitude-wrapped.
pub fn offset_latlon(coordinate: Coordinate, meters_north: f64, meters_east: f64) -> Coordinate {
    let lat = coordinate.lat_e7();
    let lon = coordinate.lon_e7();

    let dlat = (meters_north * DEG_E7_PER_METER) as i32;
    let dlon = ((meters_east * DEG_E7_PER_METER) / longitude_scale(lat + dlat / 2)) as i64;

    Coordinate::from_e7(
        limit_latitude(lat + dlat),
        wrap_longitude(dlon + i64::from(lon)),
    )
}

/// Great-circle distance in meters between two coordinates.
///
/// Haversine over the mean Earth radius; accurate to well under the grid
/// spacing across a one-degree tile.
pub fn distance_m(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let dlat = (b.lat - a.lat).to_radians();
    let dlon = (b.lon - a.lon).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    2.0 * MEAN_EARTH_RADIUS * h.sqrt().asin()
}
