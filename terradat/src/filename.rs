//! Tile filename utilities.
//!
//! Tile files follow the naming convention `{N|S}{lat}{E|W}{lon}.DAT`:
//! two latitude digits and three longitude digits, zero padded. The digits
//! come from the coordinate truncated toward zero, and the hemisphere
//! letters from the sign of the original coordinate, so `(-33.9, -18.4)`
//! maps to `S33W018.DAT`.

use crate::geodesy::Coordinate;

/// Derive the tile filename covering the given coordinate.
///
/// # Examples
///
/// ```
/// use terradat::{tile_filename, Coordinate};
///
/// assert_eq!(tile_filename(Coordinate::new(47.3, 8.5)), "N47E008.DAT");
/// assert_eq!(tile_filename(Coordinate::new(-33.9, -18.4)), "S33W018.DAT");
/// ```
pub fn tile_filename(coordinate: Coordinate) -> String {
    format!(
        "{}{:02}{}{:03}.DAT",
        if coordinate.lat < 0.0 { 'S' } else { 'N' },
        coordinate.lat.abs() as i32,
        if coordinate.lon < 0.0 { 'W' } else { 'E' },
        coordinate.lon.abs() as i32,
    )
}

/// Parse a tile filename back into its reference latitude and longitude.
///
/// Accepts a bare name or a path, with or without the `.DAT` extension.
/// Returns `None` if the name does not match the tile grammar.
pub fn filename_to_reference(filename: &str) -> Option<(i32, i32)> {
    let name = filename
        .rsplit('/')
        .next()
        .unwrap_or(filename)
        .rsplit('\\')
        .next()
        .unwrap_or(filename);

    let name = name
        .strip_suffix(".DAT")
        .or_else(|| name.strip_suffix(".dat"))
        .unwrap_or(name);

    // Must be exactly 7 characters: N00E000
    if name.len() != 7 {
        return None;
    }

    let chars: Vec<char> = name.chars().collect();

    let lat_sign = match chars[0] {
        'N' | 'n' => 1,
        'S' | 's' => -1,
        _ => return None,
    };
    let lat: i32 = name[1..3].parse().ok()?;

    let lon_sign = match chars[3] {
        'E' | 'e' => 1,
        'W' | 'w' => -1,
        _ => return None,
    };
    let lon: i32 = name[4..7].parse().ok()?;

    Some((lat * lat_sign, lon * lon_sign))
}
