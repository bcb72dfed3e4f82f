//! Grid cells: opaque keys into the OD matrix.
//!
//! A grid id encodes a 1 km UTM cell as
//! `2*10^13 + (easting/1000)*10^7 + northing/1000`. The encoding only
//! matters for mid-trip location approximation; everywhere else the id is an
//! opaque key. Not every encodable cell has OD-matrix entries.

use serde::{Deserialize, Serialize};

const ID_BASE: i64 = 20_000_000_000_000;
const EASTING_MULTIPLIER: i64 = 10_000_000;

/// Opaque key into the OD matrix and station/incident tables.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default,
)]
pub struct GridId(pub i64);

impl GridId {
    /// Encode a UTM position (meters) into its 1 km cell id.
    pub fn from_utm(easting: i64, northing: i64) -> Self {
        GridId(ID_BASE + (easting / 1000) * EASTING_MULTIPLIER + northing / 1000)
    }

    /// Decode the cell's south-west corner in UTM kilometers.
    pub fn to_utm_km(self) -> (i64, i64) {
        let raw = self.0 - ID_BASE;
        (raw / EASTING_MULTIPLIER, raw % EASTING_MULTIPLIER)
    }
}

/// Approximate where a vehicle is along a straight-line trip from `origin` to
/// `target`, `elapsed` seconds after departure on a leg expected to take
/// `total` seconds. The interpolated point snaps to its 1 km cell; the
/// returned cell is not guaranteed to exist in the OD matrix.
pub fn approximate_location(origin: GridId, target: GridId, elapsed: i64, total: i64) -> GridId {
    if total <= 0 || elapsed >= total {
        return target;
    }
    if elapsed <= 0 {
        return origin;
    }
    let (ox, oy) = origin.to_utm_km();
    let (tx, ty) = target.to_utm_km();
    let fraction = elapsed as f64 / total as f64;
    let x = ox as f64 + (tx - ox) as f64 * fraction;
    let y = oy as f64 + (ty - oy) as f64 * fraction;
    GridId(ID_BASE + (x.round() as i64) * EASTING_MULTIPLIER + y.round() as i64)
}
