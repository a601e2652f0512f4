//! Zoom-dependent grouping of flight records.
//!
//! Records are visited in input order. Each located record joins the group
//! whose seed (first member) is nearest in pixel space at the requested zoom,
//! provided it lies within the clustering radius; otherwise it seeds a new
//! group. Equal distances resolve to the group created first.

use flight_protocol::{Coordinate, FlightRecord};
use serde::Serialize;

use crate::mercator::{WorldPixel, MAX_ZOOM};

/// Default merge radius in screen pixels.
pub const DEFAULT_RADIUS_PX: f64 = 80.0;

/// A set of nearby flights drawn as one marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterGroup {
    /// Centroid of the members' takeoff positions.
    pub anchor: Coordinate,
    /// Members in input order.
    pub members: Vec<FlightRecord>,
    pub count: usize,
}

/// Clustering output for one (records, zoom) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSet {
    /// Groups in creation order.
    pub groups: Vec<ClusterGroup>,
    /// Records that could not be placed for lack of coordinates.
    pub unlocated: usize,
    /// Zoom the groups were computed for, after clamping.
    pub zoom: u32,
}

impl ClusterSet {
    /// Number of records placed on the map.
    pub fn located(&self) -> usize {
        self.groups.iter().map(|g| g.count).sum()
    }
}

/// Stateless clusterer with a fixed pixel radius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialClusterer {
    radius_px: f64,
}

impl Default for SpatialClusterer {
    fn default() -> Self {
        Self::new(DEFAULT_RADIUS_PX)
    }
}

struct Pending<'a> {
    seed: WorldPixel,
    members: Vec<&'a FlightRecord>,
    lat_sum: f64,
    lon_sum: f64,
}

impl SpatialClusterer {
    pub fn new(radius_px: f64) -> Self {
        Self {
            radius_px: radius_px.max(0.0),
        }
    }

    pub fn radius_px(&self) -> f64 {
        self.radius_px
    }

    /// Group `records` for display at `zoom`.
    ///
    /// Zoom levels above [`MAX_ZOOM`] are clamped.
    pub fn cluster(&self, records: &[FlightRecord], zoom: u32) -> ClusterSet {
        let zoom = zoom.min(MAX_ZOOM);
        let radius_sq = self.radius_px * self.radius_px;

        let mut pending: Vec<Pending<'_>> = Vec::new();
        let mut unlocated = 0;

        for record in records {
            let Some(position) = record.takeoff_position() else {
                unlocated += 1;
                continue;
            };

            let pixel = WorldPixel::from_latlon(position.lat, position.lon, zoom);

            // Strict comparison keeps the earliest group on ties.
            let mut nearest: Option<(usize, f64)> = None;
            for (idx, group) in pending.iter().enumerate() {
                let d = group.seed.distance_squared(&pixel);
                if d <= radius_sq && nearest.map_or(true, |(_, best)| d < best) {
                    nearest = Some((idx, d));
                }
            }

            match nearest {
                Some((idx, _)) => {
                    let group = &mut pending[idx];
                    group.members.push(record);
                    group.lat_sum += position.lat;
                    group.lon_sum += position.lon;
                }
                None => pending.push(Pending {
                    seed: pixel,
                    members: vec![record],
                    lat_sum: position.lat,
                    lon_sum: position.lon,
                }),
            }
        }

        let groups = pending
            .into_iter()
            .map(|group| {
                let count = group.members.len();
                ClusterGroup {
                    anchor: Coordinate::new(
                        group.lat_sum / count as f64,
                        group.lon_sum / count as f64,
                    ),
                    members: group.members.into_iter().cloned().collect(),
                    count,
                }
            })
            .collect();

        ClusterSet {
            groups,
            unlocated,
            zoom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, coords: Option<(f64, f64)>) -> FlightRecord {
        let mut json = serde_json::json!({
            "id": id,
            "takeoffTime": "2024-01-05T14:00:00Z",
        });
        if let Some((lat, lon)) = coords {
            json["takeoffLatitude"] = lat.into();
            json["takeoffLongitude"] = lon.into();
        }
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn test_empty_input() {
        let set = SpatialClusterer::default().cluster(&[], 11);
        assert!(set.groups.is_empty());
        assert_eq!(set.unlocated, 0);
    }

    #[test]
    fn test_unlocated_records_are_counted_not_grouped() {
        let records = vec![
            record("a", Some((35.0, -97.0))),
            record("b", None),
            record("c", None),
        ];
        let set = SpatialClusterer::default().cluster(&records, 11);

        assert_eq!(set.groups.len(), 1);
        assert_eq!(set.located(), 1);
        assert_eq!(set.unlocated, 2);
    }

    #[test]
    fn test_tie_goes_to_earliest_group() {
        // At zoom 0 these sit at x = 96, 160 and 128 px on the equator: the
        // third point is exactly 32 px from both seeds.
        let a = record("a", Some((0.0, -45.0)));
        let b = record("b", Some((0.0, 45.0)));
        let c = record("c", Some((0.0, 0.0)));
        let clusterer = SpatialClusterer::new(40.0);

        let set = clusterer.cluster(&[a.clone(), b.clone(), c.clone()], 0);
        assert_eq!(set.groups.len(), 2);
        assert_eq!(set.groups[0].members, vec![a.clone(), c.clone()]);
        assert_eq!(set.groups[1].members, vec![b.clone()]);

        let set = clusterer.cluster(&[b.clone(), a.clone(), c.clone()], 0);
        assert_eq!(set.groups[0].members, vec![b, c]);
        assert_eq!(set.groups[1].members, vec![a]);
    }

    #[test]
    fn test_anchor_is_centroid() {
        let records = vec![
            record("a", Some((0.0, -45.0))),
            record("c", Some((0.0, 0.0))),
        ];
        let set = SpatialClusterer::new(40.0).cluster(&records, 0);

        assert_eq!(set.groups.len(), 1);
        assert_eq!(set.groups[0].count, 2);
        assert_eq!(set.groups[0].anchor, Coordinate::new(0.0, -22.5));
    }

    #[test]
    fn test_zoom_is_clamped() {
        let records = vec![record("a", Some((35.0, -97.0)))];
        let set = SpatialClusterer::default().cluster(&records, 99);
        assert_eq!(set.zoom, MAX_ZOOM);
    }

    #[test]
    fn test_zero_radius_only_merges_identical_positions() {
        let records = vec![
            record("a", Some((35.0, -97.0))),
            record("b", Some((35.0, -97.0))),
            record("c", Some((35.0001, -97.0))),
        ];
        let set = SpatialClusterer::new(0.0).cluster(&records, 18);
        assert_eq!(set.groups.len(), 2);
        assert_eq!(set.groups[0].count, 2);
    }
}
