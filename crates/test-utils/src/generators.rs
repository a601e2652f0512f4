//! Deterministic flight generators.

use serde_json::Value;

use crate::fixtures::flight_json;

/// `count` flights laid out on a square grid around `center`.
///
/// Ids are `gen-0`, `gen-1`, ... in row-major order and `spacing_deg` is the
/// distance between neighbours in both axes.
///
/// # Example
///
/// ```
/// use test_utils::grid_flights;
///
/// let flights = grid_flights(9, (35.0, -97.0), 0.01);
/// assert_eq!(flights.len(), 9);
/// assert_eq!(flights[0]["flight_id"], "gen-0");
/// ```
pub fn grid_flights(count: usize, center: (f64, f64), spacing_deg: f64) -> Vec<Value> {
    let side = (count as f64).sqrt().ceil().max(1.0) as usize;
    let offset = (side as f64 - 1.0) / 2.0;

    (0..count)
        .map(|i| {
            let row = (i / side) as f64;
            let col = (i % side) as f64;
            flight_json(
                &format!("gen-{}", i),
                center.0 + (row - offset) * spacing_deg,
                center.1 + (col - offset) * spacing_deg,
            )
        })
        .collect()
}

/// A full provider page of flights spread over a metro-sized area.
pub fn full_page(page_size: usize, center: (f64, f64)) -> Vec<Value> {
    grid_flights(page_size, center, 0.005)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grid_is_centered() {
        let flights = grid_flights(9, (35.0, -97.0), 0.1);
        let middle = &flights[4];
        assert_eq!(middle["takeoff_latitude"], 35.0);
        assert_eq!(middle["takeoff_longitude"], -97.0);
    }

    #[test]
    fn test_ids_are_unique() {
        let flights = full_page(500, (35.0, -97.0));
        let mut ids: Vec<_> = flights.iter().map(|f| f["flight_id"].to_string()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 500);
    }
}
