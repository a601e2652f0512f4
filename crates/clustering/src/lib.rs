//! Spatial clustering of flight takeoff locations.
//!
//! Groups are a pure function of the record list and a Web Mercator zoom
//! level, so any map front-end can render them without its own clustering
//! widget.

pub mod cluster;
pub mod mercator;

pub use cluster::{ClusterGroup, ClusterSet, SpatialClusterer, DEFAULT_RADIUS_PX};
pub use mercator::{WorldPixel, MAX_ZOOM, TILE_SIZE};
