//! Pure domain types with minimal dependencies
//!
//! Geometry and the result shapes that cross the callback boundary.
//! Nothing here knows about platforms or surfaces.

pub mod detection;
pub mod geometry;

pub use detection::*;
pub use geometry::*;
