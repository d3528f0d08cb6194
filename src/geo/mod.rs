mod feature;
mod join;

pub use feature::{BoundaryFeature, FeatureCollection};
pub use join::{COUNT_PROPERTY, ROWS_PROPERTY, join_aggregates, merge_first_row};
