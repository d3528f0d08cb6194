mod breakdown;
mod keyed;

pub use breakdown::{Breakdown, BreakdownEntry, BreakdownSpec, NOT_PROVIDED};
pub use keyed::{Aggregates, Aggregator, KeyedAggregate};
