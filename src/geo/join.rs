use serde_json::{Map, Value, json};
use tracing::debug;

use crate::aggregate::Aggregates;
use crate::columns::ColumnSelection;
use super::{BoundaryFeature, FeatureCollection};

/// Property holding the joined row count.
pub const COUNT_PROPERTY: &str = "count";
/// Property holding the joined rows (selected columns only).
pub const ROWS_PROPERTY: &str = "rows";

/// Inner-join boundaries with per-key aggregates.
///
/// Only features whose `key_property` names a key present in `aggregates` are kept, in boundary
/// file order. Each kept feature gains a `count` property and a `rows` array holding every row for
/// its key, restricted to `columns`.
pub fn join_aggregates(
    boundaries: &FeatureCollection,
    aggregates: &Aggregates,
    key_property: &str,
    columns: &ColumnSelection,
) -> FeatureCollection {
    let joined: FeatureCollection = boundaries.iter()
        .filter_map(|feature| {
            let key = feature.key(key_property)?;
            let aggregate = aggregates.get(&key)?;

            let selected = columns.resolve(aggregate.rows());
            let rows: Vec<Value> = aggregate.rows().iter()
                .map(|row| {
                    let object: Map<String, Value> = selected.iter()
                        .map(|&c| (c.to_string(), json!(row.get(c).unwrap_or_default())))
                        .collect();
                    Value::Object(object)
                })
                .collect();

            let mut feature = feature.clone();
            feature.set_property(COUNT_PROPERTY, aggregate.count());
            feature.set_property(ROWS_PROPERTY, rows);
            Some(feature)
        })
        .collect();

    debug!(
        "[geo::join] {} of {} boundaries matched {} keys",
        joined.len(), boundaries.len(), aggregates.len()
    );
    joined
}

/// Inner-join boundaries with the first row of each key, copying that row's fields straight onto
/// the feature's properties (existing properties with the same name are overwritten).
pub fn merge_first_row(
    boundaries: &FeatureCollection,
    aggregates: &Aggregates,
    key_property: &str,
) -> FeatureCollection {
    boundaries.iter()
        .filter_map(|feature| {
            let key = feature.key(key_property)?;
            let first = aggregates.get(&key)?.rows().first()?;
            let mut feature: BoundaryFeature = feature.clone();
            for (column, value) in first.iter() {
                feature.set_property(column, value);
            }
            Some(feature)
        })
        .collect()
}
