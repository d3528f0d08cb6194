use ahash::AHashMap;
use tracing::debug;

use crate::record::{RowRecord, ZIPCODE};
use super::breakdown::{Breakdown, BreakdownSpec};

/// All rows that share one key, in CSV order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedAggregate {
    key: String,
    rows: Vec<RowRecord>,
    breakdown: Option<Breakdown>,
}

impl KeyedAggregate {
    fn new(key: String) -> Self {
        Self { key, rows: Vec::new(), breakdown: None }
    }

    pub fn key(&self) -> &str { &self.key }

    /// Number of rows for this key; always `rows().len()`.
    pub fn count(&self) -> usize { self.rows.len() }

    pub fn rows(&self) -> &[RowRecord] { &self.rows }

    pub fn breakdown(&self) -> Option<&Breakdown> { self.breakdown.as_ref() }
}

/// Per-key aggregates of one CSV file, in first-seen key order.
#[derive(Debug, Clone, Default)]
pub struct Aggregates {
    index: AHashMap<String, usize>,
    entries: Vec<KeyedAggregate>,
    dropped: usize,
}

impl Aggregates {
    pub fn get(&self, key: &str) -> Option<&KeyedAggregate> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, key: &str) -> bool { self.index.contains_key(key) }

    /// Row count for `key`, zero if absent.
    pub fn count(&self, key: &str) -> usize {
        self.get(key).map_or(0, KeyedAggregate::count)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(KeyedAggregate::key)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeyedAggregate> { self.entries.iter() }

    /// Number of distinct keys.
    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }

    /// Sum of all per-key counts.
    pub fn total(&self) -> usize { self.entries.iter().map(KeyedAggregate::count).sum() }

    /// Rows excluded because their key was missing or empty.
    pub fn dropped(&self) -> usize { self.dropped }
}

/// Groups rows by a key column, optionally with a categorical breakdown per key.
#[derive(Debug, Clone)]
pub struct Aggregator {
    key_field: String,
    breakdown: Option<BreakdownSpec>,
}

impl Default for Aggregator {
    fn default() -> Self {
        Self { key_field: ZIPCODE.to_string(), breakdown: None }
    }
}

impl Aggregator {
    pub fn new(key_field: impl Into<String>) -> Self {
        Self { key_field: key_field.into(), breakdown: None }
    }

    pub fn with_breakdown(mut self, spec: Option<BreakdownSpec>) -> Self {
        self.breakdown = spec;
        self
    }

    pub fn key_field(&self) -> &str { &self.key_field }

    pub fn aggregate(&self, rows: impl IntoIterator<Item = RowRecord>) -> Aggregates {
        let mut out = Aggregates::default();
        for row in rows {
            let key = match row.get(&self.key_field) {
                Some(key) if !key.is_empty() => key.to_string(),
                _ => { out.dropped += 1; continue }
            };
            let i = match out.index.get(&key) {
                Some(&i) => i,
                None => {
                    out.index.insert(key.clone(), out.entries.len());
                    out.entries.push(KeyedAggregate::new(key));
                    out.entries.len() - 1
                }
            };
            out.entries[i].rows.push(row);
        }

        if let Some(spec) = &self.breakdown {
            for entry in &mut out.entries {
                entry.breakdown = Some(Breakdown::compute(spec, &entry.rows));
            }
        }

        debug!(
            "[aggregate] {} rows under {} keys ({} without {})",
            out.total(), out.len(), out.dropped, self.key_field
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(zip: &str, cat: &str) -> RowRecord {
        RowRecord::from_pairs([("zipcode", zip), ("cat", cat)])
    }

    #[test]
    fn groups_rows_in_csv_order() {
        let agg = Aggregator::default().aggregate(vec![
            row("60601", "a"), row("60602", "b"), row("60601", "c"),
        ]);
        assert_eq!(agg.len(), 2);
        assert_eq!(agg.keys().collect::<Vec<_>>(), ["60601", "60602"]);
        let first = agg.get("60601").unwrap();
        assert_eq!(first.count(), 2);
        assert_eq!(first.rows().iter().map(|r| r.get("cat").unwrap()).collect::<Vec<_>>(), ["a", "c"]);
    }

    #[test]
    fn empty_and_missing_keys_are_dropped() {
        let agg = Aggregator::default().aggregate(vec![
            row("60601", "a"),
            row("", "b"),
            RowRecord::from_pairs([("cat", "c")]),
        ]);
        assert_eq!(agg.total(), 1);
        assert_eq!(agg.dropped(), 2);
        assert!(!agg.contains(""));
    }

    #[test]
    fn keys_are_case_sensitive_and_unnormalized() {
        let agg = Aggregator::new("area").aggregate(vec![
            RowRecord::from_pairs([("area", "Loop")]),
            RowRecord::from_pairs([("area", "loop")]),
            RowRecord::from_pairs([("area", "Loop ")]),
        ]);
        assert_eq!(agg.len(), 3);
        assert_eq!(agg.count("Loop"), 1);
        assert_eq!(agg.count("Uptown"), 0);
    }

    #[test]
    fn sum_of_counts_matches_keyed_rows() {
        let zips = ["60601", "", "60602", "60601", "60603", "", "60602", "60601"];
        let rows: Vec<_> = zips.iter().map(|z| row(z, "x")).collect();
        let agg = Aggregator::default().aggregate(rows);
        let keyed = zips.iter().filter(|z| !z.is_empty()).count();
        assert_eq!(agg.iter().map(KeyedAggregate::count).sum::<usize>(), keyed);
        assert_eq!(agg.total() + agg.dropped(), zips.len());
    }

    #[test]
    fn breakdown_is_computed_per_key() {
        let agg = Aggregator::default()
            .with_breakdown(Some(BreakdownSpec::new("cat")))
            .aggregate(vec![row("60601", "A"), row("60601", "A"), row("60601", "B"), row("60602", "C")]);
        let b = agg.get("60601").unwrap().breakdown().unwrap();
        assert_eq!(b.get("A").unwrap().percentage, 66.67);
        assert_eq!(b.get("B").unwrap().percentage, 33.33);
        assert_eq!(agg.get("60602").unwrap().breakdown().unwrap().entries.len(), 1);
    }
}
