use serde_json::Value;

use crate::aggregate::{Breakdown, KeyedAggregate};
use crate::columns::ColumnSelection;
use crate::geo::BoundaryFeature;
use super::html::HtmlWriter;

/// Renders the popup shown when a feature is clicked.
///
/// The popup has a summary (key and row count), then the per-key breakdown table if the
/// aggregate carries one, then one detail row per CSV record. Content is rebuilt on every call.
#[derive(Debug, Clone)]
pub struct PopupBuilder {
    key_label: String,
    columns: ColumnSelection,
    detail_table: bool,
    trusted_html: bool,
}

impl Default for PopupBuilder {
    fn default() -> Self {
        Self {
            key_label: "Zip Code".into(),
            columns: ColumnSelection::All,
            detail_table: true,
            trusted_html: false,
        }
    }
}

impl PopupBuilder {
    pub fn new(columns: ColumnSelection) -> Self {
        Self { columns, ..Self::default() }
    }

    /// Label shown before the key, e.g. "Zip Code" or "Community Area".
    pub fn key_label(mut self, label: impl Into<String>) -> Self {
        self.key_label = label.into();
        self
    }

    pub fn detail_table(mut self, enabled: bool) -> Self {
        self.detail_table = enabled;
        self
    }

    /// Embed CSV values without escaping. Only for inputs whose contents are trusted.
    pub fn trusted_html(mut self, trusted: bool) -> Self {
        self.trusted_html = trusted;
        self
    }

    pub fn columns(&self) -> &ColumnSelection { &self.columns }

    /// Popup for `key`; a key without rows gets a zero-count summary only.
    pub fn render(&self, key: &str, aggregate: Option<&KeyedAggregate>) -> String {
        let count = aggregate.map_or(0, KeyedAggregate::count);
        let mut html = HtmlWriter::new(self.trusted_html);

        html.raw("<div style=\"overflow:auto;\">");
        html.raw("<div><strong>").text(&self.key_label).raw(":</strong> ").text(key).raw("</div>");
        html.raw("<div><strong>Count:</strong> ").raw(&count.to_string()).raw("</div>");

        if let Some(aggregate) = aggregate {
            if let Some(breakdown) = aggregate.breakdown() {
                write_breakdown(&mut html, breakdown);
            }
            if self.detail_table {
                self.write_details(&mut html, aggregate);
            }
        }

        html.raw("</div>");
        html.into_string()
    }

    fn write_details(&self, html: &mut HtmlWriter, aggregate: &KeyedAggregate) {
        let columns = self.columns.resolve(aggregate.rows());
        if columns.is_empty() { return }

        html.raw("<table><thead>").table_row("th", columns.iter().copied()).raw("</thead><tbody>");
        for row in aggregate.rows() {
            html.table_row("td", columns.iter().map(|c| row.get(c).unwrap_or_default()));
        }
        html.raw("</tbody></table>");
    }
}

fn write_breakdown(html: &mut HtmlWriter, breakdown: &Breakdown) {
    if breakdown.entries.is_empty() { return }

    html.raw("<table class=\"breakdown\"><thead>")
        .table_row("th", [breakdown.column.as_str(), "count", "percentage"])
        .raw("</thead><tbody>");
    for entry in &breakdown.entries {
        let count = entry.count.to_string();
        let percentage = format!("{:.2}%", entry.percentage);
        html.table_row("td", [entry.value.as_str(), count.as_str(), percentage.as_str()]);
    }
    html.raw("</tbody></table>");
}

/// Popup listing every property of a feature as `key: value` paragraphs.
pub fn properties_popup(feature: &BoundaryFeature, trusted_html: bool) -> String {
    let mut html = HtmlWriter::new(trusted_html);
    for (key, value) in &feature.properties {
        let text = match value {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        };
        html.raw("<p><strong>").text(key).raw(": </strong>").text(&text).raw("</p>");
    }
    html.into_string()
}

#[cfg(test)]
mod tests {
    use serde_json::{Map, json};

    use super::*;
    use crate::aggregate::{Aggregator, BreakdownSpec};
    use crate::record::RowRecord;

    fn headers(html: &str) -> Vec<&str> {
        html.split("<th>").skip(1).filter_map(|s| s.split("</th>").next()).collect()
    }

    fn single(rows: Vec<RowRecord>) -> KeyedAggregate {
        Aggregator::new("k").aggregate(rows).iter().next().cloned().unwrap()
    }

    #[test]
    fn all_columns_follow_first_row() {
        let agg = single(vec![RowRecord::from_pairs([("k", "1"), ("x", "1"), ("y", "2")])]);
        let html = PopupBuilder::new(ColumnSelection::All).render("1", Some(&agg));
        assert_eq!(headers(&html), ["k", "x", "y"]);
    }

    #[test]
    fn explicit_columns_only() {
        let agg = single(vec![RowRecord::from_pairs([("k", "1"), ("x", "1"), ("y", "2")])]);
        let html = PopupBuilder::new(ColumnSelection::Explicit(vec!["x".into()])).render("1", Some(&agg));
        assert_eq!(headers(&html), ["x"]);
        assert!(html.contains("<td>1</td>"));
        assert!(!html.contains("<td>2</td>"));
    }

    #[test]
    fn summary_only_without_rows() {
        let html = PopupBuilder::default().render("60601", None);
        assert_eq!(
            html,
            "<div style=\"overflow:auto;\"><div><strong>Zip Code:</strong> 60601</div>\
             <div><strong>Count:</strong> 0</div></div>"
        );
    }

    #[test]
    fn detail_table_can_be_disabled() {
        let agg = single(vec![RowRecord::from_pairs([("k", "1"), ("x", "1")])]);
        let html = PopupBuilder::default().detail_table(false).render("1", Some(&agg));
        assert!(!html.contains("<table"));
        assert!(html.contains("<strong>Count:</strong> 1"));
    }

    #[test]
    fn breakdown_table_is_rendered() {
        let agg = Aggregator::new("k")
            .with_breakdown(Some(BreakdownSpec::new("cat")))
            .aggregate(vec![
                RowRecord::from_pairs([("k", "1"), ("cat", "A")]),
                RowRecord::from_pairs([("k", "1"), ("cat", "A")]),
                RowRecord::from_pairs([("k", "1"), ("cat", "B")]),
            ]);
        let html = PopupBuilder::default().detail_table(false).render("1", agg.get("1"));
        assert!(html.contains("<tr><th>cat</th><th>count</th><th>percentage</th></tr>"));
        assert!(html.contains("<tr><td>A</td><td>2</td><td>66.67%</td></tr>"));
        assert!(html.contains("<tr><td>B</td><td>1</td><td>33.33%</td></tr>"));
    }

    #[test]
    fn values_are_escaped_by_default() {
        let agg = single(vec![RowRecord::from_pairs([("k", "1"), ("note", "<img src=x onerror=alert(1)>")])]);
        let safe = PopupBuilder::default().render("1", Some(&agg));
        assert!(safe.contains("&lt;img src=x onerror=alert(1)&gt;"));
        assert!(!safe.contains("<img"));

        let raw = PopupBuilder::default().trusted_html(true).render("1", Some(&agg));
        assert!(raw.contains("<img src=x onerror=alert(1)>"));
    }

    #[test]
    fn custom_key_label() {
        let html = PopupBuilder::default().key_label("Community Area").render("Uptown", None);
        assert!(html.contains("<strong>Community Area:</strong> Uptown"));
    }

    #[test]
    fn properties_popup_lists_everything() {
        let mut properties = Map::new();
        properties.insert("ZCTA5CE20".into(), json!("60601"));
        properties.insert("count".into(), json!(3));
        let feature = BoundaryFeature::new(Value::Null, properties);
        assert_eq!(
            properties_popup(&feature, false),
            "<p><strong>ZCTA5CE20: </strong>60601</p><p><strong>count: </strong>3</p>"
        );
    }
}
