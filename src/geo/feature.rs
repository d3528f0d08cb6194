use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum FeatureTag {
    #[default]
    Feature,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// One boundary region (geometry + properties) from a GeoJSON file.
/// Geometry is carried through untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundaryFeature {
    #[serde(rename = "type")]
    tag: FeatureTag,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(default)]
    pub geometry: Value,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub properties: Map<String, Value>,
}

impl BoundaryFeature {
    pub fn new(geometry: Value, properties: Map<String, Value>) -> Self {
        Self { tag: FeatureTag::Feature, id: None, geometry, properties }
    }

    /// The join key stored under `property`, as text.
    /// Numeric keys are rendered in decimal; any other value type has no key.
    pub fn key(&self, property: &str) -> Option<String> {
        match self.properties.get(property)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn set_property(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }
}

/// An ordered GeoJSON FeatureCollection of boundaries.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    tag: CollectionTag,
    pub features: Vec<BoundaryFeature>,
}

impl FeatureCollection {
    pub fn len(&self) -> usize { self.features.len() }

    pub fn is_empty(&self) -> bool { self.features.is_empty() }

    pub fn iter(&self) -> std::slice::Iter<'_, BoundaryFeature> { self.features.iter() }
}

impl FromIterator<BoundaryFeature> for FeatureCollection {
    fn from_iter<I: IntoIterator<Item = BoundaryFeature>>(iter: I) -> Self {
        Self { tag: CollectionTag::FeatureCollection, features: iter.into_iter().collect() }
    }
}

impl<'a> IntoIterator for &'a FeatureCollection {
    type Item = &'a BoundaryFeature;
    type IntoIter = std::slice::Iter<'a, BoundaryFeature>;

    fn into_iter(self) -> Self::IntoIter { self.features.iter() }
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Map<String, Value>, D::Error> {
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}
