use serde::Serialize;

use super::color::Rgb;

/// Visual attributes for one feature, named the way web map libraries expect them.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleDescriptor {
    pub stroke: bool,
    pub color: String,
    pub weight: f64,
    pub opacity: f64,
    pub fill_color: String,
    pub fill_opacity: f64,
}

impl StyleDescriptor {
    /// Draws nothing; used for counts below the first bucket.
    pub fn hidden() -> Self {
        Self {
            stroke: false,
            color: "transparent".into(),
            weight: 0.0,
            opacity: 0.0,
            fill_color: "transparent".into(),
            fill_opacity: 0.0,
        }
    }

    /// Style of the plain records layer: unstroked green fill.
    pub fn records() -> Self {
        Self {
            stroke: false,
            color: "green".into(),
            weight: 0.0,
            opacity: 1.0,
            fill_color: "green".into(),
            fill_opacity: 0.9,
        }
    }

    pub fn is_hidden(&self) -> bool {
        !self.stroke && self.opacity == 0.0 && self.fill_opacity == 0.0
    }
}

/// A closed count range `[lo, hi]` with its style.
#[derive(Clone, Debug, PartialEq)]
pub struct Bucket {
    pub lo: f64,
    pub hi: f64,
    pub style: StyleDescriptor,
}

impl Bucket {
    pub fn contains(&self, count: f64) -> bool { self.lo <= count && count <= self.hi }

    /// Human-readable range, e.g. "1.78117 – 3.498728" or "50+".
    pub fn label(&self) -> String {
        if self.hi.is_infinite() { format!("{}+", self.lo) } else { format!("{} – {}", self.lo, self.hi) }
    }
}

/// Upper edges of the sequential green ramp; the first bucket starts at 1.
pub const GREEN_BREAKS: [f64; 8] = [
    1.78117, 3.498728, 9.160305, 15.298982, 19.497455, 28.816794, 50.0, f64::INFINITY,
];

/// Light-to-dark sequential green palette, one color per bucket.
pub const GREEN_PALETTE: [Rgb; 8] = [
    Rgb::new(0xf7, 0xfc, 0xf5),
    Rgb::new(0xe5, 0xf5, 0xe0),
    Rgb::new(0xc7, 0xe9, 0xc0),
    Rgb::new(0xa1, 0xd9, 0x9b),
    Rgb::new(0x74, 0xc4, 0x76),
    Rgb::new(0x41, 0xab, 0x5d),
    Rgb::new(0x23, 0x8b, 0x45),
    Rgb::new(0x00, 0x5a, 0x32),
];

const BUCKET_STROKE: Rgb = Rgb::new(0x23, 0x23, 0x23);

/// Ordered, non-overlapping buckets. Adjacent buckets share edges; a count on an edge belongs
/// to the lower bucket.
#[derive(Clone, Debug, PartialEq)]
pub struct BucketTable {
    buckets: Vec<Bucket>,
}

impl BucketTable {
    pub fn new(buckets: Vec<Bucket>) -> Self { Self { buckets } }

    /// The fixed 8-bucket green ramp.
    pub fn green_ramp() -> Self {
        let mut lo = 1.0;
        let buckets = GREEN_BREAKS.iter().zip(GREEN_PALETTE)
            .map(|(&hi, fill)| {
                let bucket = Bucket {
                    lo,
                    hi,
                    style: StyleDescriptor {
                        stroke: true,
                        color: BUCKET_STROKE.hex(),
                        weight: 0.8,
                        opacity: 1.0,
                        fill_color: fill.hex(),
                        fill_opacity: 0.65,
                    },
                };
                lo = hi;
                bucket
            })
            .collect();
        Self { buckets }
    }

    pub fn buckets(&self) -> &[Bucket] { &self.buckets }

    /// Index of the first bucket containing `count`. Counts past the last edge land in the
    /// last bucket; counts below the first edge (and NaN) have no bucket.
    pub fn index_of(&self, count: f64) -> Option<usize> {
        if let Some(i) = self.buckets.iter().position(|b| b.contains(count)) {
            return Some(i);
        }
        let last = self.buckets.len().checked_sub(1)?;
        (count > self.buckets[last].hi).then_some(last)
    }
}

/// Maps a per-feature count to a style. Built once per layer.
#[derive(Clone, Debug, PartialEq)]
pub enum Classifier {
    /// Base color with alpha `count / divisor`.
    Continuous { base: Rgb, divisor: f64 },
    /// First-match-wins bucket lookup.
    Discrete(BucketTable),
    /// Same style for every feature.
    Fixed(StyleDescriptor),
}

impl Classifier {
    pub fn continuous(base: Rgb, divisor: f64) -> Self { Self::Continuous { base, divisor } }

    pub fn green_ramp() -> Self { Self::Discrete(BucketTable::green_ramp()) }

    /// Style for `count`. Total over `[0, ∞)` and deterministic.
    pub fn classify(&self, count: f64) -> StyleDescriptor {
        match self {
            Self::Continuous { base, divisor } => {
                let color = base.with_alpha(count / divisor).to_string();
                StyleDescriptor {
                    stroke: true,
                    color: color.clone(),
                    weight: 1.0,
                    opacity: 1.0,
                    fill_color: color,
                    fill_opacity: 0.9,
                }
            }
            Self::Discrete(table) => table.index_of(count)
                .map(|i| table.buckets[i].style.clone())
                .unwrap_or_else(StyleDescriptor::hidden),
            Self::Fixed(style) => style.clone(),
        }
    }

    /// `(range label, fill color)` per bucket; empty for non-discrete classifiers.
    pub fn legend(&self) -> Vec<(String, String)> {
        match self {
            Self::Discrete(table) => table.buckets.iter()
                .map(|b| (b.label(), b.style.fill_color.clone()))
                .collect(),
            _ => Vec::new(),
        }
    }
}
