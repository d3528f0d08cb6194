mod classifier;
mod color;

pub use classifier::{Bucket, BucketTable, Classifier, GREEN_BREAKS, GREEN_PALETTE, StyleDescriptor};
pub use color::{Rgb, Rgba};
