//! Heatmap rendering engine.
//!
//! Pure transformation from raw per-key counts to display-ready records:
//!
//! - `normalize` - Count-to-ratio strategies (`Normalizer` trait)
//! - `color` - Ratio-to-color strategies (`ColorMapper` trait)
//! - `snapshot` - Combines both into one batch of display records
//!
//! Strategies are chosen once at startup; the ratio closure itself is rebuilt
//! from the live batch on every publish tick so its scaling statistic never
//! goes stale.

pub mod color;
pub mod normalize;
pub mod snapshot;

pub use color::{ColorMapper, RainbowColor, TwoToneColor};
pub use normalize::{LogNormalizer, Normalizer, PercentileClip, RatioFn};
pub use snapshot::{build_snapshot, HeatCell};
