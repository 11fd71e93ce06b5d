//! Ratio-to-color mapping strategies.
//!
//! Mappers are total on [0.0, 1.0] and perform no bounds-checking of their
//! own: callers hand them ratios already clamped by a `RatioFn`.

/// Strategy for rendering a hotness ratio as a CSS color literal.
pub trait ColorMapper: Send + Sync {
    /// Unique identifier for this strategy.
    fn id(&self) -> &'static str;

    /// Map a pre-clamped ratio in [0, 1] to a color string.
    fn map(&self, ratio: f64) -> String;
}

/// Full-spectrum hue rotation: cold purple at 0.0 sweeping to red at 1.0.
///
/// The sweep starts at 270 degrees rather than the conventional 240: under
/// log normalization even the least-used key has a small non-zero ratio, and
/// the wider range keeps the cold end of the spectrum reachable.
pub struct RainbowColor;

impl ColorMapper for RainbowColor {
    fn id(&self) -> &'static str {
        "rainbow"
    }

    fn map(&self, ratio: f64) -> String {
        let hue = (270.0 * (1.0 - ratio)).round() as i64;
        format!("hsl({}, 100%, 50%)", hue)
    }
}

/// Two-tone red/green interpolation with fixed blue and alpha channels.
pub struct TwoToneColor;

impl ColorMapper for TwoToneColor {
    fn id(&self) -> &'static str {
        "two-tone"
    }

    fn map(&self, ratio: f64) -> String {
        let red = (255.0 * ratio).round() as i64;
        let green = (255.0 * (1.0 - ratio)).round() as i64;
        format!("rgba({},{},60,0.7)", red, green)
    }
}
