//! Live keyboard usage heatmap viewer.
//!
//! An external capture daemon maintains a per-key press counter table in
//! SQLite. This crate polls that table on a fixed interval, renders the
//! counts into display colors, and pushes the result to connected browser
//! clients over Server-Sent Events.
//!
//! ## Architecture
//!
//! The viewer consists of three main components:
//!
//! 1. **Counter store** (`store` module) - Read-only access to the counter
//!    table. The capture daemon owns all writes; this crate only polls.
//!
//! 2. **Heatmap engine** (`heatmap` module) - Pure transformation from raw
//!    counts to display records: per-batch normalization into [0, 1] ratios
//!    and ratio-to-color mapping, each behind an interchangeable strategy
//!    trait selected once at startup.
//!
//! 3. **Viewer server** (`viewer` module) - HTTP server with an SSE endpoint
//!    that runs one publish loop per connected client.
//!
//! ## Usage
//!
//! ```bash
//! key-heatmap ~/Library/Application\ Support/KaraStat/key_stats.sqlite \
//!   --port 8080 \
//!   --normalizer log \
//!   --palette rainbow
//! ```

pub mod heatmap;
pub mod store;
pub mod viewer;
