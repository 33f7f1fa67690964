//! vote-charts: animated, interactive vote-distribution charts.
//!
//! A retained-mode engine shared by every chart variant: elements are painted
//! once into per-key offscreen buffers, composited each frame by a scheduler
//! that sleeps when all animations settle, and selected by hit-testing the
//! cached geometry. Two variants ship: [`RowChart`] and [`RingChart`].

pub mod api;
pub mod charts;
pub mod core;
pub mod error;
pub mod interaction;
pub mod render;
pub mod telemetry;

pub use api::{Chart, ChartOptions, FrameRequest, ManualClock, SchedulerState, SystemClock};
pub use charts::{RingChart, RingChartConfig, RowChart, RowChartConfig};
pub use core::{DataSet, Entry, SortMode};
pub use error::{ChartError, ChartResult};
pub use render::{RecordingSurface, Surface};
