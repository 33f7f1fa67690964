pub mod data_set;
pub mod easing;
pub mod palette;
pub mod types;

pub use data_set::{DataSet, Entry, SortMode};
pub use easing::{Eased, Easing, UNIT_FRAMES_PER_MS};
pub use palette::{ColorAssignment, DEFAULT_COLOR_SCHEME};
pub use types::{Point, Rect, Viewport};
