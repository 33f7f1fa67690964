mod buffer_cache;
mod chart;
mod model;
mod options;
mod scheduler;
mod variant;

pub use buffer_cache::{
    BUFFER_PADDING, BufferCache, BufferCacheStats, CacheRecord, CacheRecords, CacheSlot,
    present_records,
};
pub use chart::Chart;
pub use model::ChartModel;
pub use options::ChartOptions;
pub use scheduler::{
    AnimationScheduler, Clock, FrameRequest, ManualClock, SchedulerState, SystemClock,
};
pub use variant::{ChartVariant, FrameInput};
