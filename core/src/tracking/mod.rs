pub mod clock;
pub mod reaper;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use reaper::ReaperHandle;
pub use store::{CollidableStore, ReapSummary};
