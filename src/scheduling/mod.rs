pub mod clock;
pub mod countdown;
pub mod resolver;
pub mod ticker;

pub use clock::{CivilTime, Clock, SystemClock};
pub use countdown::{Countdown, SpecialBroadcast};
pub use resolver::{RolloverPolicy, ScheduleInfo, ScheduleResolver};
pub use ticker::{ScheduleTicker, TickSnapshot};
