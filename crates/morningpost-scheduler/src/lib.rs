//! # MorningPost Scheduler
//!
//! Cron evaluation and the recurring-run loop.
//!
//! ```text
//! Schedule ("0 8 * * *", UTC+8)
//!   └── loop: sleep until next match → job() → repeat
//!                                        └── error ends the loop
//! ```

pub mod cron;
pub mod engine;

pub use cron::CronSchedule;
pub use engine::Schedule;
