//! Scheduler loop — sleeps until the next cron match, then runs the job.
//! Holds no state besides the last fire time; a failing job ends the loop.

use std::future::Future;

use chrono::{DateTime, FixedOffset, Utc};
use morningpost_core::config::ScheduleConfig;
use morningpost_core::error::{MorningPostError, Result};

use crate::cron::CronSchedule;

/// A cron expression bound to the fixed UTC offset it is evaluated in.
#[derive(Debug, Clone)]
pub struct Schedule {
    cron: CronSchedule,
    offset: FixedOffset,
}

impl Schedule {
    pub fn new(cron: CronSchedule, offset: FixedOffset) -> Self {
        Self { cron, offset }
    }

    /// `None` when no cron expression is configured (run once).
    pub fn from_config(config: &ScheduleConfig) -> Result<Option<Self>> {
        if !config.is_recurring() {
            return Ok(None);
        }
        let offset = FixedOffset::east_opt(config.utc_offset_hours * 3600).ok_or_else(|| {
            MorningPostError::Schedule(format!("bad UTC offset {}h", config.utc_offset_hours))
        })?;
        Ok(Some(Self::new(CronSchedule::parse(&config.cron)?, offset)))
    }

    pub fn cron(&self) -> &CronSchedule {
        &self.cron
    }

    /// Next fire time strictly after `after`.
    pub fn next_after(&self, after: DateTime<Utc>) -> Option<DateTime<FixedOffset>> {
        self.cron.next_after(&after.with_timezone(&self.offset))
    }

    /// Run `job` at every match, forever, or until it fails.
    pub async fn run<F, Fut>(&self, mut job: F) -> Result<()>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<()>>,
    {
        tracing::info!("⏰ Scheduler started: '{}' (UTC{})", self.cron, self.offset);

        let mut last_fire: Option<DateTime<Utc>> = None;
        loop {
            let now = Utc::now();
            // Never fire the same slot twice, even if the sleep woke early.
            let after = last_fire.map_or(now, |last| last.max(now));
            let next = self.next_after(after).ok_or_else(|| {
                MorningPostError::Schedule(format!("'{}' never fires again", self.cron))
            })?;
            let next_utc = next.with_timezone(&Utc);

            tracing::info!("⏳ Next run at {next}");
            let wait = (next_utc - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            last_fire = Some(next_utc);
            tracing::info!("🔔 Scheduled run at {next}");
            job().await?;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_no_cron_means_run_once() {
        assert!(Schedule::from_config(&ScheduleConfig::default()).unwrap().is_none());
    }

    #[test]
    fn test_bad_cron_is_schedule_error() {
        let config = ScheduleConfig {
            cron: "every morning".into(),
            ..ScheduleConfig::default()
        };
        assert!(matches!(
            Schedule::from_config(&config),
            Err(MorningPostError::Schedule(_))
        ));
    }

    #[test]
    fn test_next_in_configured_offset() {
        let config = ScheduleConfig {
            cron: "0 8 * * *".into(),
            utc_offset_hours: 8,
        };
        let schedule = Schedule::from_config(&config).unwrap().unwrap();
        let after = "2026-10-19T01:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let next = schedule.next_after(after).unwrap();
        assert_eq!(next.to_rfc3339(), "2026-10-20T08:00:00+08:00");
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_until_job_fails() {
        let schedule = Schedule::new(
            CronSchedule::parse("* * * * *").unwrap(),
            FixedOffset::east_opt(0).unwrap(),
        );
        let runs = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&runs);
        let result = schedule
            .run(move || {
                let counter = Arc::clone(&counter);
                async move {
                    let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
                    if n == 3 {
                        Err(MorningPostError::fetch("poem", "down"))
                    } else {
                        Ok(())
                    }
                }
            })
            .await;
        assert!(matches!(result, Err(MorningPostError::Fetch { .. })));
        assert_eq!(runs.load(Ordering::SeqCst), 3);
    }
}
