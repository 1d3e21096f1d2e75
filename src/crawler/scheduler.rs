//! Periodic detail-crawl trigger
//!
//! Re-runs the detail fan-out crawl on a fixed interval until a shutdown
//! signal arrives. A failed tick is logged and the next tick still runs.

use crate::config::ScheduleConfig;
use crate::crawler::coordinator::{Coordinator, CrawlMode};
use crate::crawler::fetcher::Fetcher;
use crate::ConfigError;
use std::future::Future;
use std::time::Duration;

/// Interval between scheduled runs, or an error when scheduling is off
pub fn schedule_interval(config: &ScheduleConfig) -> Result<Duration, ConfigError> {
    if !config.enabled {
        return Err(ConfigError::Validation(
            "scheduling is disabled; set [schedule] enabled = true to use watch".to_string(),
        ));
    }
    Ok(Duration::from_secs(config.interval_secs))
}

/// Runs the detail crawl every `period` until `shutdown` completes
///
/// The first run starts immediately. A run in progress is finished before
/// shutdown is honored.
///
/// # Returns
///
/// The number of runs started
pub async fn run_scheduled<F, S>(
    coordinator: &mut Coordinator<F>,
    period: Duration,
    shutdown: S,
) -> usize
where
    F: Fetcher,
    S: Future<Output = ()>,
{
    tracing::info!("Scheduling detail crawl every {:?}", period);

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    tokio::pin!(shutdown);

    let mut runs = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => {
                tracing::info!("Shutdown requested, stopping scheduler after {} runs", runs);
                break;
            }
            _ = ticker.tick() => {
                runs += 1;
                tracing::debug!("Scheduled run {} starting", runs);
                let result = coordinator.run_or_empty(&CrawlMode::Detail).await;
                tracing::info!("Scheduled run {} collected {} products", runs, result.len());
            }
        }
    }

    runs
}
