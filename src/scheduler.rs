//! Background scheduler for FastNews.
//!
//! Each job sweeps its topics at wall-clock times in the configured time
//! zone. Jobs run as independent tasks sharing one pipeline.

use std::sync::Arc;

use chrono::Utc;
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::{Config, JobKind, TopicConfig};
use crate::datetime::{format_in_timezone, next_fire_time};
use crate::pipeline::NewsPipeline;
use crate::Result;

/// A recurring sweep over a set of topics.
#[derive(Debug, Clone)]
pub struct ScheduledJob {
    /// Job identity.
    pub kind: JobKind,
    /// Cadence in hours.
    pub every_hours: u32,
    /// Topics swept on every firing.
    pub topics: Vec<TopicConfig>,
}

/// Runs the scheduled jobs.
pub struct Scheduler {
    pipeline: Arc<NewsPipeline>,
    tz: Tz,
    jobs: Vec<ScheduledJob>,
    run_on_startup: bool,
}

impl Scheduler {
    /// Build the primary and categories jobs from configuration.
    ///
    /// Jobs without topics are left out.
    pub fn from_config(config: &Config, pipeline: Arc<NewsPipeline>) -> Result<Self> {
        let tz = config.schedule.tz()?;
        let jobs = [
            (JobKind::Primary, config.schedule.primary_interval_hours),
            (JobKind::Categories, config.schedule.categories_interval_hours),
        ]
        .into_iter()
        .map(|(kind, every_hours)| ScheduledJob {
            kind,
            every_hours,
            topics: config.topics_for(kind),
        })
        .filter(|job| !job.topics.is_empty())
        .collect();

        Ok(Self {
            pipeline,
            tz,
            jobs,
            run_on_startup: config.schedule.run_on_startup,
        })
    }

    /// Configured jobs.
    pub fn jobs(&self) -> &[ScheduledJob] {
        &self.jobs
    }

    /// Spawn one task per job.
    pub fn start(self) -> Vec<JoinHandle<()>> {
        self.jobs
            .into_iter()
            .map(|job| {
                let pipeline = self.pipeline.clone();
                let tz = self.tz;
                let run_on_startup = self.run_on_startup;
                tokio::spawn(async move {
                    run_job(pipeline, job, tz, run_on_startup).await;
                })
            })
            .collect()
    }
}

async fn run_job(pipeline: Arc<NewsPipeline>, job: ScheduledJob, tz: Tz, run_on_startup: bool) {
    info!(
        "Job {} started (every {} hour(s), {} topic(s))",
        job.kind.as_str(),
        job.every_hours,
        job.topics.len()
    );

    if run_on_startup {
        run_sweep(&pipeline, &job).await;
    }

    loop {
        let now = Utc::now();
        let next = next_fire_time(now, job.every_hours, &tz);
        debug!(
            "Job {} next run at {}",
            job.kind.as_str(),
            format_in_timezone(&next, &tz, "%Y-%m-%d %H:%M %Z")
        );

        let wait = (next - now).to_std().unwrap_or_default();
        tokio::time::sleep(wait).await;
        run_sweep(&pipeline, &job).await;
    }
}

async fn run_sweep(pipeline: &NewsPipeline, job: &ScheduledJob) {
    info!("Job {}: sweep started", job.kind.as_str());
    let report = pipeline.sweep(&job.topics).await;

    if report.failed.is_empty() {
        info!(
            "Job {}: sweep finished ({} notified, {} dry run, {} unchanged)",
            job.kind.as_str(),
            report.notified.len(),
            report.dry_run.len(),
            report.unchanged.len()
        );
    } else {
        warn!(
            "Job {}: sweep finished with {} failure(s) ({} notified, {} dry run, {} unchanged)",
            job.kind.as_str(),
            report.failed.len(),
            report.notified.len(),
            report.dry_run.len(),
            report.unchanged.len()
        );
    }
}
