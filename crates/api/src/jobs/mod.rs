//! Background jobs.

mod expired_sessions;
mod pool_metrics;
mod purge_requests;
mod scheduler;

pub use expired_sessions::ExpiredSessionsJob;
pub use pool_metrics::PoolMetricsJob;
pub use purge_requests::PurgeCompletedRequestsJob;
pub use scheduler::{run_job, Job, JobFrequency, JobScheduler};
