use anyhow::Result;
use hidden_catch::{
    application::task_registry::TaskRegistry,
    config::config_loader,
    domain::repositories::job::JobRepository,
    infrastructure::postgres::{postgres_connection, repositories::job::JobPostgres},
    observability, worker,
};
use std::sync::Arc;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        error!("Worker exited with error: {:#}", error);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let settings = config_loader::load();
    observability::init_observability("worker", settings.as_ref().ok())?;

    let settings = settings?;
    info!("ENV has been loaded");

    let postgres_pool = postgres_connection::establish_connection(&settings.database)?;
    info!("Postgres connection has been established");

    let job_repository: Arc<dyn JobRepository + Send + Sync> =
        Arc::new(JobPostgres::new(Arc::new(postgres_pool)));
    let registry = Arc::new(TaskRegistry::with_default_tasks());

    let worker_loop = tokio::spawn(worker::job_worker::run_worker_loop(
        job_repository,
        registry,
    ));

    tokio::select! {
        result = worker_loop => result??,
        result = tokio::signal::ctrl_c() => {
            result?;
            info!("Shutdown signal received");
        }
    };

    Ok(())
}
