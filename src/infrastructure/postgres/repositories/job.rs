use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    domain::{
        entities::jobs::{InsertJobEntity, JobEntity},
        repositories::job::JobRepository,
        value_objects::enums::job_statuses::JobStatus,
    },
    infrastructure::postgres::{postgres_connection::PgPoolSquad, schema::jobs},
};

pub struct JobPostgres {
    db_pool: Arc<PgPoolSquad>,
    worker_id: String,
}

impl JobPostgres {
    pub fn new(db_pool: Arc<PgPoolSquad>) -> Self {
        Self {
            db_pool,
            worker_id: Uuid::new_v4().to_string(),
        }
    }
}

#[async_trait]
impl JobRepository for JobPostgres {
    async fn enqueue_job(&self, task_name: String, payload: Value) -> Result<Uuid> {
        let mut conn = self.db_pool.get()?;
        let current_time = Utc::now();

        let insert_entity = InsertJobEntity {
            id: Uuid::new_v4(),
            task_name,
            payload,
            status: JobStatus::Queued.to_string(),
            run_at: current_time,
            created_at: current_time,
        };

        let result = diesel::insert_into(jobs::table)
            .values(&insert_entity)
            .returning(jobs::id)
            .get_result::<Uuid>(&mut conn)?;

        Ok(result)
    }

    async fn lock_next_job(&self) -> Result<Option<JobEntity>> {
        let mut conn = self.db_pool.get()?;
        let current_time = Utc::now();

        let job = conn.transaction::<Option<JobEntity>, diesel::result::Error, _>(|conn| {
            // SKIP LOCKED lets several workers poll the same table.
            let candidate: Option<JobEntity> = jobs::table
                .select(JobEntity::as_select())
                .filter(jobs::status.eq(JobStatus::Queued.to_string()))
                .filter(jobs::run_at.le(current_time))
                .order(jobs::run_at.asc())
                .for_update()
                .skip_locked()
                .first::<JobEntity>(conn)
                .optional()?;

            let Some(job) = candidate else {
                return Ok(None);
            };

            let locked = diesel::update(jobs::table.find(job.id))
                .set((
                    jobs::status.eq(JobStatus::Running.to_string()),
                    jobs::locked_at.eq(Some(current_time)),
                    jobs::locked_by.eq(Some(self.worker_id.clone())),
                ))
                .returning(JobEntity::as_select())
                .get_result::<JobEntity>(conn)?;

            Ok(Some(locked))
        })?;

        Ok(job)
    }

    async fn mark_job_done(&self, job_id: Uuid, result: Value) -> Result<()> {
        let mut conn = self.db_pool.get()?;

        diesel::update(jobs::table.find(job_id))
            .set((
                jobs::status.eq(JobStatus::Done.to_string()),
                jobs::output.eq(Some(result)),
                jobs::finished_at.eq(Some(Utc::now())),
                jobs::locked_at.eq::<Option<DateTime<Utc>>>(None),
                jobs::locked_by.eq::<Option<String>>(None),
            ))
            .execute(&mut conn)?;

        Ok(())
    }

    async fn mark_job_failed(&self, job_id: Uuid, err: String) -> Result<()> {
        let mut conn = self.db_pool.get()?;

        diesel::update(jobs::table.find(job_id))
            .set((
                jobs::status.eq(JobStatus::Failed.to_string()),
                jobs::error.eq(Some(err)),
                jobs::finished_at.eq(Some(Utc::now())),
                jobs::locked_at.eq::<Option<DateTime<Utc>>>(None),
                jobs::locked_by.eq::<Option<String>>(None),
            ))
            .execute(&mut conn)?;

        Ok(())
    }
}
