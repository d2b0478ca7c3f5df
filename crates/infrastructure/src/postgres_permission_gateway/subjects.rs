use super::*;

#[derive(Debug, FromRow)]
struct JobRow {
    id: i64,
    name: String,
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: uuid::Uuid,
    display_name: String,
    job_id: Option<i64>,
}

impl PostgresPermissionGateway {
    pub(super) async fn list_jobs_impl(&self) -> AppResult<Vec<JobSummary>> {
        let rows = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, name
            FROM jobs
            ORDER BY name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list jobs: {error}")))?;

        rows.into_iter().map(job_summary).collect()
    }

    pub(super) async fn find_job_impl(&self, job_id: JobId) -> AppResult<Option<JobSummary>> {
        let row = sqlx::query_as::<_, JobRow>(
            r#"
            SELECT id, name
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to find job '{job_id}': {error}")))?;

        row.map(job_summary).transpose()
    }

    pub(super) async fn list_users_impl(&self) -> AppResult<Vec<UserSummary>> {
        let rows = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, display_name, job_id
            FROM profiles
            ORDER BY display_name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|error| AppError::Internal(format!("failed to list users: {error}")))?;

        rows.into_iter().map(user_summary).collect()
    }

    pub(super) async fn find_user_impl(&self, user_id: UserId) -> AppResult<Option<UserSummary>> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT id, display_name, job_id
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to find user '{user_id}': {error}"))
        })?;

        row.map(user_summary).transpose()
    }
}

fn job_summary(row: JobRow) -> AppResult<JobSummary> {
    Ok(JobSummary {
        job_id: JobId::new(row.id),
        name: stored_name(row.name, "job")?,
    })
}

fn user_summary(row: ProfileRow) -> AppResult<UserSummary> {
    Ok(UserSummary {
        user_id: UserId::from_uuid(row.id),
        display_name: stored_name(row.display_name, "user")?,
        job_id: row.job_id.map(JobId::new),
    })
}
