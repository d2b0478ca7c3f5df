use super::*;

impl PostgresPermissionGateway {
    pub(super) async fn load_job_baseline_impl(&self, job_id: JobId) -> AppResult<Vec<KindRef>> {
        let rows = sqlx::query_as::<_, KindRefRow>(
            r#"
            SELECT service_id, sub_service_id, sub_sub_service_id
            FROM job_service_permissions
            WHERE job_id = $1
            ORDER BY id
            "#,
        )
        .bind(job_id.as_i64())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load service permissions for job '{job_id}': {error}"
            ))
        })?;

        Ok(rows.into_iter().map(KindRef::from).collect())
    }

    pub(super) async fn save_job_baseline_impl(
        &self,
        job_id: JobId,
        rows: Vec<KindRef>,
    ) -> AppResult<()> {
        for row in &rows {
            row.node_id()?;
        }

        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let job_exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM jobs
            WHERE id = $1
            "#,
        )
        .bind(job_id.as_i64())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve job: {error}")))?;

        if job_exists == 0 {
            return Err(AppError::NotFound(format!("job '{job_id}' does not exist")));
        }

        sqlx::query(
            r#"
            DELETE FROM job_service_permissions
            WHERE job_id = $1
            "#,
        )
        .bind(job_id.as_i64())
        .execute(&mut *transaction)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to clear service permissions for job '{job_id}': {error}"
            ))
        })?;

        for row in &rows {
            sqlx::query(
                r#"
                INSERT INTO job_service_permissions (
                    job_id,
                    service_id,
                    sub_service_id,
                    sub_sub_service_id
                )
                VALUES ($1, $2, $3, $4)
                ON CONFLICT ON CONSTRAINT job_service_permissions_target_key DO NOTHING
                "#,
            )
            .bind(job_id.as_i64())
            .bind(row.service_id)
            .bind(row.sub_service_id)
            .bind(row.sub_sub_service_id)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to persist service permission for job '{job_id}': {error}"
                ))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        debug!(job_id = %job_id, rows = rows.len(), "replaced job service permissions");
        Ok(())
    }
}
