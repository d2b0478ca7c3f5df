use super::*;

#[derive(Debug, FromRow)]
struct ExceptionRow {
    #[sqlx(flatten)]
    target: KindRefRow,
    is_allowed: bool,
}

impl PostgresPermissionGateway {
    pub(super) async fn load_user_overrides_impl(
        &self,
        user_id: UserId,
    ) -> AppResult<Vec<OverrideRow>> {
        let rows = sqlx::query_as::<_, ExceptionRow>(
            r#"
            SELECT service_id, sub_service_id, sub_sub_service_id, is_allowed
            FROM user_service_exceptions
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|error| {
            AppError::Internal(format!(
                "failed to load service exceptions for user '{user_id}': {error}"
            ))
        })?;

        rows.into_iter()
            .map(|row| {
                let node = KindRef::from(row.target).node_id().map_err(|error| {
                    AppError::Internal(format!(
                        "invalid stored service exception for user '{user_id}': {error}"
                    ))
                })?;

                Ok(OverrideRow {
                    node,
                    is_allowed: row.is_allowed,
                })
            })
            .collect()
    }

    pub(super) async fn save_user_overrides_impl(
        &self,
        user_id: UserId,
        diff: OverrideDiff,
    ) -> AppResult<()> {
        let mut transaction =
            self.pool.begin().await.map_err(|error| {
                AppError::Internal(format!("failed to begin transaction: {error}"))
            })?;

        let user_exists = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM profiles
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_one(&mut *transaction)
        .await
        .map_err(|error| AppError::Internal(format!("failed to resolve user: {error}")))?;

        if user_exists == 0 {
            return Err(AppError::NotFound(format!("user '{user_id}' does not exist")));
        }

        for row in &diff.deletes {
            let target = row.kind_ref();
            sqlx::query(
                r#"
                DELETE FROM user_service_exceptions
                WHERE user_id = $1
                    AND service_id IS NOT DISTINCT FROM $2
                    AND sub_service_id IS NOT DISTINCT FROM $3
                    AND sub_sub_service_id IS NOT DISTINCT FROM $4
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(target.service_id)
            .bind(target.sub_service_id)
            .bind(target.sub_sub_service_id)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to delete service exception for user '{user_id}': {error}"
                ))
            })?;
        }

        for row in &diff.inserts {
            let target = row.kind_ref();
            sqlx::query(
                r#"
                INSERT INTO user_service_exceptions (
                    user_id,
                    service_id,
                    sub_service_id,
                    sub_sub_service_id,
                    is_allowed
                )
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT ON CONSTRAINT user_service_exceptions_target_key
                DO UPDATE SET is_allowed = EXCLUDED.is_allowed
                "#,
            )
            .bind(user_id.as_uuid())
            .bind(target.service_id)
            .bind(target.sub_service_id)
            .bind(target.sub_sub_service_id)
            .bind(row.is_allowed)
            .execute(&mut *transaction)
            .await
            .map_err(|error| {
                AppError::Internal(format!(
                    "failed to persist service exception for user '{user_id}': {error}"
                ))
            })?;
        }

        transaction.commit().await.map_err(|error| {
            AppError::Internal(format!("failed to commit transaction: {error}"))
        })?;

        debug!(
            user_id = %user_id,
            inserted = diff.inserts.len(),
            deleted = diff.deletes.len(),
            "applied user service exception delta"
        );
        Ok(())
    }
}
