use super::*;

#[derive(Debug, FromRow)]
struct CatalogRow {
    id: i64,
    parent_id: Option<i64>,
    name: String,
    position: i32,
}

impl PostgresPermissionGateway {
    pub(super) async fn load_service_records_impl(&self) -> AppResult<Vec<ServiceRecord>> {
        let services = self
            .load_level(
                r#"
                SELECT id, NULL::BIGINT AS parent_id, name, position
                FROM services
                ORDER BY position, id
                "#,
                "services",
            )
            .await?;
        let sub_services = self
            .load_level(
                r#"
                SELECT id, service_id AS parent_id, name, position
                FROM sub_services
                ORDER BY position, id
                "#,
                "sub-services",
            )
            .await?;
        let sub_sub_services = self
            .load_level(
                r#"
                SELECT id, sub_service_id AS parent_id, name, position
                FROM sub_sub_services
                ORDER BY position, id
                "#,
                "sub-sub-services",
            )
            .await?;

        let mut records =
            Vec::with_capacity(services.len() + sub_services.len() + sub_sub_services.len());
        for row in services {
            records.push(catalog_record(NodeId::service(row.id), row)?);
        }
        for row in sub_services {
            records.push(catalog_record(NodeId::sub_service(row.id), row)?);
        }
        for row in sub_sub_services {
            records.push(catalog_record(NodeId::sub_sub_service(row.id), row)?);
        }

        Ok(records)
    }

    async fn load_level(&self, query: &'static str, level: &str) -> AppResult<Vec<CatalogRow>> {
        sqlx::query_as::<_, CatalogRow>(query)
            .fetch_all(&self.pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to load {level}: {error}")))
    }
}

fn catalog_record(node: NodeId, row: CatalogRow) -> AppResult<ServiceRecord> {
    ServiceRecord::new(node, row.parent_id, row.name, row.position).map_err(|error| {
        AppError::Internal(format!("invalid stored service record '{node}': {error}"))
    })
}
