use std::sync::Arc;

use servora_core::{AppError, AppResult};
use servora_domain::{BaselineSet, JobId, NodeId, OverrideMap, OverrideRow, UserId};

use crate::test_fixtures::FakePermissionGateway;

use super::ServiceAccessService;

fn clerk() -> JobId {
    JobId::new(3)
}

fn service_with(gateway: &Arc<FakePermissionGateway>) -> ServiceAccessService {
    ServiceAccessService::new(gateway.clone())
}

#[tokio::test]
async fn replace_job_baseline_rejects_unknown_nodes() -> AppResult<()> {
    let gateway = Arc::new(FakePermissionGateway::new()?.with_job(clerk(), "Clerk", &[])?);
    let service = service_with(&gateway);

    let result = service
        .replace_job_baseline(clerk(), vec![NodeId::service(1), NodeId::service(77)])
        .await;

    assert!(matches!(result, Err(AppError::NotFound(_))));
    assert!(gateway.saved_baselines.lock().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn replace_job_baseline_stores_exactly_the_given_nodes() -> AppResult<()> {
    let gateway = Arc::new(FakePermissionGateway::new()?.with_job(clerk(), "Clerk", &[])?);
    let service = service_with(&gateway);

    service
        .replace_job_baseline(clerk(), vec![NodeId::sub_service(3), NodeId::service(2)])
        .await?;

    assert_eq!(
        service.job_baseline(clerk()).await?,
        BaselineSet::from_iter([NodeId::service(2), NodeId::sub_service(3)])
    );

    Ok(())
}

#[tokio::test]
async fn commit_normalizes_and_persists_only_the_delta() -> AppResult<()> {
    let user_id = UserId::new();
    let gateway = Arc::new(
        FakePermissionGateway::new()?
            .with_job(clerk(), "Clerk", &[NodeId::service(1), NodeId::sub_service(1)])?
            .with_user(user_id, Some(clerk()), &[(NodeId::service(2), true)])?,
    );
    let service = service_with(&gateway);

    let diff = service
        .commit_user_exceptions(
            user_id,
            OverrideMap::from_iter([
                (NodeId::service(1), true),
                (NodeId::service(2), true),
                (NodeId::sub_service(1), false),
            ]),
        )
        .await?;

    assert_eq!(
        diff.inserts,
        vec![OverrideRow {
            node: NodeId::sub_service(1),
            is_allowed: false,
        }]
    );
    assert!(diff.deletes.is_empty());
    assert_eq!(
        service.user_exceptions(user_id).await?,
        OverrideMap::from_iter([
            (NodeId::service(2), true),
            (NodeId::sub_service(1), false),
        ])
    );

    Ok(())
}

#[tokio::test]
async fn unknown_job_is_not_found() -> AppResult<()> {
    let gateway = Arc::new(FakePermissionGateway::new()?);
    let service = service_with(&gateway);

    assert!(matches!(
        service.job_baseline(clerk()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service
            .replace_job_baseline(clerk(), vec![NodeId::service(1)])
            .await,
        Err(AppError::NotFound(_))
    ));
    assert!(gateway.saved_baselines.lock().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn commit_removes_stored_rows_that_repeat_the_job_value() -> AppResult<()> {
    let user_id = UserId::new();
    let gateway = Arc::new(
        FakePermissionGateway::new()?
            .with_job(clerk(), "Clerk", &[NodeId::service(1), NodeId::sub_service(1)])?
            .with_user(user_id, Some(clerk()), &[(NodeId::sub_service(1), true)])?,
    );
    let service = service_with(&gateway);

    let diff = service
        .commit_user_exceptions(user_id, OverrideMap::new())
        .await?;

    assert_eq!(
        diff.deletes,
        vec![OverrideRow {
            node: NodeId::sub_service(1),
            is_allowed: true,
        }]
    );
    assert!(diff.inserts.is_empty());
    assert!(service.user_exceptions(user_id).await?.is_empty());

    service
        .replace_job_baseline(clerk(), vec![NodeId::service(1)])
        .await?;
    assert_eq!(
        service.effective_access(user_id).await?,
        vec![NodeId::service(1)]
    );

    Ok(())
}

#[tokio::test]
async fn commit_without_changes_writes_nothing() -> AppResult<()> {
    let user_id = UserId::new();
    let gateway = Arc::new(
        FakePermissionGateway::new()?.with_user(user_id, None, &[(NodeId::service(2), true)])?,
    );
    let service = service_with(&gateway);

    let diff = service
        .commit_user_exceptions(user_id, OverrideMap::from_iter([(NodeId::service(2), true)]))
        .await?;

    assert!(diff.is_empty());
    assert!(gateway.saved_diffs.lock().await.is_empty());

    Ok(())
}

#[tokio::test]
async fn unknown_user_is_not_found() -> AppResult<()> {
    let gateway = Arc::new(FakePermissionGateway::new()?);
    let service = service_with(&gateway);

    assert!(matches!(
        service.effective_access(UserId::new()).await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        service
            .commit_user_exceptions(UserId::new(), OverrideMap::new())
            .await,
        Err(AppError::NotFound(_))
    ));

    Ok(())
}

#[tokio::test]
async fn effective_access_layers_exceptions_over_job() -> AppResult<()> {
    let user_id = UserId::new();
    let gateway = Arc::new(
        FakePermissionGateway::new()?
            .with_job(clerk(), "Clerk", &[NodeId::service(1), NodeId::sub_service(2)])?
            .with_user(
                user_id,
                Some(clerk()),
                &[(NodeId::sub_service(2), false), (NodeId::service(2), true)],
            )?,
    );
    let service = service_with(&gateway);

    assert_eq!(
        service.effective_access(user_id).await?,
        vec![NodeId::service(1), NodeId::service(2)]
    );
    assert_eq!(service.list_users().await?.len(), 1);
    assert_eq!(service.list_jobs().await?.len(), 1);

    Ok(())
}

#[tokio::test]
async fn load_failures_propagate() -> AppResult<()> {
    let gateway = Arc::new(FakePermissionGateway::new()?);
    *gateway.fail_loads.lock().await = true;
    let service = service_with(&gateway);

    assert!(matches!(service.load_tree().await, Err(AppError::Internal(_))));

    Ok(())
}
