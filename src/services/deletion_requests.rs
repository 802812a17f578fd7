//! Staged deletion of academic years and levels.
//!
//! Staff affairs never delete structure directly: destroying a year or level
//! files a request. An admin later approves requests in bulk. A request whose
//! target still exists is approved (target deleted, request kept as a record);
//! a request whose target is already gone is discarded (request deleted).

use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::core::time::primitive_now_utc;
use crate::db::models::DeletionRequest;
use crate::db::types::{DeletionTarget, UserRole};
use crate::repositories;
use crate::services::authorization::{structure_destroy_mode, DestroyMode};

#[derive(Debug)]
pub(crate) enum DestroyOutcome {
    Deleted,
    Requested(DeletionRequest),
    TargetNotFound,
    Forbidden,
}

/// Destroys a year or level, or files a request, depending on the caller's role.
pub(crate) async fn destroy_or_request(
    pool: &PgPool,
    requester_id: &str,
    role: UserRole,
    target_type: DeletionTarget,
    target_id: &str,
) -> Result<DestroyOutcome, sqlx::Error> {
    let mode = structure_destroy_mode(role);
    if mode == DestroyMode::Forbidden {
        return Ok(DestroyOutcome::Forbidden);
    }

    let Some(target_name) = target_name(pool, target_type, target_id).await? else {
        return Ok(DestroyOutcome::TargetNotFound);
    };

    match mode {
        DestroyMode::Direct => {
            delete_target(pool, target_type, target_id).await?;
            tracing::info!(target_id, ?target_type, "Deleted directly by admin");
            Ok(DestroyOutcome::Deleted)
        }
        DestroyMode::Request => {
            let id = Uuid::new_v4().to_string();
            let request = repositories::deletion_requests::create(
                pool,
                repositories::deletion_requests::CreateDeletionRequest {
                    id: &id,
                    requester_id,
                    target_type,
                    target_id,
                    target_name: &target_name,
                    created_at: primitive_now_utc(),
                },
            )
            .await?;
            tracing::info!(request_id = %request.id, target_id, ?target_type, "Deletion requested");
            Ok(DestroyOutcome::Requested(request))
        }
        DestroyMode::Forbidden => Ok(DestroyOutcome::Forbidden),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ApprovalStatus {
    Approved,
    Discarded,
    AlreadyApproved,
    NotFound,
}

#[derive(Debug, Clone, Serialize)]
pub(crate) struct ApprovalResult {
    pub(crate) id: String,
    pub(crate) status: ApprovalStatus,
}

/// Transition for one selected request, given whether its target still exists.
pub(crate) fn next_status(request: Option<&DeletionRequest>, target_exists: bool) -> ApprovalStatus {
    match request {
        None => ApprovalStatus::NotFound,
        Some(request) if request.is_approved => ApprovalStatus::AlreadyApproved,
        Some(_) if target_exists => ApprovalStatus::Approved,
        Some(_) => ApprovalStatus::Discarded,
    }
}

pub(crate) async fn approve(
    pool: &PgPool,
    request_ids: &[String],
) -> Result<Vec<ApprovalResult>, sqlx::Error> {
    let mut results = Vec::with_capacity(request_ids.len());
    for id in request_ids {
        let request = repositories::deletion_requests::find_by_id(pool, id).await?;
        let target_exists = match &request {
            Some(request) if !request.is_approved => {
                target_name(pool, request.target_type, &request.target_id).await?.is_some()
            }
            _ => false,
        };

        let status = next_status(request.as_ref(), target_exists);
        match (status, &request) {
            (ApprovalStatus::Approved, Some(request)) => {
                delete_target(pool, request.target_type, &request.target_id).await?;
                repositories::deletion_requests::mark_approved(pool, id, primitive_now_utc())
                    .await?;
                tracing::info!(request_id = %id, target_name = %request.target_name, "Deletion approved");
            }
            (ApprovalStatus::Discarded, Some(request)) => {
                tracing::warn!(
                    request_id = %id,
                    target_name = %request.target_name,
                    "Deletion target no longer exists; discarding request"
                );
                repositories::deletion_requests::delete(pool, id).await?;
            }
            _ => {}
        }
        results.push(ApprovalResult { id: id.clone(), status });
    }
    Ok(results)
}

async fn target_name(
    pool: &PgPool,
    target_type: DeletionTarget,
    target_id: &str,
) -> Result<Option<String>, sqlx::Error> {
    Ok(match target_type {
        DeletionTarget::Year => {
            repositories::academic_years::find_by_id(pool, target_id).await?.map(|year| year.year)
        }
        DeletionTarget::Level => {
            repositories::levels::find_by_id(pool, target_id).await?.map(|level| level.name)
        }
    })
}

async fn delete_target(
    pool: &PgPool,
    target_type: DeletionTarget,
    target_id: &str,
) -> Result<bool, sqlx::Error> {
    match target_type {
        DeletionTarget::Year => repositories::academic_years::delete(pool, target_id).await,
        DeletionTarget::Level => repositories::levels::delete(pool, target_id).await,
    }
}
