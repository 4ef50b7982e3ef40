//! Deliverable persistence.
//!
//! A deliverable is the terminal artifact of the pipeline: an immutable
//! branded HTML document owned by exactly one user. The store is a trait
//! seam so a database-backed implementation can replace the shipped
//! in-memory one without touching callers.

use crate::error::{DomainErrorKind, EntityErrorKind, Error, InternalErrorKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;
use utoipa::ToSchema;
use uuid::Uuid;

/// A rendered session deliverable. Immutable once created.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct Deliverable {
    pub id: Uuid,
    pub user_id: String,
    pub client_name: String,
    pub html: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl Deliverable {
    /// Create a new deliverable with a fresh id and timestamp.
    pub fn new(user_id: &str, client_name: &str, html: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            client_name: client_name.to_string(),
            html,
            created_at: Utc::now(),
        }
    }
}

/// Listing row: everything but the (potentially large) HTML body.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DeliverableSummary {
    pub id: Uuid,
    pub client_name: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

impl From<&Deliverable> for DeliverableSummary {
    fn from(deliverable: &Deliverable) -> Self {
        Self {
            id: deliverable.id,
            client_name: deliverable.client_name.clone(),
            created_at: deliverable.created_at,
        }
    }
}

/// Storage seam for deliverables.
#[async_trait]
pub trait DeliverableStore: Send + Sync {
    /// Persist a deliverable and return its id.
    async fn create(&self, deliverable: Deliverable) -> Result<Uuid, Error>;

    /// List the user's deliverables, newest first.
    async fn list_by_user(&self, user_id: &str) -> Result<Vec<DeliverableSummary>, Error>;

    /// Fetch one deliverable for its owner.
    ///
    /// Absent id raises `NotFound`; present but owned by someone else
    /// raises `Forbidden` so ownership violations are distinguishable.
    async fn get_by_id(&self, id: Uuid, user_id: &str) -> Result<Deliverable, Error>;
}

/// In-memory deliverable store.
#[derive(Default)]
pub struct MemoryDeliverableStore {
    deliverables: RwLock<HashMap<Uuid, Deliverable>>,
}

impl MemoryDeliverableStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DeliverableStore for MemoryDeliverableStore {
    async fn create(&self, deliverable: Deliverable) -> Result<Uuid, Error> {
        let id = deliverable.id;
        let mut deliverables = self.deliverables.write().await;
        if deliverables.contains_key(&id) {
            // Ids are UUIDv4; a collision means a caller reused one
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                    EntityErrorKind::Invalid,
                )),
            });
        }
        deliverables.insert(id, deliverable);
        Ok(id)
    }

    async fn list_by_user(&self, user_id: &str) -> Result<Vec<DeliverableSummary>, Error> {
        let deliverables = self.deliverables.read().await;
        let mut summaries: Vec<DeliverableSummary> = deliverables
            .values()
            .filter(|d| d.user_id == user_id)
            .map(Into::into)
            .collect();
        summaries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(summaries)
    }

    async fn get_by_id(&self, id: Uuid, user_id: &str) -> Result<Deliverable, Error> {
        let deliverables = self.deliverables.read().await;
        let deliverable = deliverables.get(&id).ok_or_else(|| Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::NotFound,
            )),
        })?;

        if deliverable.user_id != user_id {
            return Err(Error {
                source: None,
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                    EntityErrorKind::Forbidden,
                )),
            });
        }

        Ok(deliverable.clone())
    }
}
