use serde::{Deserialize, Serialize};

use super::domain_event_trait::DomainEvent;
use super::metadata::Metadata;
use crate::entity::Entity;

/// 事件信封，包含事件载荷与元数据
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "E: DomainEvent")]
pub struct EventEnvelope<E>
where
    E: DomainEvent,
{
    pub metadata: Metadata,
    pub payload: E,
}

impl<E> EventEnvelope<E>
where
    E: DomainEvent,
{
    pub fn new<A: Entity>(aggregate_id: &A::Id, payload: E) -> Self {
        let metadata = Metadata::builder()
            .aggregate_id(aggregate_id.to_string())
            .aggregate_type(A::TYPE.to_string())
            .occurred_at(payload.occurred_at())
            .build();

        Self { metadata, payload }
    }
}
