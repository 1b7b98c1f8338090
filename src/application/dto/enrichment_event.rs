use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The project a BOM-processed notification refers to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectRef {
    pub uuid: Uuid,
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub purl: Option<String>,
}

/// One enrichment trigger, as delivered by the (out-of-scope) webhook layer.
///
/// The core only interprets the project identity; `content` is an opaque
/// payload carried through to the logs. Events are not retained after the
/// run completes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentEvent {
    pub timestamp: DateTime<Utc>,
    pub content: String,
    pub project: ProjectRef,
}

impl EnrichmentEvent {
    pub fn new(timestamp: DateTime<Utc>, content: impl Into<String>, project: ProjectRef) -> Self {
        Self {
            timestamp,
            content: content.into(),
            project,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_deserializes_without_project_purl() {
        let event: EnrichmentEvent = serde_json::from_str(
            r#"{
                "timestamp": "2024-12-14T20:15:00Z",
                "content": "BOM processed",
                "project": {
                    "uuid": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
                    "name": "billing-service",
                    "version": "1.4.2"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(event.project.name, "billing-service");
        assert!(event.project.purl.is_none());
    }
}
