use crate::enrichment::domain::{Component, LicenseDetails, Purl, SourcedValue};
use crate::ports::outbound::InventoryClient;
use crate::shared::{EnrichmentError, Result};
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// Provenance label for license data already present in Dependency-Track.
pub const LABEL: &str = "DependencyTrack";

const PAGE_SIZE: u32 = 100;
const API_KEY_HEADER: &str = "X-API-Key";

/// Component record as returned by the Dependency-Track REST API. Only the
/// fields the enrichment flow cares about are deserialized.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DtComponent {
    uuid: Uuid,
    #[serde(default)]
    purl: Option<String>,
    #[serde(default)]
    license_expression: Option<String>,
    #[serde(default)]
    resolved_license: Option<DtResolvedLicense>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DtResolvedLicense {
    license_id: String,
}

/// DependencyTrackClient adapter for the inventory system's REST API.
///
/// Lists a project's components page by page and writes resolved license
/// expressions back. Every call carries the API key header.
pub struct DependencyTrackClient {
    client: reqwest::Client,
    api_url: String,
    api_key: String,
}

impl DependencyTrackClient {
    pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("dt-license-enricher/{}", version))
            .build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    /// Converts an API record into a domain component.
    ///
    /// A malformed purl downgrades the component to "no identity" instead of
    /// failing the listing: such components are excluded from enrichment but
    /// must not poison the rest of the project.
    fn parse_component(record: DtComponent) -> Component {
        let purl = record.purl.as_deref().and_then(|raw| match Purl::parse(raw) {
            Ok(purl) => Some(purl),
            Err(e) => {
                warn!(component = %record.uuid, error = %e, "ignoring malformed purl");
                None
            }
        });

        // A structured resolved license is preferred over the free-text
        // expression when both are present.
        let existing_expression = record
            .resolved_license
            .map(|license| license.license_id)
            .or(record.license_expression);

        let license_details = match existing_expression {
            Some(expression) => {
                LicenseDetails::from_expressions(vec![SourcedValue::new(expression, LABEL)])
            }
            None => LicenseDetails::default(),
        };

        Component::new(record.uuid, purl, license_details)
    }

    async fn fetch_page(&self, project_uuid: Uuid, page_number: u32) -> Result<Vec<DtComponent>> {
        let url = format!(
            "{}/api/v1/component/project/{}",
            self.api_url, project_uuid
        );
        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, &self.api_key)
            .query(&[("pageSize", PAGE_SIZE), ("pageNumber", page_number)])
            .send()
            .await?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Dependency-Track returned status code {} for component listing",
                response.status()
            );
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl InventoryClient for DependencyTrackClient {
    async fn list_components(&self, project_uuid: Uuid) -> Result<Vec<Component>> {
        let mut components = Vec::new();
        for page_number in 1u32.. {
            let page = self
                .fetch_page(project_uuid, page_number)
                .await
                .map_err(|e| EnrichmentError::ComponentListing {
                    project_uuid: project_uuid.to_string(),
                    details: e.to_string(),
                })?;
            if page.is_empty() {
                break;
            }
            components.extend(page.into_iter().map(Self::parse_component));
        }
        Ok(components)
    }

    async fn update_license_expression(
        &self,
        component_uuid: Uuid,
        license_expression: &str,
    ) -> Result<()> {
        let component_url = format!("{}/api/v1/component/{}", self.api_url, component_uuid);
        let license_url = format!(
            "{}/api/v1/license/{}",
            self.api_url,
            urlencoding::encode(license_expression)
        );
        let post_url = format!("{}/api/v1/component", self.api_url);

        // Read the full record first so unrelated fields survive the update.
        let mut payload: Value = self
            .client
            .get(&component_url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("reading component {}", component_uuid))?
            .json()
            .await?;

        // Dependency-Track stores recognized licenses and free-text
        // expressions in different fields; an exact-match registry lookup
        // decides which one this update sets.
        let license_response = self
            .client
            .get(&license_url)
            .header(API_KEY_HEADER, &self.api_key)
            .send()
            .await?;

        let resolved: Option<Value> = if license_response.status().is_success() {
            license_response.json().await.ok()
        } else {
            None
        };
        let resolved_id = resolved
            .as_ref()
            .and_then(|license| license.get("licenseId"))
            .cloned();

        let record = payload.as_object_mut().ok_or_else(|| {
            anyhow::anyhow!("unexpected non-object payload for component {}", component_uuid)
        })?;
        record.remove("licenseExpression");
        record.remove("licenseUrl");
        record.remove("resolvedLicense");
        match resolved_id {
            Some(license_id) => {
                record.insert("license".to_string(), license_id);
            }
            None => {
                record.insert(
                    "licenseExpression".to_string(),
                    Value::String(license_expression.to_string()),
                );
            }
        }

        self.client
            .post(&post_url)
            .header(API_KEY_HEADER, &self.api_key)
            .json(&payload)
            .send()
            .await?
            .error_for_status()
            .with_context(|| format!("updating component {}", component_uuid))?;
        Ok(())
    }
}
