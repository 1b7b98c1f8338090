use crate::enrichment::domain::{Component, LicenseDetails, Purl, SourcedValue};
use crate::ports::outbound::{LicenseSource, RetrieveOutcome};
use crate::shared::{EnrichmentError, Result};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_API_URL: &str = "https://api.clearlydefined.io";

/// Provenance label for the curated declared license.
pub const LABEL_DECLARED: &str = "ClearlyDefined Declared";
/// Provenance label for scanner-discovered data (expressions, attribution
/// parties, source location).
pub const LABEL_DISCOVERED: &str = "ClearlyDefined Discovered";

/// ClearlyDefinedSource adapter fetching license definitions from the
/// ClearlyDefined REST API.
///
/// Definition URLs are built deterministically from the component purl:
/// `/definitions/{type}/{provider}/{namespace|-}/{name}/{version}`, every
/// segment URL-escaped. A 404 answer means the coordinates are unknown to
/// ClearlyDefined and maps to `NotFound`; so does a definition carrying no
/// license data at all.
pub struct ClearlyDefinedSource {
    client: reqwest::Client,
    api_url: String,
}

impl ClearlyDefinedSource {
    /// Creates a new ClearlyDefined source with default configuration.
    pub fn new() -> Result<Self> {
        let version = env!("CARGO_PKG_VERSION");
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("dt-license-enricher/{}", version))
            .build()?;

        Ok(Self {
            client,
            api_url: DEFAULT_API_URL.to_string(),
        })
    }

    /// Overrides the API base URL.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Maps a purl package type to the ClearlyDefined provider segment.
    fn provider_for(package_type: &str) -> Result<&'static str> {
        match package_type {
            "maven" => Ok("mavencentral"),
            "npm" => Ok("npmjs"),
            "pypi" => Ok("pypi"),
            "gem" => Ok("rubygems"),
            "nuget" => Ok("nuget"),
            "cargo" => Ok("cratesio"),
            "golang" => Ok("golang"),
            other => Err(EnrichmentError::UnsupportedEcosystem {
                package_type: other.to_string(),
            }
            .into()),
        }
    }

    fn definition_url(&self, purl: &Purl) -> Result<String> {
        let provider = Self::provider_for(purl.package_type())?;
        let namespace = if purl.namespace().is_empty() {
            "-"
        } else {
            purl.namespace()
        };
        let segments = [
            purl.package_type(),
            provider,
            namespace,
            purl.name(),
            purl.version(),
        ];
        let escaped: Vec<String> = segments
            .iter()
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        Ok(format!(
            "{}/definitions/{}",
            self.api_url,
            escaped.join("/")
        ))
    }

    async fn fetch(&self, url: &str) -> Result<Option<LicenseDetails>> {
        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("ClearlyDefined API returned status code {}", response.status());
        }

        let definition: Value = response.json().await?;
        Ok(Self::parse_definition(&definition))
    }

    /// Extracts license details from a definition document. Returns None when
    /// the definition holds no license data at all, which the caller treats
    /// as not-found.
    fn parse_definition(definition: &Value) -> Option<LicenseDetails> {
        let mut license_expressions = Vec::new();
        if let Some(declared) = definition
            .pointer("/licensed/declared")
            .and_then(Value::as_str)
        {
            license_expressions.push(SourcedValue::new(declared, LABEL_DECLARED));
        }
        if let Some(discovered) = definition
            .pointer("/licensed/facets/core/discovered/expressions")
            .and_then(Value::as_array)
        {
            license_expressions.extend(
                discovered
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|expr| SourcedValue::new(expr, LABEL_DISCOVERED)),
            );
        }

        let attributions = definition
            .pointer("/licensed/facets/core/attribution/parties")
            .and_then(Value::as_array)
            .map(|parties| {
                parties
                    .iter()
                    .filter_map(Value::as_str)
                    .map(|party| SourcedValue::new(party, LABEL_DISCOVERED))
                    .collect()
            })
            .unwrap_or_default();

        let source_urls = definition
            .pointer("/described/sourceLocation/url")
            .and_then(Value::as_str)
            .map(|url| vec![SourcedValue::new(url, LABEL_DISCOVERED)])
            .unwrap_or_default();

        let details = LicenseDetails::new(license_expressions, attributions, source_urls);
        if details.is_empty() {
            None
        } else {
            Some(details)
        }
    }
}

#[async_trait]
impl LicenseSource for ClearlyDefinedSource {
    fn source_name(&self) -> &'static str {
        "ClearlyDefined"
    }

    async fn retrieve(&self, component: &Component) -> RetrieveOutcome {
        let Some(purl) = component.purl() else {
            return RetrieveOutcome::Failed(anyhow::anyhow!(
                "component {} has no purl",
                component.uuid()
            ));
        };

        let url = match self.definition_url(purl) {
            Ok(url) => url,
            Err(e) => return RetrieveOutcome::Failed(e),
        };
        debug!(%url, "retrieving license details from ClearlyDefined");

        match self.fetch(&url).await {
            Ok(Some(details)) => RetrieveOutcome::Found(details),
            Ok(None) => RetrieveOutcome::NotFound,
            Err(e) => {
                warn!(%url, error = %e, "retrieving license details from ClearlyDefined failed");
                RetrieveOutcome::Failed(e)
            }
        }
    }
}
