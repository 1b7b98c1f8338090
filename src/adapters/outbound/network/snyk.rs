use crate::enrichment::domain::{Component, LicenseDetails, Purl, SourcedValue};
use crate::ports::outbound::{LicenseSource, RetrieveOutcome};
use crate::shared::Result;
use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://security.snyk.io";

/// Provenance label for expressions scraped from Snyk package pages.
pub const LABEL: &str = "Snyk";

/// The page is served to browsers only; requests without a browser
/// User-Agent get blocked.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/126.0.0.0 Safari/537.36";

/// SnykSource adapter scraping the SPDX license expression from Snyk's
/// public package pages.
///
/// Unlike ClearlyDefined this provider exposes exactly one field, the
/// license expression, extracted from a tagged span in the page markup.
/// An expression of `Unknown` means Snyk has no license data and maps to
/// `NotFound`, as does a 404 page.
pub struct SnykSource {
    client: reqwest::Client,
    base_url: String,
    expression_pattern: Regex,
}

impl SnykSource {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        // The span Snyk tags for automated tests is the only stable anchor
        // in the page markup.
        let expression_pattern = Regex::new(
            r#"data-snyk-test="license item list: spdx license expression"[^>]*>([^<]+)<"#,
        )?;

        Ok(Self {
            client,
            base_url: DEFAULT_BASE_URL.to_string(),
            expression_pattern,
        })
    }

    /// Overrides the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds the package page URL. Maven coordinates join namespace and
    /// name with an encoded colon; namespaced ecosystems join them with an
    /// encoded slash; everything else uses the bare name.
    fn package_page_url(&self, purl: &Purl) -> String {
        let identifier = if purl.package_type() == "maven" && !purl.namespace().is_empty() {
            format!("{}%3A{}", purl.namespace(), purl.name())
        } else if purl.namespace().is_empty() {
            purl.name().to_string()
        } else {
            format!(
                "{}%2F{}",
                purl.namespace().replace('@', "%40"),
                purl.name()
            )
        };
        format!(
            "{}/package/{}/{}/{}",
            self.base_url,
            purl.package_type(),
            identifier,
            purl.version()
        )
    }

    /// Pulls the SPDX expression out of the page markup. `None` means the
    /// expected span is not present at all.
    fn extract_expression(&self, page: &str) -> Option<String> {
        let raw = self
            .expression_pattern
            .captures(page)
            .and_then(|captures| captures.get(1))?
            .as_str()
            .trim();
        let mut expression = raw;
        if let Some(stripped) = expression.strip_prefix('(') {
            expression = stripped;
        }
        if let Some(stripped) = expression.strip_suffix(')') {
            expression = stripped;
        }
        Some(expression.to_string())
    }

    async fn fetch(&self, url: &str) -> Result<Option<LicenseDetails>> {
        let response = self.client.get(url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            anyhow::bail!("Snyk returned status code {}", response.status());
        }

        let page = response.text().await?;
        let expression = self
            .extract_expression(&page)
            .ok_or_else(|| anyhow::anyhow!("license expression span not found in page"))?;

        if expression == "Unknown" {
            return Ok(None);
        }
        Ok(Some(LicenseDetails::from_expressions(vec![
            SourcedValue::new(expression, LABEL),
        ])))
    }
}

#[async_trait]
impl LicenseSource for SnykSource {
    fn source_name(&self) -> &'static str {
        "Snyk"
    }

    async fn retrieve(&self, component: &Component) -> RetrieveOutcome {
        let Some(purl) = component.purl() else {
            return RetrieveOutcome::Failed(anyhow::anyhow!(
                "component {} has no purl",
                component.uuid()
            ));
        };

        let url = self.package_page_url(purl);
        debug!(%url, "retrieving license details from Snyk");

        match self.fetch(&url).await {
            Ok(Some(details)) => RetrieveOutcome::Found(details),
            Ok(None) => RetrieveOutcome::NotFound,
            Err(e) => {
                warn!(%url, error = %e, "retrieving license details from Snyk failed");
                RetrieveOutcome::Failed(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> SnykSource {
        SnykSource::new().unwrap()
    }

    #[test]
    fn test_package_page_url_for_maven() {
        let purl = Purl::parse("pkg:maven/org.apache.commons/commons-lang3@3.14.0").unwrap();
        assert_eq!(
            source().package_page_url(&purl),
            "https://security.snyk.io/package/maven/org.apache.commons%3Acommons-lang3/3.14.0"
        );
    }

    #[test]
    fn test_package_page_url_for_scoped_npm() {
        let purl = Purl::parse("pkg:npm/@angular/core@17.0.0").unwrap();
        assert_eq!(
            source().package_page_url(&purl),
            "https://security.snyk.io/package/npm/%40angular%2Fcore/17.0.0"
        );
    }

    #[test]
    fn test_package_page_url_for_maven_without_namespace() {
        let purl = Purl::parse("pkg:maven/standalone-artifact@2.0.0").unwrap();
        assert_eq!(
            source().package_page_url(&purl),
            "https://security.snyk.io/package/maven/standalone-artifact/2.0.0"
        );
    }

    #[test]
    fn test_package_page_url_for_plain_npm() {
        let purl = Purl::parse("pkg:npm/lodash@4.17.21").unwrap();
        assert_eq!(
            source().package_page_url(&purl),
            "https://security.snyk.io/package/npm/lodash/4.17.21"
        );
    }

    #[test]
    fn test_extract_expression() {
        let page = r#"<span data-snyk-test="license item list: spdx license expression" class="x">MIT</span>"#;
        assert_eq!(source().extract_expression(page), Some("MIT".to_string()));
    }

    #[test]
    fn test_extract_expression_strips_surrounding_parentheses() {
        let page = r#"<span data-snyk-test="license item list: spdx license expression">(MIT OR Apache-2.0)</span>"#;
        assert_eq!(
            source().extract_expression(page),
            Some("MIT OR Apache-2.0".to_string())
        );
    }

    #[test]
    fn test_extract_expression_missing_span() {
        assert_eq!(source().extract_expression("<html></html>"), None);
    }
}
