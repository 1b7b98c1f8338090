use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A value tagged with the provenance label of the data source that produced
/// it, e.g. `("Apache-2.0", "ClearlyDefined Declared")`.
///
/// The label is unique per provider + field kind so the selection policy can
/// discriminate between sources during priority ranking.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourcedValue {
    pub value: String,
    pub source: String,
}

impl SourcedValue {
    pub fn new(value: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            source: source.into(),
        }
    }
}

/// License metadata for one component: expressions, attributions, and
/// source-code URLs, each tagged with provenance.
///
/// Equality is set-based per collection - ordering and duplication are
/// irrelevant. `merge` deduplicates by the `(value, source)` pair, which makes
/// it commutative up to ordering and idempotent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LicenseDetails {
    #[serde(default)]
    license_expressions: Vec<SourcedValue>,
    #[serde(default)]
    attributions: Vec<SourcedValue>,
    #[serde(default)]
    source_urls: Vec<SourcedValue>,
}

impl LicenseDetails {
    pub fn new(
        license_expressions: Vec<SourcedValue>,
        attributions: Vec<SourcedValue>,
        source_urls: Vec<SourcedValue>,
    ) -> Self {
        Self {
            license_expressions,
            attributions,
            source_urls,
        }
    }

    /// Details holding only license expressions, the common case for
    /// single-field providers.
    pub fn from_expressions(license_expressions: Vec<SourcedValue>) -> Self {
        Self {
            license_expressions,
            ..Self::default()
        }
    }

    pub fn license_expressions(&self) -> &[SourcedValue] {
        &self.license_expressions
    }

    pub fn attributions(&self) -> &[SourcedValue] {
        &self.attributions
    }

    pub fn source_urls(&self) -> &[SourcedValue] {
        &self.source_urls
    }

    /// True iff all three collections are empty.
    pub fn is_empty(&self) -> bool {
        self.license_expressions.is_empty()
            && self.attributions.is_empty()
            && self.source_urls.is_empty()
    }

    /// The set of provenance labels present across all three collections.
    pub fn present_sources(&self) -> HashSet<&str> {
        self.license_expressions
            .iter()
            .chain(&self.attributions)
            .chain(&self.source_urls)
            .map(|sv| sv.source.as_str())
            .collect()
    }

    /// Combines two details, deduplicating each collection by the
    /// `(value, source)` pair. When both inputs carry the same pair, the
    /// first occurrence is kept.
    pub fn merge(&self, other: &LicenseDetails) -> LicenseDetails {
        LicenseDetails {
            license_expressions: Self::merge_collection(
                &self.license_expressions,
                &other.license_expressions,
            ),
            attributions: Self::merge_collection(&self.attributions, &other.attributions),
            source_urls: Self::merge_collection(&self.source_urls, &other.source_urls),
        }
    }

    fn merge_collection(a: &[SourcedValue], b: &[SourcedValue]) -> Vec<SourcedValue> {
        let mut seen: HashSet<(&str, &str)> = HashSet::new();
        let mut merged = Vec::with_capacity(a.len() + b.len());
        for sv in a.iter().chain(b) {
            if seen.insert((sv.value.as_str(), sv.source.as_str())) {
                merged.push(sv.clone());
            }
        }
        merged
    }

    fn pair_set(collection: &[SourcedValue]) -> HashSet<(&str, &str)> {
        collection
            .iter()
            .map(|sv| (sv.value.as_str(), sv.source.as_str()))
            .collect()
    }
}

impl PartialEq for LicenseDetails {
    fn eq(&self, other: &Self) -> bool {
        Self::pair_set(&self.license_expressions) == Self::pair_set(&other.license_expressions)
            && Self::pair_set(&self.attributions) == Self::pair_set(&other.attributions)
            && Self::pair_set(&self.source_urls) == Self::pair_set(&other.source_urls)
    }
}

impl Eq for LicenseDetails {}
