use crate::enrichment::domain::LicenseDetails;

/// LicenseSelection policy for choosing the one expression to publish.
///
/// This policy encodes the business rules for picking a license expression
/// when multiple tagged candidates are available.
///
/// Ranking:
/// 1. Fixed source priority, most trusted first: `Snyk`,
///    `ClearlyDefined Declared`, `ClearlyDefined Discovered`. Sources not in
///    the table (including `DependencyTrack`) rank below every known source.
/// 2. Within equal priority, the longer expression wins - compound
///    expressions carry more information than their parts.
///
/// The selection is deterministic and is re-run on every enrichment cycle;
/// it is never cached.
pub struct LicenseSelection;

impl LicenseSelection {
    /// Provenance labels in descending order of trust.
    const SOURCE_PRIORITY: [&'static str; 3] = [
        "Snyk",
        "ClearlyDefined Declared",
        "ClearlyDefined Discovered",
    ];

    /// Selects the license expression to publish, or None when the details
    /// carry no expressions at all.
    pub fn select(details: &LicenseDetails) -> Option<&str> {
        details
            .license_expressions()
            .iter()
            .max_by(|a, b| {
                (Self::rank(&a.source), a.value.len(), &a.value)
                    .cmp(&(Self::rank(&b.source), b.value.len(), &b.value))
            })
            .map(|sv| sv.value.as_str())
    }

    /// Rank of a provenance label; unknown labels rank 0, below all known
    /// sources.
    fn rank(source: &str) -> usize {
        Self::SOURCE_PRIORITY
            .iter()
            .position(|known| *known == source)
            .map(|index| Self::SOURCE_PRIORITY.len() - index)
            .unwrap_or(0)
    }
}
