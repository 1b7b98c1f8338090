use super::{LicenseDetails, Purl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry of a project's component inventory.
///
/// `uuid` is the persistent Dependency-Track identifier used for update
/// calls; `purl` is the cross-collaborator identity used for caching, retry
/// bookkeeping, and fetching. Components without a purl are excluded from
/// enrichment entirely - that is a precondition, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    uuid: Uuid,
    purl: Option<Purl>,
    license_details: LicenseDetails,
}

impl Component {
    pub fn new(uuid: Uuid, purl: Option<Purl>, license_details: LicenseDetails) -> Self {
        Self {
            uuid,
            purl,
            license_details,
        }
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }

    pub fn purl(&self) -> Option<&Purl> {
        self.purl.as_ref()
    }

    pub fn license_details(&self) -> &LicenseDetails {
        &self.license_details
    }

    /// Returns a copy of this component carrying the given license details.
    /// Components are replaced, never mutated in place.
    pub fn with_license_details(&self, license_details: LicenseDetails) -> Self {
        Self {
            uuid: self.uuid,
            purl: self.purl.clone(),
            license_details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrichment::domain::SourcedValue;

    #[test]
    fn test_with_license_details_replaces_and_preserves_identity() {
        let purl = Purl::parse("pkg:npm/lodash@4.17.21").unwrap();
        let component = Component::new(Uuid::new_v4(), Some(purl.clone()), LicenseDetails::default());

        let details =
            LicenseDetails::from_expressions(vec![SourcedValue::new("MIT", "Snyk")]);
        let replaced = component.with_license_details(details.clone());

        assert_eq!(replaced.uuid(), component.uuid());
        assert_eq!(replaced.purl(), Some(&purl));
        assert_eq!(replaced.license_details(), &details);
        // Original untouched.
        assert!(component.license_details().is_empty());
    }
}
