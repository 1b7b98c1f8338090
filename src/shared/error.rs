use thiserror::Error;

/// Application-specific errors for license enrichment.
///
/// Uses thiserror to derive Display and Error traits automatically,
/// reducing boilerplate while maintaining user-friendly error messages.
///
/// Per-component fetch and update failures are deliberately NOT part of this
/// taxonomy: they stay local to one component and never abort a cycle. Only
/// failures that make the whole run impossible (configuration, listing the
/// project's components) surface through these variants.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },

    #[error("Failed to list components for project {project_uuid}: {details}")]
    ComponentListing {
        project_uuid: String,
        details: String,
    },

    #[error("Malformed package URL '{purl}': {reason}")]
    InvalidPurl { purl: String, reason: String },

    #[error("No known license data provider for package type '{package_type}'")]
    UnsupportedEcosystem { package_type: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_error_display() {
        let error = EnrichmentError::Configuration {
            message: "DEPENDENCY_TRACK_API_URL must not be empty".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("Invalid configuration"));
        assert!(display.contains("DEPENDENCY_TRACK_API_URL"));
    }

    #[test]
    fn test_component_listing_error_display() {
        let error = EnrichmentError::ComponentListing {
            project_uuid: "3fa85f64-5717-4562-b3fc-2c963f66afa6".to_string(),
            details: "connection refused".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("3fa85f64-5717-4562-b3fc-2c963f66afa6"));
        assert!(display.contains("connection refused"));
    }

    #[test]
    fn test_invalid_purl_error_display() {
        let error = EnrichmentError::InvalidPurl {
            purl: "not-a-purl".to_string(),
            reason: "missing 'pkg:' scheme".to_string(),
        };
        let display = format!("{}", error);
        assert!(display.contains("not-a-purl"));
        assert!(display.contains("missing 'pkg:' scheme"));
    }

    #[test]
    fn test_unsupported_ecosystem_error_display() {
        let error = EnrichmentError::UnsupportedEcosystem {
            package_type: "conda".to_string(),
        };
        assert!(format!("{}", error).contains("conda"));
    }
}
