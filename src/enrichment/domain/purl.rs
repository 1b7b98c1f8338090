use crate::shared::EnrichmentError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical package URL identifying a component across all collaborators.
///
/// Two components with the same purl are the same entity for caching, retry
/// bookkeeping, and inventory updates. The canonical string form
/// (`pkg:type/namespace/name@version`) is the map key everywhere; the parsed
/// segments exist so provider adapters can build their fetch URLs.
///
/// Qualifiers and subpaths are stripped during parsing: license data is
/// per-package-version, so `pkg:maven/org.foo/bar@1.0?type=jar` and
/// `pkg:maven/org.foo/bar@1.0` must hit the same cache entry. Segments are
/// percent-decoded for the same reason: `pkg:npm/%40angular/core@17.0.0`
/// and `pkg:npm/@angular/core@17.0.0` are the same identity, and adapters
/// re-escape the decoded segments when building their URLs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Purl {
    canonical: String,
    package_type: String,
    namespace: String,
    name: String,
    version: String,
}

impl Purl {
    /// Parses a package URL string into its canonical form.
    ///
    /// # Errors
    /// Returns `EnrichmentError::InvalidPurl` if the string lacks the `pkg:`
    /// scheme, a package type, a name, or a version.
    pub fn parse(input: &str) -> Result<Self, EnrichmentError> {
        let invalid = |reason: &str| EnrichmentError::InvalidPurl {
            purl: input.to_string(),
            reason: reason.to_string(),
        };

        let rest = input
            .strip_prefix("pkg:")
            .ok_or_else(|| invalid("missing 'pkg:' scheme"))?;

        // Qualifiers and subpath do not participate in identity.
        let rest = rest.split(['?', '#']).next().unwrap_or(rest);

        let (path, version) = rest
            .rsplit_once('@')
            .ok_or_else(|| invalid("missing version"))?;
        if version.is_empty() {
            return Err(invalid("missing version"));
        }

        let decode = |segment: &str| {
            urlencoding::decode(segment)
                .map(|decoded| decoded.into_owned())
                .map_err(|_| invalid("invalid percent-encoding"))
        };

        let mut segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();
        if segments.len() < 2 {
            return Err(invalid("missing package type or name"));
        }
        let package_type = decode(segments.remove(0))?.to_lowercase();
        let name = decode(segments.pop().unwrap_or_default())?;
        if package_type.is_empty() || name.is_empty() {
            return Err(invalid("missing package type or name"));
        }
        let namespace = segments
            .iter()
            .map(|&segment| decode(segment))
            .collect::<Result<Vec<String>, EnrichmentError>>()?
            .join("/");
        let version = decode(version)?;

        let canonical = if namespace.is_empty() {
            format!("pkg:{}/{}@{}", package_type, name, version)
        } else {
            format!("pkg:{}/{}/{}@{}", package_type, namespace, name, version)
        };

        Ok(Self {
            canonical,
            package_type,
            namespace,
            name,
            version,
        })
    }

    /// Package type segment, e.g. `maven`, `npm`, `pypi`.
    pub fn package_type(&self) -> &str {
        &self.package_type
    }

    /// Namespace segment; empty when the ecosystem has none.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// The canonical string form used as the identity key.
    pub fn as_str(&self) -> &str {
        &self.canonical
    }
}

impl fmt::Display for Purl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical)
    }
}

impl FromStr for Purl {
    type Err = EnrichmentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Purl {
    type Error = EnrichmentError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Purl> for String {
    fn from(purl: Purl) -> Self {
        purl.canonical
    }
}
