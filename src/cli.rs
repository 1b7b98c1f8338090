use clap::Parser;
use uuid::Uuid;

/// License data provider to fetch from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    ClearlyDefined,
    Snyk,
}

impl std::str::FromStr for SourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clearlydefined" | "cd" => Ok(SourceKind::ClearlyDefined),
            "snyk" => Ok(SourceKind::Snyk),
            _ => Err(format!(
                "Invalid source: {}. Please specify 'clearlydefined' or 'snyk'",
                s
            )),
        }
    }
}

/// Enrich Dependency-Track components with license data
#[derive(Parser, Debug)]
#[command(name = "dt-license-enricher")]
#[command(version)]
#[command(about = "Enrich Dependency-Track components with license data", long_about = None)]
pub struct Args {
    /// UUID of the Dependency-Track project to enrich
    #[arg(short = 'p', long)]
    pub project_uuid: Uuid,

    /// Project name, used in log output only
    #[arg(long, default_value = "unnamed")]
    pub project_name: String,

    /// Project version, used in log output only
    #[arg(long, default_value = "unknown")]
    pub project_version: String,

    /// License data provider: clearlydefined or snyk
    #[arg(short, long, default_value = "clearlydefined")]
    pub source: SourceKind,
}

impl Args {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
