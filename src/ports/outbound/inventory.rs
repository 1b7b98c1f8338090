use crate::enrichment::domain::Component;
use crate::shared::Result;
use async_trait::async_trait;
use uuid::Uuid;

/// InventoryClient port - the inventory system holding the component list
/// and receiving resolved license expressions.
#[async_trait]
pub trait InventoryClient: Send + Sync {
    /// Lists every component of a project, accumulating all pages.
    ///
    /// Each component's existing license data (if any) is captured as
    /// license details under the inventory system's own provenance label, so
    /// the selection policy can weigh it against freshly fetched data on
    /// later cycles.
    ///
    /// # Errors
    /// A listing failure is fatal to the enrichment run - it is the
    /// precondition for everything else.
    async fn list_components(&self, project_uuid: Uuid) -> Result<Vec<Component>>;

    /// Writes one resolved license expression back to the inventory system.
    ///
    /// Only ever invoked for components whose details yield a non-absent
    /// selection.
    async fn update_license_expression(
        &self,
        component_uuid: Uuid,
        license_expression: &str,
    ) -> Result<()>;
}
