//! Domain resolution
//!
//! Maps an inbound referrer domain to its bound organization. Resolution is
//! a tenant-identification hint for login and switch flows; absence of a
//! binding is an expected outcome, and a binding never grants membership.

use std::sync::Arc;
use uuid::Uuid;

use crate::store::OrganizationRegistry;
use crate::views::DomainCheckView;

/// Resolves referrer domains against the registry's domain index.
#[derive(Clone)]
pub struct DomainResolver {
    registry: Arc<dyn OrganizationRegistry>,
}

impl std::fmt::Debug for DomainResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DomainResolver").finish()
    }
}

impl DomainResolver {
    /// Create a resolver over a registry.
    pub fn new(registry: Arc<dyn OrganizationRegistry>) -> Self {
        Self { registry }
    }

    /// Resolve a domain to its bound organization; `None` when unbound.
    pub async fn resolve(&self, domain: &str) -> Option<Uuid> {
        self.registry.resolve_domain(domain).await
    }

    /// Check a referrer domain against the organization a user just switched
    /// into.
    ///
    /// Returns the mismatch view only when the domain is bound to a
    /// *different* organization; a missing referrer, an unbound domain, or a
    /// binding to the same organization all yield `None` (plain success for
    /// the caller).
    pub async fn check(
        &self,
        referer_domain: Option<&str>,
        current_org: Uuid,
    ) -> Option<DomainCheckView> {
        let domain = referer_domain?;
        let bound_org = self.resolve(domain).await?;
        if bound_org == current_org {
            return None;
        }

        // The bound organization may have been removed between the index
        // lookup and the record read; treat that as unbound.
        let org = self.registry.get(bound_org).await.ok()?;
        Some(DomainCheckView {
            domain: domain.to_string(),
            organization_id: bound_org,
            organization_name: org.name,
        })
    }
}
