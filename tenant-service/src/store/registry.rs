//! In-memory organization registry
//!
//! Organization records live behind per-organization locks like the
//! membership store. Domain bindings are additionally indexed in a flat
//! `HashMap<String, Uuid>` unique on domain, so resolution on the login hot
//! path is a single hash lookup.
//!
//! Lock order is always organization slot before domain index.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use tenant_org::{Organization, OrganizationPatch};

use super::{OrganizationRegistry, StoreError, StoreResult};

/// In-memory implementation of [`OrganizationRegistry`].
pub struct MemoryOrganizationRegistry {
    orgs: RwLock<HashMap<Uuid, Arc<RwLock<Organization>>>>,
    domain_index: RwLock<HashMap<String, Uuid>>,
}

impl std::fmt::Debug for MemoryOrganizationRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryOrganizationRegistry").finish()
    }
}

impl MemoryOrganizationRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            orgs: RwLock::new(HashMap::new()),
            domain_index: RwLock::new(HashMap::new()),
        }
    }

    async fn slot(&self, org_id: Uuid) -> StoreResult<Arc<RwLock<Organization>>> {
        self.orgs
            .read()
            .await
            .get(&org_id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }
}

impl Default for MemoryOrganizationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrganizationRegistry for MemoryOrganizationRegistry {
    async fn create(&self, org: Organization) -> StoreResult<()> {
        let mut index = self.domain_index.write().await;
        for domain in &org.domains {
            if index.get(domain).is_some_and(|owner| *owner != org.id) {
                return Err(StoreError::DomainTaken(domain.clone()));
            }
        }
        for domain in &org.domains {
            index.insert(domain.clone(), org.id);
        }

        self.orgs
            .write()
            .await
            .insert(org.id, Arc::new(RwLock::new(org)));
        Ok(())
    }

    async fn get(&self, org_id: Uuid) -> StoreResult<Organization> {
        let slot = self.slot(org_id).await?;
        let org = slot.read().await;
        Ok(org.clone())
    }

    async fn update(&self, org_id: Uuid, patch: OrganizationPatch) -> StoreResult<Organization> {
        let slot = self.slot(org_id).await?;
        let mut org = slot.write().await;

        if let Some(new_domains) = &patch.domains {
            let mut index = self.domain_index.write().await;
            for domain in new_domains {
                if index.get(domain).is_some_and(|owner| *owner != org_id) {
                    return Err(StoreError::DomainTaken(domain.clone()));
                }
            }
            for domain in &org.domains {
                index.remove(domain);
            }
            for domain in new_domains {
                index.insert(domain.clone(), org_id);
            }
        }

        org.apply_patch(patch);
        Ok(org.clone())
    }

    async fn set_logo(
        &self,
        org_id: Uuid,
        logo_ref: Option<String>,
    ) -> StoreResult<Option<String>> {
        let slot = self.slot(org_id).await?;
        let mut org = slot.write().await;
        let previous = std::mem::replace(&mut org.logo_ref, logo_ref);
        org.updated_at = chrono::Utc::now();
        Ok(previous)
    }

    async fn remove(&self, org_id: Uuid) -> StoreResult<Organization> {
        let slot = self
            .orgs
            .write()
            .await
            .remove(&org_id)
            .ok_or(StoreError::NotFound)?;
        let org = slot.read().await.clone();

        let mut index = self.domain_index.write().await;
        index.retain(|_, owner| *owner != org_id);

        Ok(org)
    }

    async fn get_common_setting(
        &self,
        org_id: Uuid,
        key: &str,
    ) -> StoreResult<Option<serde_json::Value>> {
        let slot = self.slot(org_id).await?;
        let org = slot.read().await;
        Ok(org.common_settings.get(key).cloned())
    }

    async fn set_common_setting(
        &self,
        org_id: Uuid,
        key: &str,
        value: serde_json::Value,
    ) -> StoreResult<()> {
        let slot = self.slot(org_id).await?;
        let mut org = slot.write().await;
        org.common_settings.set(key, value);
        org.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn bind_domain(&self, org_id: Uuid, domain: &str) -> StoreResult<()> {
        let slot = self.slot(org_id).await?;
        let mut org = slot.write().await;

        let mut index = self.domain_index.write().await;
        if let Some(owner) = index.get(domain) {
            if *owner != org_id {
                return Err(StoreError::DomainTaken(domain.to_string()));
            }
            return Ok(());
        }
        index.insert(domain.to_string(), org_id);
        org.domains.push(domain.to_string());
        org.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn unbind_domain(&self, org_id: Uuid, domain: &str) -> StoreResult<()> {
        let slot = self.slot(org_id).await?;
        let mut org = slot.write().await;

        let mut index = self.domain_index.write().await;
        if index.get(domain) == Some(&org_id) {
            index.remove(domain);
        }
        org.domains.retain(|d| d != domain);
        org.updated_at = chrono::Utc::now();
        Ok(())
    }

    async fn resolve_domain(&self, domain: &str) -> Option<Uuid> {
        self.domain_index.read().await.get(domain).copied()
    }
}
