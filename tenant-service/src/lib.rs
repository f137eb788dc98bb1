//! Multi-tenant organization service
//!
//! Ties the domain model, policy engine, and event bus together behind a
//! single facade:
//!
//! - [`store`] — membership and organization storage traits with in-memory
//!   implementations
//! - [`session`] — per-user current-organization pointers and the switch
//!   protocol
//! - [`domains`] — custom-domain resolution and referrer checks
//! - [`groups`] — implicit all-members and developer groups
//! - [`external`] — blob storage and datasource catalog seams
//! - [`service`] — the [`OrgService`] facade an API layer calls
//!
//! Typical setup:
//!
//! ```
//! use std::sync::Arc;
//! use tenant_events::{BusinessEventPublisher, MemoryEventBus};
//! use tenant_service::{
//!     MemoryBlobStore, MemoryMembershipStore, MemoryOrganizationRegistry, OrgService,
//!     StaticDatasourceCatalog,
//! };
//!
//! let service = OrgService::new(
//!     Arc::new(MemoryOrganizationRegistry::new()),
//!     Arc::new(MemoryMembershipStore::new()),
//!     Arc::new(MemoryBlobStore::new()),
//!     Arc::new(StaticDatasourceCatalog::default()),
//!     BusinessEventPublisher::new(Arc::new(MemoryEventBus::new())),
//! );
//! ```

pub mod domains;
pub mod error;
pub mod external;
pub mod groups;
pub mod retry;
pub mod service;
pub mod session;
pub mod store;
pub mod views;

pub use domains::DomainResolver;
pub use error::{OrgError, OrgResult};
pub use external::{
    BlobError, BlobStore, DatasourceMetaCatalog, DatasourceMetaInfo, MemoryBlobStore,
    StaticDatasourceCatalog,
};
pub use groups::GroupResolver;
pub use retry::RetryConfig;
pub use service::OrgService;
pub use session::{SessionContextManager, SwitchOutcome, SwitchPhase};
pub use store::{
    MembershipStore, MemberPage, MemoryMembershipStore, MemoryOrganizationRegistry,
    OrganizationRegistry, StoreError, StoreResult, MAX_PAGE_SIZE,
};
pub use views::{
    DomainCheckView, GroupView, OrgMemberListView, OrgMemberView, OrgView, RequestContext,
    RoleDescription,
};
