//! # Tenant Organization Models
//!
//! This crate provides the multi-tenant organization domain models for the
//! tenant platform.
//!
//! ## Overview
//!
//! The tenant-org crate handles:
//! - **Organizations**: Tenant entities with common settings, a logo
//!   reference, and bound custom domains
//! - **Memberships**: The (organization, user, role) relation
//! - **Roles**: The two-level `Member < Admin` hierarchy
//! - **Groups**: Derived all-members and dev projections over membership
//! - **Context**: The per-user current-organization pointer
//!
//! ## Architecture
//!
//! ```text
//! User
//!   ├─ OrgMember ─→ Organization
//!   │                  ├─ CommonSettings
//!   │                  └─ bound domains
//!   ├─ Group (derived: all-members / dev)
//!   └─ UserContext (current organization)
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use tenant_org::{MemberRole, Organization, OrgMember};
//! use uuid::Uuid;
//!
//! let creator_id = Uuid::now_v7();
//! let org = Organization::new("Acme Corp", creator_id);
//!
//! // The creator becomes the first admin
//! let membership = OrgMember::new(org.id, creator_id, MemberRole::Admin);
//! ```
//!
//! ## Invariants
//!
//! Two invariants are enforced by the stores built on these models:
//! - at most one membership per (organization, user) pair;
//! - every organization with members retains at least one admin.

pub mod context;
pub mod group;
pub mod membership;
pub mod organization;
pub mod roles;
pub mod settings;

// Re-export main types for convenience
pub use context::UserContext;
pub use group::{Group, GroupKind, Locale};
pub use membership::OrgMember;
pub use organization::{Organization, OrganizationPatch, OrganizationSummary};
pub use roles::MemberRole;
pub use settings::CommonSettings;
