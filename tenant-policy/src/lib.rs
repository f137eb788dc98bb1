//! # Tenant Policy
//!
//! Pure role-policy decision logic for the tenant platform. This crate owns
//! no storage: it answers "may actor X do Y" questions from role values and
//! membership counts supplied by the caller, and surfaces every rejection as
//! a typed [`DenyReason`] rather than an opaque error.
//!
//! ## Overview
//!
//! The tenant-policy crate handles:
//! - **Actions**: Organization operations with their minimum required role
//! - **Decisions**: Role-change and member-removal checks
//! - **Last-admin arithmetic**: The single definition of the invariant that
//!   every non-empty organization retains at least one admin
//!
//! ## Usage
//!
//! ```rust
//! use tenant_org::MemberRole;
//! use tenant_policy::{authorize, can_remove_member, OrgAction};
//!
//! // A plain member may view the member list but not manage it
//! assert!(authorize(MemberRole::Member, OrgAction::ViewMembers).is_ok());
//! assert!(authorize(MemberRole::Member, OrgAction::ManageMembers).is_err());
//!
//! // A plain member may leave, but not remove others
//! assert!(can_remove_member(MemberRole::Member, true).is_ok());
//! assert!(can_remove_member(MemberRole::Member, false).is_err());
//! ```
//!
//! ## Integration
//!
//! The service facade calls these checks after resolving the actor's own
//! membership; the membership store calls the last-admin helpers while
//! holding its per-organization lock so the invariant is checked against a
//! consistent view.

pub mod action;
pub mod decision;

pub use action::{authorize, OrgAction};
pub use decision::{
    can_change_role, can_remove_member, downgrade_breaks_last_admin, removal_breaks_last_admin,
    DenyReason,
};
