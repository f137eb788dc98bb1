//! Error types for organization operations
//!
//! This module defines the caller-facing error taxonomy. Policy rejections
//! arrive as typed values and are classified locally so callers can render
//! precise messages; an unresolved domain is not represented here at all
//! (resolution returns `Option`).

use thiserror::Error;

use crate::store::StoreError;
use tenant_events::PublishError;
use tenant_policy::DenyReason;

/// Organization service error types.
#[derive(Debug, Error)]
pub enum OrgError {
    /// The organization is unknown
    #[error("Organization not found")]
    NotFound,

    /// The user has no membership in the target organization
    #[error("User is not a member of the organization")]
    NotAMember,

    /// The actor lacks the required role for the operation
    #[error("Forbidden: insufficient role")]
    Forbidden,

    /// The operation would leave a non-empty organization without an admin
    #[error("Organization must retain at least one admin")]
    LastAdminViolation,

    /// The user already holds a membership in the organization
    #[error("User is already a member of the organization")]
    AlreadyMember,

    /// The domain is already bound to another organization
    #[error("Domain {0} is already bound to another organization")]
    DomainTaken(String),

    /// Requested page size is outside [1, 1000]
    #[error("Page size {0} is out of range")]
    PageSizeOutOfRange(usize),

    /// Transient storage failure after the retry boundary
    #[error("Transient storage failure: {0}")]
    Transient(String),

    /// Event publish failed where the operation sequences on it
    #[error("Event publish failed: {0}")]
    Publish(#[from] PublishError),

    /// Blob storage failure
    #[error("Blob storage failure: {0}")]
    Blob(String),
}

/// Result type for organization operations.
pub type OrgResult<T> = Result<T, OrgError>;

impl OrgError {
    /// Check if this error should be logged at error level.
    ///
    /// Policy rejections are expected outcomes and should not be logged as
    /// errors.
    pub fn is_server_error(&self) -> bool {
        matches!(
            self,
            OrgError::Transient(_) | OrgError::Publish(_) | OrgError::Blob(_)
        )
    }

    /// Get HTTP status code for this error.
    pub fn status_code(&self) -> u16 {
        match self {
            OrgError::NotFound => 404,
            OrgError::NotAMember | OrgError::Forbidden => 403,
            OrgError::LastAdminViolation | OrgError::AlreadyMember | OrgError::DomainTaken(_) => {
                409
            }
            OrgError::PageSizeOutOfRange(_) => 400,
            OrgError::Transient(_) => 503,
            OrgError::Publish(_) | OrgError::Blob(_) => 502,
        }
    }

    /// Get error code for API responses.
    pub fn error_code(&self) -> &'static str {
        match self {
            OrgError::NotFound => "ORG_NOT_FOUND",
            OrgError::NotAMember => "NOT_A_MEMBER",
            OrgError::Forbidden => "FORBIDDEN",
            OrgError::LastAdminViolation => "LAST_ADMIN_VIOLATION",
            OrgError::AlreadyMember => "ALREADY_MEMBER",
            OrgError::DomainTaken(_) => "DOMAIN_TAKEN",
            OrgError::PageSizeOutOfRange(_) => "PAGE_SIZE_OUT_OF_RANGE",
            OrgError::Transient(_) => "TRANSIENT_FAILURE",
            OrgError::Publish(_) => "EVENT_PUBLISH_FAILED",
            OrgError::Blob(_) => "BLOB_STORAGE_FAILED",
        }
    }
}

impl From<StoreError> for OrgError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => OrgError::NotFound,
            StoreError::NotAMember => OrgError::NotAMember,
            StoreError::AlreadyMember => OrgError::AlreadyMember,
            StoreError::LastAdminViolation => OrgError::LastAdminViolation,
            StoreError::DomainTaken(domain) => OrgError::DomainTaken(domain),
            StoreError::Conflict(msg) => OrgError::Transient(msg),
        }
    }
}

impl From<DenyReason> for OrgError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::RequiresAdmin | DenyReason::SelfRemovalOnly => OrgError::Forbidden,
            DenyReason::WouldDropLastAdmin => OrgError::LastAdminViolation,
        }
    }
}
