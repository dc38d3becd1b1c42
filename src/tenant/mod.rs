//! Tenant provisioning and isolation
//!
//! The registry is the master table of companies; every active company
//! owns exactly one partition, named deterministically from its name at
//! creation time. The provisioning workflow keeps the two in step.

pub mod naming;
pub mod provision;
pub mod registry;

pub use provision::Provisioner;
pub use registry::{CompanyRecord, Registry};
