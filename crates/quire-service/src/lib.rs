//! # quire-service
//!
//! The abstract Document Persistence Service that Quire's editor core
//! writes through. The service is the system of record; the editor's
//! in-memory state is an optimistic cache of it.
//!
//! The wire format is deliberately out of scope — [`DocumentService`] is an
//! async trait with the logical operations only. This crate ships two
//! implementations:
//!
//! - [`MemoryService`] — an in-memory system of record that mints section
//!   ids, used by tests and by embedders that want a local-only backend.
//! - [`FlakyService`] — a wrapper that injects scripted failures per
//!   operation class, for exercising the editor's failure paths.
//!
//! Real HTTP backends implement [`DocumentService`] outside this repository.

mod error;
mod flaky;
mod memory;
mod service;

pub use error::{ServiceError, ServiceResult};
pub use flaky::{FlakyService, OpClass};
pub use memory::MemoryService;
pub use service::DocumentService;
