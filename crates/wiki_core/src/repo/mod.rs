//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the article data access contract.
//! - Isolate SQLite query details from service orchestration.
//! - Enforce per-namespace id/title uniqueness on every write.
//!
//! # Invariants
//! - Repository writes enforce `ArticleData::validate()` before persistence.
//! - Every write commits only after the uniqueness check passes.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `IntegrityViolation`) in addition to DB transport errors.

pub mod article_repo;
pub mod uniqueness;
