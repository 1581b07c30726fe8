//! Service layer for article use-cases.
//!
//! # Responsibility
//! - Orchestrate permission resolution and repository calls per request.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or uniqueness checks.
//! - Service layer remains storage-agnostic.

pub mod article_service;
