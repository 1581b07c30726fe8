//! Article domain model.
//!
//! # Responsibility
//! - Define article identity (`Locator`), content (`ArticleData`) and the
//!   permission-gated `Article` wrapper.
//! - Own the canonical JSON codec for articles.
//!
//! # Invariants
//! - Domain values are plain data; no I/O happens in this module.
//! - Permission levels form a closed, totally ordered set.

pub mod article;
pub mod codec;
pub mod locator;
pub mod permission;
