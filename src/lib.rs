//! coverage-node - ZIP code coverage lookup for internet and TV providers
//!
//! Answers "which providers serve this ZIP code?" over HTTP, backed by a
//! pre-populated catalog of providers, coverage facts and plans.
//!
//! ## Architecture
//!
//! - **Resolver**: validates the ZIP/technology and runs the two-step
//!   coverage → provider read pipeline
//! - **Catalog**: read-only traits the resolver and handlers consume,
//!   implemented by SQLite ([`db::CatalogDb`]) and in memory
//!   ([`catalog::InMemoryCatalog`])
//! - **API**: axum router with the `{ success, ... }` JSON envelope
//!
//! ## Tables
//!
//! | Table | Holds |
//! |-------|-------|
//! | `providers` | id, name, slug, category, technologies |
//! | `coverage` | provider id, zip, has_service, technology, availability, max speed |
//! | `plans` | provider id, name, speeds, price, promo, contract, data cap |
//!
//! The request path never writes. Rows arrive through the `import` command.

pub mod api;
pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod resolver;
pub mod services;

pub use catalog::{Catalog, CoverageSource, InMemoryCatalog, PlanSource, ProviderSource};
pub use config::Config;
pub use db::CatalogDb;
pub use error::{ResolveError, StoreError, ValidationError};
pub use models::{CoverageRow, Plan, PlanView, Provider, ProviderWithCoverage, Technology, ZipCode};
pub use resolver::CoverageResolver;
