//! Business logic and port trait definitions for Parley.
//!
//! This crate defines the "ports" (repository, hasher, token and provider
//! traits) that the infrastructure layer implements, plus the use cases
//! built on them. It depends only on `parley-types` -- never on
//! `parley-infra` or any database/IO crate.

pub mod chat;
pub mod llm;
pub mod rate_limit;
pub mod repository;
pub mod service;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;
