//! Shared domain types for Parley.
//!
//! This crate contains the core domain types used across the Parley server:
//! users, chat turns, session claims, LLM request shapes, tunable settings,
//! and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod auth;
pub mod chat;
pub mod config;
pub mod error;
pub mod llm;
pub mod user;
