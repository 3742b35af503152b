//! Infrastructure layer for Parley.
//!
//! Contains implementations of the ports defined in `parley-core`:
//! SQLite storage, Argon2id password hashing, HS256 session tokens, and the
//! Gemini REST provider. Also owns configuration loading.

pub mod config;
pub mod crypto;
pub mod llm;
pub mod sqlite;
