//! Chat orchestration: validated user messages, provider completion through
//! the model fallback chain, and atomic persistence of each turn pair.

pub mod service;
