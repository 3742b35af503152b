//! Chat service orchestrating one user message through the provider and
//! into the stored conversation.
//!
//! Sends for the same user are serialized by a per-user async mutex so two
//! concurrent requests can never both build on the same prior history.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{info, warn};

use parley_types::chat::ChatTurn;
use parley_types::error::ChatError;
use parley_types::llm::{CompletionRequest, Message};
use parley_types::user::UserId;

use crate::llm::fallback::ModelFallbackChain;
use crate::repository::user::UserRepository;
use crate::validation::validate_chat_message;

/// Generation parameters applied to every completion request.
#[derive(Debug, Clone, Copy)]
pub struct GenerationOptions {
    pub max_output_tokens: u32,
    pub temperature: Option<f64>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_output_tokens: 1000,
            temperature: Some(0.7),
        }
    }
}

/// Orchestrates chat turns for authenticated users.
///
/// Generic over `UserRepository` to maintain clean architecture
/// (parley-core never depends on parley-infra).
pub struct ChatService<R: UserRepository> {
    repo: R,
    chain: ModelFallbackChain,
    options: GenerationOptions,
    locks: DashMap<UserId, Arc<Mutex<()>>>,
}

impl<R: UserRepository> ChatService<R> {
    pub fn new(repo: R, chain: ModelFallbackChain, options: GenerationOptions) -> Self {
        Self {
            repo,
            chain,
            options,
            locks: DashMap::new(),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn chain(&self) -> &ModelFallbackChain {
        &self.chain
    }

    /// Send `raw_message` on behalf of `user_id` and return the updated history.
    ///
    /// The message is validated before storage or the provider is touched.
    /// On any failure the stored history is left exactly as it was.
    pub async fn send_message(
        &self,
        user_id: &UserId,
        raw_message: &str,
    ) -> Result<Vec<ChatTurn>, ChatError> {
        let message = validate_chat_message(raw_message)?;

        let lock = self.user_lock(user_id);
        let result = {
            let _guard = lock.lock().await;
            self.send_locked(user_id, message).await
        };
        drop(lock);
        self.locks
            .remove_if(user_id, |_, lock| Arc::strong_count(lock) == 1);

        result
    }

    async fn send_locked(
        &self,
        user_id: &UserId,
        message: String,
    ) -> Result<Vec<ChatTurn>, ChatError> {
        if self.repo.find_by_id(user_id).await?.is_none() {
            return Err(ChatError::UserNotFound);
        }
        let mut history = self.repo.get_turns(user_id).await?;
        let user_turn = ChatTurn::user(message, Utc::now());

        let request = self.build_request(&history, &user_turn);
        let result = self.chain.complete(&request).await.inspect_err(|e| {
            warn!(user_id = %user_id, error = %e, "chat completion failed");
        })?;

        let assistant_turn = ChatTurn::assistant(result.response.content, Utc::now());
        let pair = [user_turn, assistant_turn];
        self.repo.append_turns(user_id, &pair).await?;

        info!(
            user_id = %user_id,
            model = %result.model,
            attempts = result.attempts,
            turns = history.len() + pair.len(),
            "chat turn stored"
        );

        history.extend(pair);
        Ok(history)
    }

    fn build_request(&self, history: &[ChatTurn], next: &ChatTurn) -> CompletionRequest {
        let messages = history
            .iter()
            .chain(std::iter::once(next))
            .map(|turn| Message {
                role: turn.role,
                content: turn.content.clone(),
            })
            .collect();

        CompletionRequest {
            model: String::new(),
            messages,
            system: None,
            max_tokens: self.options.max_output_tokens,
            temperature: self.options.temperature,
        }
    }

    pub async fn get_history(&self, user_id: &UserId) -> Result<Vec<ChatTurn>, ChatError> {
        Ok(self.repo.get_turns(user_id).await?)
    }

    /// Empty the user's history. Waits for an in-flight send to finish first.
    pub async fn clear_history(&self, user_id: &UserId) -> Result<(), ChatError> {
        let lock = self.user_lock(user_id);
        let result = {
            let _guard = lock.lock().await;
            self.repo.clear_history(user_id).await
        };
        drop(lock);
        self.locks
            .remove_if(user_id, |_, lock| Arc::strong_count(lock) == 1);

        result?;
        info!(user_id = %user_id, "chat history cleared");
        Ok(())
    }

    fn user_lock(&self, user_id: &UserId) -> Arc<Mutex<()>> {
        Arc::clone(self.locks.entry(*user_id).or_default().value())
    }

    /// Number of users with a send or clear in progress.
    pub fn active_users(&self) -> usize {
        self.locks.len()
    }
}
