//! In-memory doubles for the core ports, shared by the unit tests.

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;

use parley_types::auth::{IssuedToken, SessionClaims};
use parley_types::chat::ChatTurn;
use parley_types::error::{AuthError, RepositoryError};
use parley_types::llm::{
    CompletionRequest, CompletionResponse, LlmError, Message, MessageRole, Usage,
};
use parley_types::user::{NewUser, User, UserCredentials, UserId};

use crate::llm::provider::LlmProvider;
use crate::repository::user::UserRepository;
use crate::service::hash::PasswordHasher;
use crate::service::token::TokenService;

// --- Repository ---

#[derive(Default)]
struct Account {
    credentials: Option<UserCredentials>,
    turns: Vec<ChatTurn>,
}

#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    accounts: Arc<Mutex<HashMap<UserId, Account>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn turn_count(&self, id: &UserId) -> usize {
        self.accounts
            .lock()
            .unwrap()
            .get(id)
            .map_or(0, |account| account.turns.len())
    }
}

impl UserRepository for InMemoryUserRepository {
    fn create_user(
        &self,
        user: &NewUser,
    ) -> impl Future<Output = Result<User, RepositoryError>> + Send {
        let result = {
            let mut accounts = self.accounts.lock().unwrap();
            let taken = accounts.values().any(|a| {
                a.credentials
                    .as_ref()
                    .is_some_and(|c| c.user.email.eq_ignore_ascii_case(&user.email))
            });
            if taken {
                Err(RepositoryError::Conflict("users.email".to_string()))
            } else {
                let now = Utc::now();
                let created = User {
                    id: UserId::new(),
                    name: user.name.clone(),
                    email: user.email.clone(),
                    created_at: now,
                    updated_at: now,
                };
                accounts.insert(
                    created.id,
                    Account {
                        credentials: Some(UserCredentials {
                            user: created.clone(),
                            password_hash: user.password_hash.clone(),
                        }),
                        turns: Vec::new(),
                    },
                );
                Ok(created)
            }
        };
        async move { result }
    }

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send {
        let found = self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter_map(|a| a.credentials.as_ref())
            .find(|c| c.user.email == email)
            .map(|c| c.user.clone());
        async move { Ok(found) }
    }

    fn find_credentials(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<UserCredentials>, RepositoryError>> + Send {
        let found = self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter_map(|a| a.credentials.clone())
            .find(|c| c.user.email == email);
        async move { Ok(found) }
    }

    fn find_by_id(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<Option<User>, RepositoryError>> + Send {
        let found = self
            .accounts
            .lock()
            .unwrap()
            .get(id)
            .and_then(|a| a.credentials.as_ref().map(|c| c.user.clone()));
        async move { Ok(found) }
    }

    fn get_turns(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<Vec<ChatTurn>, RepositoryError>> + Send {
        let turns = self
            .accounts
            .lock()
            .unwrap()
            .get(id)
            .map(|a| a.turns.clone())
            .unwrap_or_default();
        async move { Ok(turns) }
    }

    fn append_turns(
        &self,
        id: &UserId,
        turns: &[ChatTurn],
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let result = match self.accounts.lock().unwrap().get_mut(id) {
            Some(account) => {
                account.turns.extend_from_slice(turns);
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        };
        async move { result }
    }

    fn clear_history(
        &self,
        id: &UserId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        let result = match self.accounts.lock().unwrap().get_mut(id) {
            Some(account) => {
                account.turns.clear();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        };
        async move { result }
    }

    fn count_users(&self) -> impl Future<Output = Result<i64, RepositoryError>> + Send {
        let count = self.accounts.lock().unwrap().len() as i64;
        async move { Ok(count) }
    }
}

// --- Hasher ---

#[derive(Clone, Default)]
pub struct FakeHasher {
    verifications: Arc<AtomicUsize>,
}

impl FakeHasher {
    pub fn verifications(&self) -> usize {
        self.verifications.load(Ordering::SeqCst)
    }
}

impl PasswordHasher for FakeHasher {
    fn hash(&self, password: &str) -> Result<String, AuthError> {
        Ok(format!("hashed:{password}"))
    }

    fn verify(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        self.verifications.fetch_add(1, Ordering::SeqCst);
        Ok(hash == format!("hashed:{password}"))
    }
}

// --- Tokens ---

#[derive(Clone, Default)]
pub struct FakeTokenService {
    issued: Arc<Mutex<HashMap<String, SessionClaims>>>,
}

impl TokenService for FakeTokenService {
    fn issue(&self, user_id: &UserId, email: &str, ttl: Duration) -> Result<IssuedToken, AuthError> {
        let now = Utc::now();
        let token_id = uuid::Uuid::now_v7().to_string();
        let claims = SessionClaims {
            user_id: *user_id,
            email: email.to_string(),
            token_id: token_id.clone(),
            issued_at: now,
            expires_at: now
                + chrono::Duration::from_std(ttl).map_err(|e| AuthError::Token(e.to_string()))?,
        };
        let token = format!("token-{token_id}");
        self.issued
            .lock()
            .unwrap()
            .insert(token.clone(), claims.clone());
        Ok(IssuedToken { token, claims })
    }

    fn verify(&self, token: &str) -> Result<SessionClaims, AuthError> {
        self.issued
            .lock()
            .unwrap()
            .get(token)
            .filter(|claims| claims.expires_at > Utc::now())
            .cloned()
            .ok_or(AuthError::InvalidOrExpiredToken)
    }
}

// --- Provider ---

#[derive(Clone)]
pub enum Scripted {
    Reply(String),
    Fail(LlmError),
    Hang,
}

/// Answers per model from a fixed script; unscripted models are "not found".
#[derive(Clone, Default)]
pub struct ScriptedProvider {
    script: HashMap<String, Scripted>,
    calls: Arc<Mutex<Vec<String>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, model: &str, outcome: Scripted) -> Self {
        self.script.insert(model.to_string(), outcome);
        self
    }

    /// Models asked, in call order.
    pub fn calls(&self) -> Arc<Mutex<Vec<String>>> {
        Arc::clone(&self.calls)
    }

    pub fn requests(&self) -> Arc<Mutex<Vec<CompletionRequest>>> {
        Arc::clone(&self.requests)
    }
}

impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<CompletionResponse, LlmError>> + Send {
        self.calls.lock().unwrap().push(request.model.clone());
        self.requests.lock().unwrap().push(request.clone());
        let outcome = self.script.get(&request.model).cloned();
        let model = request.model.clone();
        async move {
            match outcome {
                Some(Scripted::Reply(text)) => Ok(CompletionResponse {
                    content: text,
                    model,
                    finish_reason: Some("STOP".to_string()),
                    usage: Usage {
                        input_tokens: 10,
                        output_tokens: 20,
                    },
                }),
                Some(Scripted::Fail(err)) => Err(err),
                Some(Scripted::Hang) => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Err(LlmError::Unreachable("hung".to_string()))
                }
                None => Err(LlmError::ModelNotFound { model }),
            }
        }
    }
}

pub fn sample_request() -> CompletionRequest {
    CompletionRequest {
        model: String::new(),
        messages: vec![Message {
            role: MessageRole::User,
            content: "hi".to_string(),
        }],
        system: None,
        max_tokens: 1000,
        temperature: Some(0.7),
    }
}
