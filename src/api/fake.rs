//! In-memory user service used by the page and app tests

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::oneshot;

use super::{ApiError, UsersApi};
use crate::models::{NewUser, User};

/// Call recorded by [`FakeUsersApi`]
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Fetch,
    Create(NewUser),
    Delete(String),
}

/// Scriptable service double.
///
/// Fetches answer from `users` unless a gate is queued, in which case the
/// fetch waits for the gate's value. Mutations update `users` so a following
/// fetch sees them.
#[derive(Default)]
pub struct FakeUsersApi {
    calls: Mutex<Vec<Call>>,
    users: Mutex<Vec<User>>,
    fetch_gates: Mutex<VecDeque<oneshot::Receiver<Result<Vec<User>, ApiError>>>>,
    mutation_gates: Mutex<VecDeque<oneshot::Receiver<Result<(), ApiError>>>>,
}

impl FakeUsersApi {
    pub fn with_users(users: Vec<User>) -> Self {
        let api = Self::default();
        *api.users.lock().unwrap() = users;
        api
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetch_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Fetch).count()
    }

    pub fn mutation_count(&self) -> usize {
        self.calls().iter().filter(|c| **c != Call::Fetch).count()
    }

    /// Hold the next unscripted fetch until the returned sender fires
    pub fn gate_fetch(&self) -> oneshot::Sender<Result<Vec<User>, ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.fetch_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Hold the next create/delete until the returned sender fires
    pub fn gate_mutation(&self) -> oneshot::Sender<Result<(), ApiError>> {
        let (tx, rx) = oneshot::channel();
        self.mutation_gates.lock().unwrap().push_back(rx);
        tx
    }

    /// Make the next create/delete fail with a 500
    pub fn fail_next_mutation(&self, message: &str) {
        let tx = self.gate_mutation();
        let _ = tx.send(Err(server_error(message)));
    }

    async fn wait_mutation(&self) -> Result<(), ApiError> {
        let gate = self.mutation_gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.unwrap_or(Ok(())),
            None => Ok(()),
        }
    }
}

pub fn server_error(message: &str) -> ApiError {
    ApiError::Status {
        status_code: 500,
        message: message.to_string(),
    }
}

pub fn user(id: &str, email: &str) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        name: None,
    }
}

#[async_trait]
impl UsersApi for FakeUsersApi {
    async fn fetch_users(&self) -> Result<Vec<User>, ApiError> {
        self.calls.lock().unwrap().push(Call::Fetch);
        let gate = self.fetch_gates.lock().unwrap().pop_front();
        match gate {
            Some(rx) => rx.await.unwrap_or_else(|_| Err(server_error("gate dropped"))),
            None => Ok(self.users.lock().unwrap().clone()),
        }
    }

    async fn create_user(&self, user: NewUser) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(Call::Create(user.clone()));
        self.wait_mutation().await?;
        self.users.lock().unwrap().push(User {
            id: user.id,
            email: user.email,
            name: user.name,
        });
        Ok(())
    }

    async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(Call::Delete(id.to_string()));
        self.wait_mutation().await?;
        self.users.lock().unwrap().retain(|u| u.id != id);
        Ok(())
    }
}
