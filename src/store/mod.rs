//! Persistence seam for users and expenses.
//!
//! Every expense operation takes the owner's id as its first argument; the
//! store never looks up an expense by id alone.

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::FromRow;
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

#[cfg(test)]
pub mod memory;
pub mod postgres;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String, // Argon2 hash
    pub username: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, FromRow)]
pub struct Expense {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// The mutable part of an expense, already validated and defaulted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseFields {
    pub name: String,
    pub description: String,
    pub category: String,
    pub amount: Decimal,
}

/// Inclusive creation-time window for listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreatedWindow {
    pub start: OffsetDateTime,
    pub end: OffsetDateTime,
}

impl CreatedWindow {
    pub fn contains(&self, at: OffsetDateTime) -> bool {
        self.start <= at && at <= self.end
    }
}

pub type HealthSnapshot = BTreeMap<String, String>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        username: &str,
    ) -> Result<User, StoreError>;

    async fn create_expense(
        &self,
        user_id: Uuid,
        fields: ExpenseFields,
    ) -> Result<Expense, StoreError>;

    /// Newest first. `None` lists everything the user owns.
    async fn list_expenses(
        &self,
        user_id: Uuid,
        window: Option<CreatedWindow>,
    ) -> Result<Vec<Expense>, StoreError>;

    /// `Ok(None)` when no expense with this id belongs to the user.
    async fn update_expense(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: ExpenseFields,
    ) -> Result<Option<Expense>, StoreError>;

    /// `Ok(None)` when no expense with this id belongs to the user.
    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> Result<Option<Expense>, StoreError>;

    async fn health(&self) -> HealthSnapshot;
}
