use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CreatedWindow, Expense, ExpenseFields, HealthSnapshot, Store, StoreError, User};

/// In-process store backing the handler tests.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<Vec<User>>,
    expenses: RwLock<Vec<Expense>>,
    broken: AtomicBool,
}

impl MemoryStore {
    /// Every subsequent call fails with a backend error.
    pub fn break_backend(&self) {
        self.broken.store(true, Ordering::SeqCst);
    }

    pub async fn users(&self) -> Vec<User> {
        self.users.read().await.clone()
    }

    pub async fn expenses(&self) -> Vec<Expense> {
        self.expenses.read().await.clone()
    }

    /// Inserts an expense with an explicit creation time.
    pub async fn insert_expense_at(
        &self,
        user_id: Uuid,
        fields: ExpenseFields,
        created_at: OffsetDateTime,
    ) -> Expense {
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id,
            name: fields.name,
            description: fields.description,
            category: fields.category,
            amount: fields.amount,
            created_at,
            updated_at: created_at,
        };
        self.expenses.write().await.push(expense.clone());
        expense
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.broken.load(Ordering::SeqCst) {
            return Err(StoreError::Backend(anyhow::anyhow!("connection refused")));
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        self.check()?;
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        username: &str,
    ) -> Result<User, StoreError> {
        self.check()?;
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            username: username.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn create_expense(
        &self,
        user_id: Uuid,
        fields: ExpenseFields,
    ) -> Result<Expense, StoreError> {
        self.check()?;
        Ok(self
            .insert_expense_at(user_id, fields, OffsetDateTime::now_utc())
            .await)
    }

    async fn list_expenses(
        &self,
        user_id: Uuid,
        window: Option<CreatedWindow>,
    ) -> Result<Vec<Expense>, StoreError> {
        self.check()?;
        let mut rows: Vec<Expense> = self
            .expenses
            .read()
            .await
            .iter()
            .filter(|e| e.user_id == user_id)
            .filter(|e| window.map_or(true, |w| w.contains(e.created_at)))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn update_expense(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: ExpenseFields,
    ) -> Result<Option<Expense>, StoreError> {
        self.check()?;
        let mut expenses = self.expenses.write().await;
        let Some(row) = expenses
            .iter_mut()
            .find(|e| e.id == id && e.user_id == user_id)
        else {
            return Ok(None);
        };
        row.name = fields.name;
        row.description = fields.description;
        row.category = fields.category;
        row.amount = fields.amount;
        row.updated_at = OffsetDateTime::now_utc();
        Ok(Some(row.clone()))
    }

    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> Result<Option<Expense>, StoreError> {
        self.check()?;
        let mut expenses = self.expenses.write().await;
        let pos = expenses
            .iter()
            .position(|e| e.id == id && e.user_id == user_id);
        Ok(pos.map(|i| expenses.remove(i)))
    }

    async fn health(&self) -> HealthSnapshot {
        let mut stats = HealthSnapshot::new();
        if self.broken.load(Ordering::SeqCst) {
            stats.insert("status".into(), "down".into());
            stats.insert("message".into(), "database is unreachable".into());
            return stats;
        }
        stats.insert("status".into(), "up".into());
        stats.insert("message".into(), "It's healthy".into());
        stats
    }
}
