use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::warn;
use uuid::Uuid;

use super::{CreatedWindow, Expense, ExpenseFields, HealthSnapshot, Store, StoreError, User};

const EXPENSE_COLUMNS: &str =
    "id, user_id, name, description, category, amount, created_at, updated_at";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub async fn connect(database_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("connect to database")?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("run migrations")?;
        Ok(())
    }
}

fn backend(e: sqlx::Error, what: &'static str) -> StoreError {
    StoreError::Backend(anyhow::Error::new(e).context(what))
}

#[async_trait]
impl Store for PgStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, password_hash, username, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| backend(e, "find user by email"))
    }

    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        username: &str,
    ) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password_hash, username)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, username, created_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .bind(username)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db_err| db_err.is_unique_violation());
            if duplicate {
                StoreError::DuplicateEmail
            } else {
                backend(e, "insert user")
            }
        })
    }

    async fn create_expense(
        &self,
        user_id: Uuid,
        fields: ExpenseFields,
    ) -> Result<Expense, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO expenses (user_id, name, description, category, amount)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {EXPENSE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Expense>(&sql)
            .bind(user_id)
            .bind(fields.name)
            .bind(fields.description)
            .bind(fields.category)
            .bind(fields.amount)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| backend(e, "insert expense"))
    }

    async fn list_expenses(
        &self,
        user_id: Uuid,
        window: Option<CreatedWindow>,
    ) -> Result<Vec<Expense>, StoreError> {
        let sql = format!(
            r#"
            SELECT {EXPENSE_COLUMNS}
            FROM expenses
            WHERE user_id = $1
              AND ($2::timestamptz IS NULL OR created_at >= $2)
              AND ($3::timestamptz IS NULL OR created_at <= $3)
            ORDER BY created_at DESC
            "#
        );
        sqlx::query_as::<_, Expense>(&sql)
            .bind(user_id)
            .bind(window.map(|w| w.start))
            .bind(window.map(|w| w.end))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| backend(e, "list expenses"))
    }

    async fn update_expense(
        &self,
        user_id: Uuid,
        id: Uuid,
        fields: ExpenseFields,
    ) -> Result<Option<Expense>, StoreError> {
        let sql = format!(
            r#"
            UPDATE expenses
               SET name = $3, description = $4, category = $5, amount = $6, updated_at = now()
             WHERE id = $1 AND user_id = $2
            RETURNING {EXPENSE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .bind(user_id)
            .bind(fields.name)
            .bind(fields.description)
            .bind(fields.category)
            .bind(fields.amount)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend(e, "update expense"))
    }

    async fn delete_expense(&self, user_id: Uuid, id: Uuid) -> Result<Option<Expense>, StoreError> {
        let sql = format!(
            r#"
            DELETE FROM expenses
             WHERE id = $1 AND user_id = $2
            RETURNING {EXPENSE_COLUMNS}
            "#
        );
        sqlx::query_as::<_, Expense>(&sql)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| backend(e, "delete expense"))
    }

    async fn health(&self) -> HealthSnapshot {
        let mut stats = HealthSnapshot::new();
        let ping = tokio::time::timeout(
            Duration::from_secs(1),
            sqlx::query("SELECT 1").execute(&self.pool),
        )
        .await;

        let failure = match ping {
            Ok(Ok(_)) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(_) => Some("ping timed out".to_string()),
        };

        if let Some(error) = failure {
            warn!(%error, "database health check failed");
            stats.insert("status".into(), "down".into());
            stats.insert("message".into(), "database is unreachable".into());
            stats.insert("error".into(), error);
            return stats;
        }

        let open = self.pool.size();
        let idle = self.pool.num_idle() as u32;
        stats.insert("status".into(), "up".into());
        stats.insert("message".into(), "It's healthy".into());
        stats.insert("open_connections".into(), open.to_string());
        stats.insert("idle".into(), idle.to_string());
        stats.insert("in_use".into(), open.saturating_sub(idle).to_string());
        stats.insert(
            "max_connections".into(),
            self.pool.options().get_max_connections().to_string(),
        );
        stats
    }
}
