// Todo persistence: PostgreSQL in production, an in-memory table for tests.

use async_trait::async_trait;
use parking_lot::RwLock;
use sqlx::PgPool;
use tracing::{debug, info};

use super::model::Todo;
use crate::error::StorageError;

#[async_trait]
pub trait TodoStore: Send + Sync {
    /// All todos, ordered by id.
    async fn list(&self) -> Result<Vec<Todo>, StorageError>;

    /// Store `text` and return the record with its assigned id.
    async fn create(&self, text: &str) -> Result<Todo, StorageError>;
}

pub struct PgTodoStore {
    pool: PgPool,
}

impl PgTodoStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create the `todo` table if it does not exist.
    pub async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todo (
                id SERIAL PRIMARY KEY,
                todo TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;
        info!("todo table ready");
        Ok(())
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl TodoStore for PgTodoStore {
    async fn list(&self) -> Result<Vec<Todo>, StorageError> {
        let rows = sqlx::query_as::<_, (i32, String)>("SELECT id, todo FROM todo ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        debug!("loaded {} todos", rows.len());
        Ok(rows.into_iter().map(|(id, text)| Todo { id, text }).collect())
    }

    async fn create(&self, text: &str) -> Result<Todo, StorageError> {
        let (id, text) =
            sqlx::query_as::<_, (i32, String)>("INSERT INTO todo (todo) VALUES ($1) RETURNING id, todo")
                .bind(text)
                .fetch_one(&self.pool)
                .await?;
        Ok(Todo { id, text })
    }
}

/// Process-local store with the same id semantics as a `SERIAL` column.
#[derive(Default)]
pub struct MemoryTodoStore {
    rows: RwLock<Vec<Todo>>,
}

impl MemoryTodoStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl TodoStore for MemoryTodoStore {
    async fn list(&self) -> Result<Vec<Todo>, StorageError> {
        Ok(self.rows.read().clone())
    }

    async fn create(&self, text: &str) -> Result<Todo, StorageError> {
        let mut rows = self.rows.write();
        let id = rows.last().map_or(1, |t| t.id + 1);
        let todo = Todo {
            id,
            text: text.to_string(),
        };
        rows.push(todo.clone());
        Ok(todo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_store_assigns_increasing_ids() {
        let store = MemoryTodoStore::new();
        assert!(store.is_empty());

        let a = store.create("first").await.unwrap();
        let b = store.create("second").await.unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);

        let all = store.list().await.unwrap();
        assert_eq!(all, vec![a, b]);
        assert_eq!(store.len(), 2);
    }
}
