//! SQLite storage engine.
//!
//! Rows are decoded by `sqlx` into [`TodoRecord`] / [`CategoryRecord`] and
//! converted to domain values. Ids are stored as 16-byte UUID blobs and
//! timestamps as RFC 3339 text with full nanosecond precision. A column that
//! fails to decode is reported as [`RepositoryError::Corrupt`].
//!
//! # Example
//!
//! ```no_run
//! use checklist::sqlite::SqliteTodoRepository;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let repository = SqliteTodoRepository::connect("sqlite://checklist.db?mode=rwc", 1).await?;
//! # Ok(())
//! # }
//! ```

use crate::repository::{RepositoryError, Result, TodoRepository};
use crate::types::{Category, CategoryId, Todo, TodoId};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use uuid::Uuid;

const TODO_COLUMNS: &str =
    "id, title, is_completed, created_at, due_date, reminder_date, notes, category_id";

const CATEGORY_COLUMNS: &str = "id, name, color_hex, icon_name";

/// A `todos` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TodoRecord {
    id: Uuid,
    title: String,
    is_completed: bool,
    created_at: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
    reminder_date: Option<DateTime<Utc>>,
    notes: Option<String>,
    category_id: Option<Uuid>,
}

/// A `categories` row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRecord {
    id: Uuid,
    name: String,
    color_hex: String,
    icon_name: Option<String>,
}

impl From<TodoRecord> for Todo {
    fn from(record: TodoRecord) -> Self {
        Self {
            id: TodoId::from_uuid(record.id),
            title: record.title,
            is_completed: record.is_completed,
            created_at: record.created_at,
            due_date: record.due_date,
            reminder_date: record.reminder_date,
            notes: record.notes,
            category_id: record.category_id.map(CategoryId::from_uuid),
        }
    }
}

impl From<CategoryRecord> for Category {
    fn from(record: CategoryRecord) -> Self {
        Self {
            id: CategoryId::from_uuid(record.id),
            name: record.name,
            color_hex: record.color_hex,
            icon_name: record.icon_name,
        }
    }
}

fn storage_error(operation: &'static str) -> impl FnOnce(sqlx::Error) -> RepositoryError {
    move |e| match &e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            RepositoryError::Storage(format!("{operation}: id already exists"))
        },
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
            RepositoryError::Corrupt(format!("{operation}: {e}"))
        },
        _ => RepositoryError::Storage(format!("{operation}: {e}")),
    }
}

/// `SQLite` todo repository.
///
/// Each operation is a single statement, except category deletion which
/// unlinks todos and deletes the category in one transaction.
#[derive(Debug, Clone)]
pub struct SqliteTodoRepository {
    pool: SqlitePool,
}

impl SqliteTodoRepository {
    /// Wrap an existing pool. Call [`Self::migrate`] before first use.
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open a pool on `url` and run migrations.
    ///
    /// Use `max_connections = 1` with `sqlite::memory:`, since every
    /// connection to an in-memory URL opens its own database.
    ///
    /// # Errors
    ///
    /// Returns [`RepositoryError::Storage`] if the database cannot be opened
    /// or migrated.
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect(url)
            .await
            .map_err(storage_error("connect"))?;

        let repository = Self::new(pool);
        repository.migrate().await?;
        Ok(repository)
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Storage(format!("Migration failed: {e}")))?;
        Ok(())
    }

    /// Close the pool
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

impl TodoRepository for SqliteTodoRepository {
    async fn fetch_todos(&self) -> Result<Vec<Todo>> {
        let records: Vec<TodoRecord> = sqlx::query_as(&format!(
            "SELECT {TODO_COLUMNS} FROM todos ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("fetch todos"))?;

        Ok(records.into_iter().map(Todo::from).collect())
    }

    async fn fetch_categories(&self) -> Result<Vec<Category>> {
        let records: Vec<CategoryRecord> = sqlx::query_as(&format!(
            "SELECT {CATEGORY_COLUMNS} FROM categories ORDER BY name ASC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error("fetch categories"))?;

        Ok(records.into_iter().map(Category::from).collect())
    }

    async fn save_todo(&self, todo: Todo) -> Result<Todo> {
        // An unknown category id selects no row and is stored as NULL
        let record: TodoRecord = sqlx::query_as(&format!(
            r"
            INSERT INTO todos
                (id, title, is_completed, created_at, due_date, reminder_date, notes, category_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, (SELECT id FROM categories WHERE id = ?))
            RETURNING {TODO_COLUMNS}
            "
        ))
        .bind(*todo.id.as_uuid())
        .bind(&todo.title)
        .bind(todo.is_completed)
        .bind(todo.created_at)
        .bind(todo.due_date)
        .bind(todo.reminder_date)
        .bind(&todo.notes)
        .bind(todo.category_id.map(|id| *id.as_uuid()))
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("save todo"))?;

        Ok(Todo::from(record))
    }

    async fn update_todo(&self, todo: Todo) -> Result<Todo> {
        let record: Option<TodoRecord> = sqlx::query_as(&format!(
            r"
            UPDATE todos
            SET title = ?,
                is_completed = ?,
                due_date = ?,
                reminder_date = ?,
                notes = ?,
                category_id = (SELECT id FROM categories WHERE id = ?)
            WHERE id = ?
            RETURNING {TODO_COLUMNS}
            "
        ))
        .bind(&todo.title)
        .bind(todo.is_completed)
        .bind(todo.due_date)
        .bind(todo.reminder_date)
        .bind(&todo.notes)
        .bind(todo.category_id.map(|id| *id.as_uuid()))
        .bind(*todo.id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error("update todo"))?;

        record
            .map(Todo::from)
            .ok_or(RepositoryError::TodoNotFound(todo.id))
    }

    async fn delete_todo(&self, id: TodoId) -> Result<()> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage_error("delete todo"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::TodoNotFound(id));
        }
        Ok(())
    }

    async fn save_category(&self, category: Category) -> Result<Category> {
        let record: CategoryRecord = sqlx::query_as(&format!(
            "INSERT INTO categories (id, name, color_hex, icon_name) VALUES (?, ?, ?, ?) \
             RETURNING {CATEGORY_COLUMNS}"
        ))
        .bind(*category.id.as_uuid())
        .bind(&category.name)
        .bind(&category.color_hex)
        .bind(&category.icon_name)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error("save category"))?;

        Ok(Category::from(record))
    }

    async fn delete_category(&self, id: CategoryId) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(storage_error("delete category"))?;

        let unlinked = sqlx::query("UPDATE todos SET category_id = NULL WHERE category_id = ?")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(storage_error("unlink todos"))?
            .rows_affected();
        tracing::debug!(%id, unlinked, "Unlinked todos from category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(storage_error("delete category"))?;

        if result.rows_affected() == 0 {
            // Dropping the transaction rolls it back
            return Err(RepositoryError::CategoryNotFound(id));
        }

        tx.commit().await.map_err(storage_error("delete category"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    async fn repository() -> SqliteTodoRepository {
        match SqliteTodoRepository::connect("sqlite::memory:", 1).await {
            Ok(repository) => repository,
            Err(e) => unreachable!("in-memory database must open: {e}"),
        }
    }

    fn base_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 8, 30, 0)
            .single()
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn save_and_fetch_orders() -> Result<()> {
        let repo = repository().await;
        let old = Todo::new(TodoId::new(), "old", base_time());
        let new = Todo::new(TodoId::new(), "new", base_time() + Duration::minutes(1));
        repo.save_todo(old.clone()).await?;
        repo.save_todo(new.clone()).await?;

        repo.save_category(Category::new(CategoryId::new(), "Work")).await?;
        repo.save_category(Category::new(CategoryId::new(), "Errands")).await?;

        assert_eq!(repo.fetch_todos().await?, vec![new, old]);
        let names: Vec<String> = repo
            .fetch_categories()
            .await?
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["Errands", "Work"]);
        Ok(())
    }

    #[tokio::test]
    async fn round_trip_preserves_every_field() -> Result<()> {
        let repo = repository().await;
        let work = repo
            .save_category(Category {
                icon_name: Some("briefcase".to_string()),
                ..Category::new(CategoryId::new(), "Work")
            })
            .await?;

        let mut todo = Todo::new(TodoId::new(), "Quarterly report", base_time())
            .with_category(Some(work.id))
            .with_due_date(base_time() + Duration::days(2));
        todo.reminder_date = Some(base_time() + Duration::days(1));
        todo.notes = Some("numbers from finance".to_string());

        let saved = repo.save_todo(todo.clone()).await?;
        assert_eq!(saved, todo);
        assert_eq!(repo.update_todo(saved).await?, todo);
        Ok(())
    }

    #[tokio::test]
    async fn unknown_category_is_stored_unlinked() -> Result<()> {
        let repo = repository().await;
        let todo = Todo::new(TodoId::new(), "orphan", base_time())
            .with_category(Some(CategoryId::new()));

        assert_eq!(repo.save_todo(todo.clone()).await?.category_id, None);
        assert_eq!(repo.update_todo(todo).await?.category_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn update_overwrites_but_keeps_created_at() -> Result<()> {
        let repo = repository().await;
        let todo = Todo::new(TodoId::new(), "draft", base_time());
        repo.save_todo(todo.clone()).await?;

        let mut changed = todo.clone();
        changed.title = "final".to_string();
        changed.is_completed = true;
        changed.created_at = base_time() + Duration::days(30);

        let updated = repo.update_todo(changed).await?;
        assert_eq!(updated.title, "final");
        assert!(updated.is_completed);
        assert_eq!(updated.created_at, todo.created_at);
        Ok(())
    }

    #[tokio::test]
    async fn missing_rows_are_reported() {
        let repo = repository().await;
        let todo = Todo::new(TodoId::new(), "ghost", base_time());
        let category = CategoryId::new();

        assert_eq!(
            repo.update_todo(todo.clone()).await,
            Err(RepositoryError::TodoNotFound(todo.id))
        );
        assert_eq!(
            repo.delete_todo(todo.id).await,
            Err(RepositoryError::TodoNotFound(todo.id))
        );
        assert_eq!(
            repo.delete_category(category).await,
            Err(RepositoryError::CategoryNotFound(category))
        );
    }

    #[tokio::test]
    async fn duplicate_id_is_a_storage_error() -> Result<()> {
        let repo = repository().await;
        let todo = Todo::new(TodoId::new(), "once", base_time());
        repo.save_todo(todo.clone()).await?;

        assert!(matches!(
            repo.save_todo(todo).await,
            Err(RepositoryError::Storage(_))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn delete_category_unlinks_todos() -> Result<()> {
        let repo = repository().await;
        let work = repo.save_category(Category::new(CategoryId::new(), "Work")).await?;
        let todo = repo
            .save_todo(Todo::new(TodoId::new(), "report", base_time()).with_category(Some(work.id)))
            .await?;

        repo.delete_category(work.id).await?;

        let todos = repo.fetch_todos().await?;
        assert_eq!(todos.len(), 1);
        assert_eq!(todos[0].id, todo.id);
        assert_eq!(todos[0].category_id, None);
        assert!(repo.fetch_categories().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn delete_todo_removes_only_that_row() -> Result<()> {
        let repo = repository().await;
        let keep = repo.save_todo(Todo::new(TodoId::new(), "keep", base_time())).await?;
        let drop = repo.save_todo(Todo::new(TodoId::new(), "drop", base_time())).await?;

        repo.delete_todo(drop.id).await?;

        assert_eq!(repo.fetch_todos().await?, vec![keep]);
        Ok(())
    }

    #[tokio::test]
    async fn timestamps_keep_nanoseconds() -> Result<()> {
        let repo = repository().await;
        let precise = base_time() + Duration::nanoseconds(123_456_789);

        let mut todo = Todo::new(TodoId::new(), "precise", precise).with_due_date(precise);
        todo.reminder_date = Some(precise + Duration::nanoseconds(1));

        let saved = repo.save_todo(todo.clone()).await?;
        assert_eq!(saved, todo);
        assert_eq!(repo.update_todo(saved).await?, todo);
        Ok(())
    }

    #[tokio::test]
    async fn fractional_seconds_sort_by_time() -> Result<()> {
        let repo = repository().await;
        let whole = Todo::new(TodoId::new(), "whole", base_time());
        let at = |offset: Duration| base_time() + offset;
        let millis = Todo::new(TodoId::new(), "millis", at(Duration::milliseconds(500)));
        let nanos = Todo::new(TodoId::new(), "nanos", at(Duration::nanoseconds(123_456_789)));
        for todo in [&millis, &whole, &nanos] {
            repo.save_todo(todo.clone()).await?;
        }

        assert_eq!(repo.fetch_todos().await?, vec![millis, nanos, whole]);
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_rows_are_corrupt() -> Result<()> {
        let repo = repository().await;
        sqlx::query(
            "INSERT INTO todos (id, title, is_completed, created_at) \
             VALUES ('not-a-uuid', 'x', 0, 'yesterday')",
        )
        .execute(&repo.pool)
        .await
        .map_err(storage_error("seed"))?;

        assert!(matches!(repo.fetch_todos().await, Err(RepositoryError::Corrupt(_))));
        Ok(())
    }
}
