use std::{str::FromStr, time::Duration};

use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    FromRow, SqlitePool,
};
use todo_api::v1::{PagedResult, Todo};

use crate::pagination::Pagination;

const COLUMNS: &str = "id, subject, description, done, created_at, updated_at";

/// Durable storage of todos in a single SQLite table.
#[derive(Clone, Debug)]
pub struct TodoStore {
    pool: SqlitePool,
}

/// Content of a todo about to be inserted. `updated_at` starts equal to
/// `created_at`.
#[derive(Clone, Debug)]
pub struct NewTodo {
    pub subject: String,
    pub description: String,
    pub done: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    IdDescending,
    IdAscending,
}

impl Order {
    fn sql(self) -> &'static str {
        match self {
            Order::IdDescending => "id DESC",
            Order::IdAscending => "id ASC",
        }
    }
}

#[derive(FromRow)]
struct TodoRow {
    id: i64,
    subject: String,
    description: String,
    done: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Self {
            id: row.id,
            subject: row.subject,
            description: row.description,
            done: row.done,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl TodoStore {
    /// Opens a pool for `url`.
    ///
    /// An in-memory database only lives as long as its connection, so those
    /// are pinned to one connection that is never recycled.
    pub async fn connect(url: &str) -> Result<Self, sqlx::Error> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = if url.contains(":memory:") || url.contains("mode=memory") {
            SqlitePoolOptions::new()
                .min_connections(1)
                .max_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new().connect_with(options).await?
        };

        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS todos (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                subject     TEXT    NOT NULL,
                description TEXT    NOT NULL,
                done        BOOLEAN NOT NULL DEFAULT FALSE,
                created_at  TEXT    NOT NULL,
                updated_at  TEXT    NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn create(&self, todo: NewTodo) -> Result<Todo, sqlx::Error> {
        let sql = format!(
            "INSERT INTO todos (subject, description, done, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, TodoRow>(&sql)
            .bind(&todo.subject)
            .bind(&todo.description)
            .bind(todo.done)
            .bind(todo.created_at)
            .bind(todo.created_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<Todo>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM todos WHERE id = ?");

        let row = sqlx::query_as::<_, TodoRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Todo::from))
    }

    /// Writes `subject`, `description`, `done` and `updated_at` of `todo`.
    /// `created_at` is never written. Returns `None` when the row is gone.
    pub async fn update(&self, todo: &Todo) -> Result<Option<Todo>, sqlx::Error> {
        let sql = format!(
            "UPDATE todos SET subject = ?, description = ?, done = ?, updated_at = ? \
             WHERE id = ? RETURNING {COLUMNS}"
        );

        let row = sqlx::query_as::<_, TodoRow>(&sql)
            .bind(&todo.subject)
            .bind(&todo.description)
            .bind(todo.done)
            .bind(todo.updated_at)
            .bind(todo.id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Todo::from))
    }

    /// Returns `false` when there was no such row.
    pub async fn delete(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub fn list_ordered(&self, order: Order) -> TodoQuery<'_> {
        TodoQuery {
            pool: &self.pool,
            order,
        }
    }
}

/// All todos in a fixed order. Nothing runs until one of the fetch methods
/// is awaited.
#[derive(Clone, Copy, Debug)]
pub struct TodoQuery<'a> {
    pool: &'a SqlitePool,
    order: Order,
}

impl TodoQuery<'_> {
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM todos")
            .fetch_one(self.pool)
            .await
    }

    pub async fn fetch_all(&self) -> Result<Vec<Todo>, sqlx::Error> {
        let sql = format!("SELECT {COLUMNS} FROM todos ORDER BY {}", self.order.sql());

        let rows = sqlx::query_as::<_, TodoRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    pub async fn fetch_slice(&self, offset: i64, limit: i64) -> Result<Vec<Todo>, sqlx::Error> {
        let sql = format!(
            "SELECT {COLUMNS} FROM todos ORDER BY {} LIMIT ? OFFSET ?",
            self.order.sql()
        );

        let rows = sqlx::query_as::<_, TodoRow>(&sql)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Todo::from).collect())
    }

    /// Counts the whole query, then fetches the requested page of it.
    pub async fn paginate(
        &self,
        pagination: Pagination,
    ) -> Result<PagedResult<Todo>, sqlx::Error> {
        let total = self.count().await?;
        let items = self
            .fetch_slice(pagination.offset(), pagination.limit())
            .await?;

        Ok(PagedResult::new(
            items,
            total,
            pagination.page(),
            pagination.page_size(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> TodoStore {
        let store = TodoStore::connect("sqlite::memory:").await.unwrap();
        store.migrate().await.unwrap();
        store
    }

    fn subjects(todos: &[Todo]) -> Vec<String> {
        todos.iter().map(|todo| todo.subject.clone()).collect()
    }

    fn new_todo(subject: &str) -> NewTodo {
        NewTodo {
            subject: subject.to_string(),
            description: format!("{subject} description"),
            done: false,
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_assigns_id_and_timestamps() {
        let store = store().await;
        let input = new_todo("Water plants");
        let created_at = input.created_at;

        let todo = store.create(input).await.unwrap();

        assert!(todo.id > 0);
        assert_eq!(todo.subject, "Water plants");
        assert_eq!(todo.created_at, created_at);
        assert_eq!(todo.updated_at, created_at);
    }

    #[tokio::test]
    async fn find_by_id_misses_unknown_id() {
        let store = store().await;
        assert!(store.find_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_keeps_created_at() {
        let store = store().await;
        let mut todo = store.create(new_todo("Draft")).await.unwrap();
        let created_at = todo.created_at;

        todo.subject = String::from("Final");
        todo.done = true;
        todo.created_at = Utc::now() + chrono::Duration::days(1);
        todo.updated_at = Utc::now() + chrono::Duration::seconds(1);
        let updated = store.update(&todo).await.unwrap().unwrap();

        assert_eq!(updated.subject, "Final");
        assert!(updated.done);
        assert_eq!(updated.created_at, created_at);
        assert_eq!(updated.updated_at, todo.updated_at);
    }

    #[tokio::test]
    async fn update_of_missing_row_is_none() {
        let store = store().await;
        let mut todo = store.create(new_todo("Gone")).await.unwrap();
        assert!(store.delete(todo.id).await.unwrap());

        todo.subject = String::from("Still gone");
        assert!(store.update(&todo).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_reports_missing_row() {
        let store = store().await;
        let todo = store.create(new_todo("Once")).await.unwrap();

        assert!(store.delete(todo.id).await.unwrap());
        assert!(!store.delete(todo.id).await.unwrap());
    }

    #[tokio::test]
    async fn ids_are_not_reused() {
        let store = store().await;
        let first = store.create(new_todo("First")).await.unwrap();
        store.delete(first.id).await.unwrap();

        let second = store.create(new_todo("Second")).await.unwrap();
        assert!(second.id > first.id);
    }

    #[tokio::test]
    async fn list_ordered_respects_order() {
        let store = store().await;
        for subject in ["a", "b", "c"] {
            store.create(new_todo(subject)).await.unwrap();
        }

        let descending = store
            .list_ordered(Order::IdDescending)
            .fetch_all()
            .await
            .unwrap();
        let ascending = store
            .list_ordered(Order::IdAscending)
            .fetch_all()
            .await
            .unwrap();

        assert_eq!(subjects(&descending), ["c", "b", "a"]);
        assert_eq!(subjects(&ascending), ["a", "b", "c"]);
    }

    #[tokio::test]
    async fn paginate_counts_all_rows() {
        let store = store().await;
        for i in 1..=7 {
            store.create(new_todo(&format!("Todo {i}"))).await.unwrap();
        }

        let page = store
            .list_ordered(Order::default())
            .paginate(Pagination::new(2, 3))
            .await
            .unwrap();

        assert_eq!(page.total, 7);
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.items[0].subject, "Todo 4");
        assert_eq!(page.from, 4);
        assert_eq!(page.to, 6);
        assert_eq!(page.total_page, 3);
    }
}
