use anyhow::{Context, Result};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{ItemId, ListId, ListSummary, ToDoItem, ToDoList};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// All lists ordered by name, ties broken by creation order.
    pub async fn list_summaries(&self) -> Result<Vec<ListSummary>> {
        let rows = sqlx::query(
            "SELECT l.id, l.name, COUNT(i.id) AS item_count
             FROM todo_lists l
             LEFT JOIN todo_items i ON i.list_id = l.id
             GROUP BY l.id
             ORDER BY l.name ASC, l.rowid ASC",
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list todo lists")?;

        Ok(rows
            .into_iter()
            .map(|row| ListSummary {
                id: ListId(row.get::<String, _>(0)),
                name: row.get::<String, _>(1),
                item_count: row.get::<i64, _>(2) as u32,
            })
            .collect())
    }

    pub async fn create_list(&self, name: &str) -> Result<ListId> {
        let list_id = ListId::generate();
        sqlx::query("INSERT INTO todo_lists (id, name) VALUES (?, ?)")
            .bind(list_id.as_str())
            .bind(name)
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to insert todo list '{name}'"))?;
        debug!(%list_id, "created todo list");
        Ok(list_id)
    }

    pub async fn get_list(&self, list_id: &ListId) -> Result<Option<ToDoList>> {
        let Some(row) = sqlx::query("SELECT id, name FROM todo_lists WHERE id = ?")
            .bind(list_id.as_str())
            .fetch_optional(&self.pool)
            .await
            .with_context(|| format!("failed to load todo list {list_id}"))?
        else {
            return Ok(None);
        };

        let items = sqlx::query(
            "SELECT id, label, checked FROM todo_items WHERE list_id = ? ORDER BY rowid ASC",
        )
        .bind(list_id.as_str())
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("failed to load items for todo list {list_id}"))?
        .into_iter()
        .map(|item| ToDoItem {
            id: ItemId(item.get::<String, _>(0)),
            label: item.get::<String, _>(1),
            checked: item.get::<bool, _>(2),
        })
        .collect();

        Ok(Some(ToDoList {
            id: ListId(row.get::<String, _>(0)),
            name: row.get::<String, _>(1),
            items,
        }))
    }

    /// Returns whether a list was actually removed.
    pub async fn delete_list(&self, list_id: &ListId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM todo_items WHERE list_id = ?")
            .bind(list_id.as_str())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to delete items of todo list {list_id}"))?;
        let deleted = sqlx::query("DELETE FROM todo_lists WHERE id = ?")
            .bind(list_id.as_str())
            .execute(&mut *tx)
            .await
            .with_context(|| format!("failed to delete todo list {list_id}"))?
            .rows_affected();
        tx.commit().await?;
        Ok(deleted == 1)
    }

    /// Appends an unchecked item; `None` when the list does not exist.
    pub async fn create_item(&self, list_id: &ListId, label: &str) -> Result<Option<ToDoList>> {
        let item_id = ItemId::generate();
        let inserted = sqlx::query(
            "INSERT INTO todo_items (id, list_id, label, checked)
             SELECT ?, id, ?, 0 FROM todo_lists WHERE id = ?",
        )
        .bind(item_id.as_str())
        .bind(label)
        .bind(list_id.as_str())
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to insert item into todo list {list_id}"))?
        .rows_affected();
        if inserted == 0 {
            return Ok(None);
        }
        self.get_list(list_id).await
    }

    pub async fn delete_item(&self, list_id: &ListId, item_id: &ItemId) -> Result<Option<ToDoList>> {
        sqlx::query("DELETE FROM todo_items WHERE list_id = ? AND id = ?")
            .bind(list_id.as_str())
            .bind(item_id.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to delete item {item_id} from todo list {list_id}"))?;
        self.get_list(list_id).await
    }

    pub async fn set_checked_state(
        &self,
        list_id: &ListId,
        item_id: &ItemId,
        checked: bool,
    ) -> Result<Option<ToDoList>> {
        sqlx::query("UPDATE todo_items SET checked = ? WHERE list_id = ? AND id = ?")
            .bind(checked)
            .bind(list_id.as_str())
            .bind(item_id.as_str())
            .execute(&self.pool)
            .await
            .with_context(|| format!("failed to update item {item_id} in todo list {list_id}"))?;
        self.get_list(list_id).await
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
