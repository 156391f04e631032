// src/db.rs
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{FromRow, SqliteConnection};
use tracing::{debug, info};

use crate::error::StoreError;
use crate::models::{Note, NoteDraft, Tag};
use crate::store::NoteStore;

// --- 初始化 ---
pub async fn init_db(database_url: &str) -> Result<SqlitePool, StoreError> {
    info!(%database_url, "connecting to database");

    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // 每个 :memory: 连接都是独立的数据库，只能保留一个连接
    let pool = if database_url.contains(":memory:") {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect_with(options)
            .await?
    } else {
        SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?
    };
    Ok(pool)
}

// --- 迁移 ---
pub async fn migrate(pool: &SqlitePool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("database migrations applied");
    Ok(())
}

#[derive(FromRow)]
struct NoteRow {
    id: i64,
    title: String,
    body: String,
}

/// `NoteStore` over a SQLite pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn load_tag_ids(&self, note_id: i64) -> Result<Vec<i64>, StoreError> {
        let ids = sqlx::query_scalar::<_, i64>(
            "SELECT tag_id FROM note_tags WHERE note_id = ?1 ORDER BY position",
        )
        .bind(note_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }

    async fn hydrate(&self, rows: Vec<NoteRow>) -> Result<Vec<Note>, StoreError> {
        let mut notes = Vec::with_capacity(rows.len());
        for row in rows {
            let tag_ids = self.load_tag_ids(row.id).await?;
            notes.push(Note {
                id: row.id,
                title: row.title,
                body: row.body,
                tag_ids,
            });
        }
        Ok(notes)
    }
}

async fn write_tag_refs(
    conn: &mut SqliteConnection,
    note_id: i64,
    tag_ids: &[i64],
) -> Result<(), StoreError> {
    sqlx::query("DELETE FROM note_tags WHERE note_id = ?1")
        .bind(note_id)
        .execute(&mut *conn)
        .await?;

    for (position, tag_id) in tag_ids.iter().enumerate() {
        sqlx::query("INSERT INTO note_tags (note_id, tag_id, position) VALUES (?1, ?2, ?3)")
            .bind(note_id)
            .bind(*tag_id)
            .bind(position as i64)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[async_trait]
impl NoteStore for SqliteStore {
    async fn find_all_notes(&self) -> Result<Vec<Note>, StoreError> {
        let rows = sqlx::query_as::<_, NoteRow>("SELECT id, title, body FROM notes ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        self.hydrate(rows).await
    }

    async fn find_note(&self, id: i64) -> Result<Option<Note>, StoreError> {
        let row = sqlx::query_as::<_, NoteRow>("SELECT id, title, body FROM notes WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn insert_note(&self, draft: NoteDraft) -> Result<Note, StoreError> {
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO notes (title, body) VALUES (?1, ?2)")
            .bind(&draft.title)
            .bind(&draft.body)
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();
        write_tag_refs(&mut tx, id, &draft.tag_ids).await?;

        tx.commit().await?;
        debug!(note_id = id, "note inserted");

        Ok(Note {
            id,
            title: draft.title,
            body: draft.body,
            tag_ids: draft.tag_ids,
        })
    }

    async fn update_note(&self, note: &Note) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let rows_affected = sqlx::query("UPDATE notes SET title = ?1, body = ?2 WHERE id = ?3")
            .bind(&note.title)
            .bind(&note.body)
            .bind(note.id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        // deleted concurrently: last write loses, nothing to save
        if rows_affected == 0 {
            debug!(note_id = note.id, "update skipped, note no longer exists");
            return Ok(());
        }

        write_tag_refs(&mut tx, note.id, &note.tag_ids).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn delete_note(&self, id: i64) -> Result<(), StoreError> {
        let rows_affected = sqlx::query("DELETE FROM notes WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        debug!(note_id = id, rows_affected, "note delete");
        Ok(())
    }

    async fn find_tag(&self, id: i64) -> Result<Option<Tag>, StoreError> {
        let tag = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(tag)
    }

    async fn find_all_tags(&self) -> Result<Vec<Tag>, StoreError> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name FROM tags ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(tags)
    }

    async fn insert_tag(&self, name: String) -> Result<Tag, StoreError> {
        let id = sqlx::query("INSERT INTO tags (name) VALUES (?1)")
            .bind(&name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();
        Ok(Tag { id, name })
    }

    async fn find_notes_by_tag(&self, tag_id: i64) -> Result<Vec<Note>, StoreError> {
        let rows = sqlx::query_as::<_, NoteRow>(
            r#"
            SELECT DISTINCT n.id, n.title, n.body
            FROM notes n
            JOIN note_tags nt ON nt.note_id = n.id
            WHERE nt.tag_id = ?1
            ORDER BY n.id
            "#,
        )
        .bind(tag_id)
        .fetch_all(&self.pool)
        .await?;
        self.hydrate(rows).await
    }
}
