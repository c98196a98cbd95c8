//! Get-or-create statements for users and tags.
//!
//! A name is inserted with `ON CONFLICT ... DO NOTHING`. When the row already
//! exists nothing comes back from `RETURNING` and the id is read with a plain
//! `SELECT`, so an existing user or tag is never row-locked. Concurrent
//! creators of the same new name are serialized by the unique constraint.

use crate::postgres::map_sqlx_error;
use chirper_core::Result;
use sqlx::PgConnection;

/// Returns the id of the user named `username`, creating the user if needed.
pub(crate) async fn get_or_create_user(conn: &mut PgConnection, username: &str) -> Result<i32> {
    let inserted = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO users (username)
        VALUES ($1)
        ON CONFLICT (username) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(username)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    match inserted {
        Some(id) => Ok(id),
        None => sqlx::query_scalar::<_, i32>("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&mut *conn)
            .await
            .map_err(map_sqlx_error),
    }
}

/// Returns the id of the tag named `name`, creating the tag if needed.
pub(crate) async fn get_or_create_tag(conn: &mut PgConnection, name: &str) -> Result<i32> {
    let inserted = sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO tags (name)
        VALUES ($1)
        ON CONFLICT (name) DO NOTHING
        RETURNING id
        "#,
    )
    .bind(name)
    .fetch_optional(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    match inserted {
        Some(id) => Ok(id),
        None => sqlx::query_scalar::<_, i32>("SELECT id FROM tags WHERE name = $1")
            .bind(name)
            .fetch_one(&mut *conn)
            .await
            .map_err(map_sqlx_error),
    }
}

/// Inserts a chirp owned by `author_id` and returns its id.
pub(crate) async fn insert_chirp(
    conn: &mut PgConnection,
    author_id: i32,
    message: &str,
) -> Result<i32> {
    sqlx::query_scalar::<_, i32>(
        r#"
        INSERT INTO chirps (author_id, message)
        VALUES ($1, $2)
        RETURNING id
        "#,
    )
    .bind(author_id)
    .bind(message)
    .fetch_one(&mut *conn)
    .await
    .map_err(map_sqlx_error)
}

/// Links a chirp to a tag. Linking the same pair twice is a no-op.
pub(crate) async fn link_tag(conn: &mut PgConnection, chirp_id: i32, tag_id: i32) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO chirps_tags (chirp_id, tag_id)
        VALUES ($1, $2)
        ON CONFLICT (chirp_id, tag_id) DO NOTHING
        "#,
    )
    .bind(chirp_id)
    .bind(tag_id)
    .execute(&mut *conn)
    .await
    .map_err(map_sqlx_error)?;

    Ok(())
}
