use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::models::{ProfileDraft, UserProfile};

pub fn fetch_profiles(conn: &Connection) -> Result<Vec<UserProfile>> {
    let mut stmt = conn
        .prepare("SELECT id, username, avatar FROM user_profile ORDER BY username COLLATE NOCASE")
        .context("failed to prepare profile query")?;

    let profiles = stmt
        .query_map([], |row| {
            Ok(UserProfile {
                id: row.get(0)?,
                username: row.get(1)?,
                avatar: row.get(2)?,
            })
        })
        .context("failed to load profiles")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect profiles")?;

    Ok(profiles)
}

pub fn fetch_profile(conn: &Connection, id: &str) -> Result<Option<UserProfile>> {
    conn.query_row(
        "SELECT id, username, avatar FROM user_profile WHERE id = ?1",
        params![id],
        |row| {
            Ok(UserProfile {
                id: row.get(0)?,
                username: row.get(1)?,
                avatar: row.get(2)?,
            })
        },
    )
    .optional()
    .context("failed to load profile")
}

/// Insert a profile under a generated id. Normal flows go through
/// [`upsert_profile`] with the user's id instead.
pub fn create_profile(conn: &Connection, draft: &ProfileDraft) -> Result<UserProfile> {
    let id = Uuid::new_v4().to_string();
    conn.execute(
        "INSERT INTO user_profile (id, username, avatar) VALUES (?1, ?2, ?3)",
        params![id, draft.username, draft.avatar],
    )
    .context("failed to insert profile")?;

    Ok(UserProfile {
        id,
        username: draft.username.clone(),
        avatar: draft.avatar.clone(),
    })
}

pub fn update_profile(conn: &Connection, id: &str, draft: &ProfileDraft) -> Result<UserProfile> {
    let updated = conn
        .execute(
            "UPDATE user_profile SET username = ?1, avatar = ?2 WHERE id = ?3",
            params![draft.username, draft.avatar, id],
        )
        .context("failed to update profile")?;

    if updated == 0 {
        return Err(anyhow!("Profile not found"));
    }
    Ok(UserProfile {
        id: id.to_string(),
        username: draft.username.clone(),
        avatar: draft.avatar.clone(),
    })
}

pub fn upsert_profile(conn: &Connection, id: &str, draft: &ProfileDraft) -> Result<UserProfile> {
    conn.execute(
        "INSERT INTO user_profile (id, username, avatar) VALUES (?1, ?2, ?3)
         ON CONFLICT(id) DO UPDATE SET username = excluded.username, avatar = excluded.avatar",
        params![id, draft.username, draft.avatar],
    )
    .context("failed to save profile")?;

    Ok(UserProfile {
        id: id.to_string(),
        username: draft.username.clone(),
        avatar: draft.avatar.clone(),
    })
}

pub fn delete_profile(conn: &Connection, id: &str) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM user_profile WHERE id = ?1", params![id])
        .context("failed to delete profile")?;

    if deleted == 0 {
        Err(anyhow!("Profile not found"))
    } else {
        Ok(())
    }
}
