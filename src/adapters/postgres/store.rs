//! PostgreSQL implementation of the persistence ports.
//!
//! Users and groups are owned by other services; this store reads them and
//! writes only the presence mirror columns, messages and read flags.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use crate::config::{DatabaseConfig, Persistence};
use crate::domain::chat::{Group, Message, MessageTarget};
use crate::domain::foundation::{DomainError, ErrorCode, GroupId, Identity, MessageId, Timestamp};
use crate::domain::presence::PresenceUpdate;
use crate::domain::user::UserRecord;
use crate::ports::{GroupReader, MessageRepository, UserPresenceStore};

/// PostgreSQL implementation of every persistence port.
///
/// Uses sqlx with connection pooling.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a pool from configuration, running migrations if asked to.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DomainError> {
        let Persistence::Postgres(url) = config.persistence() else {
            return Err(DomainError::database("No database URL configured"));
        };

        let pool = PgPoolOptions::new()
            .min_connections(config.pool_min)
            .max_connections(config.pool_max)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(config.idle_timeout())
            .max_lifetime(config.max_lifetime())
            .connect(url)
            .await
            .map_err(|e| db_error("Failed to connect to database", e))?;

        let store = Self::new(pool);
        if config.migrate_on_start {
            store.migrate().await?;
        }
        Ok(store)
    }

    pub async fn migrate(&self) -> Result<(), DomainError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| DomainError::database(format!("Failed to run migrations: {}", e)))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn db_error(context: &str, e: sqlx::Error) -> DomainError {
    DomainError::new(ErrorCode::DatabaseError, format!("{}: {}", context, e))
}

fn stored_identity(raw: String) -> Result<Identity, DomainError> {
    Identity::new(raw).map_err(|e| DomainError::database(format!("Invalid stored username: {}", e)))
}

/// Database row representation of a user.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    username: String,
    online: bool,
    last_seen: Option<DateTime<Utc>>,
    connection_ref: Option<String>,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserRecord {
            identity: stored_identity(row.username)?,
            online: row.online,
            last_seen: row.last_seen.map(Timestamp::from_datetime),
            connection_ref: row.connection_ref,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct GroupRow {
    id: Uuid,
    name: String,
    admin: String,
}

#[async_trait]
impl UserPresenceStore for PostgresStore {
    async fn find_user(&self, identity: &Identity) -> Result<Option<UserRecord>, DomainError> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT username, online, last_seen, connection_ref
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find user", e))?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn upsert_user_presence(&self, update: &PresenceUpdate) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (username, online, last_seen, connection_ref)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (username) DO UPDATE SET
                online = EXCLUDED.online,
                last_seen = EXCLUDED.last_seen,
                connection_ref = EXCLUDED.connection_ref
            "#,
        )
        .bind(update.identity.as_str())
        .bind(update.online)
        .bind(update.last_seen.as_datetime())
        .bind(&update.connection_ref)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update user presence", e))?;

        Ok(())
    }
}

#[async_trait]
impl GroupReader for PostgresStore {
    async fn find_group(&self, id: &GroupId) -> Result<Option<Group>, DomainError> {
        let row: Option<GroupRow> = sqlx::query_as(
            r#"
            SELECT id, name, admin
            FROM groups
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find group", e))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let usernames: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT username
            FROM group_members
            WHERE group_id = $1
            "#,
        )
        .bind(row.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to load group members", e))?;

        let members = usernames
            .into_iter()
            .map(|(username,)| stored_identity(username))
            .collect::<Result<BTreeSet<_>, _>>()?;

        Ok(Some(Group::from_parts(
            GroupId::from_uuid(row.id),
            row.name,
            stored_identity(row.admin)?,
            members,
        )))
    }
}

#[async_trait]
impl MessageRepository for PostgresStore {
    async fn append(&self, message: &Message) -> Result<MessageId, DomainError> {
        let (receiver, group_id, read) = match message.target() {
            MessageTarget::Private { receiver, read } => (Some(receiver.as_str()), None, Some(*read)),
            MessageTarget::Group { group_id } => (None, Some(*group_id.as_uuid()), None),
        };

        sqlx::query(
            r#"
            INSERT INTO messages (
                id, sender, kind, receiver, group_id, content, photo, read, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(message.id().as_uuid())
        .bind(message.sender().as_str())
        .bind(message.kind().as_str())
        .bind(receiver)
        .bind(group_id)
        .bind(message.body().content())
        .bind(message.body().photo())
        .bind(read)
        .bind(message.timestamp().as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to save message", e))?;

        Ok(*message.id())
    }

    async fn mark_conversation_read(
        &self,
        sender: &Identity,
        receiver: &Identity,
    ) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE messages SET read = TRUE
            WHERE kind = 'private'
              AND sender = $1
              AND receiver = $2
              AND read = FALSE
            "#,
        )
        .bind(sender.as_str())
        .bind(receiver.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark messages read", e))?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_row_converts_to_record() {
        let now = Utc::now();
        let record = UserRecord::try_from(UserRow {
            username: "alice".to_string(),
            online: true,
            last_seen: Some(now),
            connection_ref: Some("conn".to_string()),
        })
        .unwrap();

        assert_eq!(record.identity.as_str(), "alice");
        assert!(record.online);
        assert_eq!(record.last_seen, Some(Timestamp::from_datetime(now)));
    }

    #[test]
    fn blank_stored_username_is_a_database_error() {
        let err = UserRecord::try_from(UserRow {
            username: " ".to_string(),
            online: false,
            last_seen: None,
            connection_ref: None,
        })
        .unwrap_err();

        assert_eq!(err.code, ErrorCode::DatabaseError);
    }
}
