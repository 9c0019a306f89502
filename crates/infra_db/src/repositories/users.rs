//! User repository

use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use tracing::debug;
use uuid::Uuid;

use core_kernel::{Role, UserId};
use domain_identity::User;

use crate::error::DatabaseError;

/// Database row representation of a user
#[derive(Debug, Clone, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub failed_login_attempts: i32,
    pub locked_until: Option<chrono::DateTime<chrono::Utc>>,
    pub last_login_at: Option<chrono::DateTime<chrono::Utc>>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DatabaseError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let role = Role::parse(&row.role).ok_or_else(|| {
            DatabaseError::SerializationError(format!("Unknown role '{}'", row.role))
        })?;

        Ok(User {
            id: UserId::from(row.id),
            email: row.email,
            password_hash: row.password_hash,
            full_name: row.full_name,
            phone: row.phone,
            role,
            is_active: row.is_active,
            failed_login_attempts: row.failed_login_attempts as u32,
            locked_until: row.locked_until,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_USER: &str = r#"
    SELECT id, email, password_hash, full_name, phone, role, is_active,
           failed_login_attempts, locked_until, last_login_at,
           created_at, updated_at
    FROM users
"#;

/// Repository for user records
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Inserts a new user
    ///
    /// The unique index on `email` is the source of truth for duplicate
    /// registration; a violation surfaces as `DuplicateEntry`.
    pub async fn insert(&self, user: &User) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, password_hash, full_name, phone, role, is_active,
                failed_login_attempts, locked_until, last_login_at,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(Uuid::from(user.id))
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.failed_login_attempts as i32)
        .bind(user.locked_until)
        .bind(user.last_login_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        debug!(user_id = %user.id, "User inserted");
        Ok(())
    }

    /// Fetches a user by identifier
    pub async fn find_by_id(&self, id: UserId) -> Result<User, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
            .bind(Uuid::from(id))
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?
            .ok_or_else(|| DatabaseError::not_found("User", id))?;

        row.try_into()
    }

    /// Fetches a user by normalized email, if one exists
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = $1"))
            .bind(email.trim().to_lowercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        row.map(User::try_from).transpose()
    }

    /// Lists users, optionally filtered by role (admin operation)
    pub async fn list(
        &self,
        role: Option<Role>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<User>, DatabaseError> {
        let mut qb: QueryBuilder<'_, Postgres> = QueryBuilder::new(SELECT_USER);
        qb.push(" WHERE TRUE");
        if let Some(role) = role {
            qb.push(" AND role = ").push_bind(role.as_str());
        }
        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build_query_as::<UserRow>()
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        rows.into_iter().map(User::try_from).collect()
    }

    /// Persists the mutable state of a user record
    ///
    /// Covers profile edits, login bookkeeping, password changes, and
    /// activation toggles; immutable fields (id, email, created_at) are
    /// never rewritten.
    pub async fn update(&self, user: &User) -> Result<(), DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET password_hash = $2,
                full_name = $3,
                phone = $4,
                role = $5,
                is_active = $6,
                failed_login_attempts = $7,
                locked_until = $8,
                last_login_at = $9,
                updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(Uuid::from(user.id))
        .bind(&user.password_hash)
        .bind(&user.full_name)
        .bind(&user.phone)
        .bind(user.role.as_str())
        .bind(user.is_active)
        .bind(user.failed_login_attempts as i32)
        .bind(user.locked_until)
        .bind(user.last_login_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::not_found("User", user.id));
        }
        Ok(())
    }
}
