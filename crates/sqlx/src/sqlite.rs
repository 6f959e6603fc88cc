use crate::common::{
    GrantRow, NamedRow, OwnedRow, UserRow, datetime_to_string,
};
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};
use tracing::instrument;
use warden_core::{
    AccessGrant, AccessType, Directory, Error, GrantStore, GranteeKind, GranteeRef,
    GranteeSummary, Identity, InsertOutcome, ObjectKind, ObjectRef, ProtectedObject, Result,
};

/// SQLite-backed grant store and directory.
pub struct SqliteBackend {
    pool: Pool<Sqlite>,
}

impl SqliteBackend {
    pub async fn new(database_url: &str) -> Result<Self> {
        use sqlx::sqlite::SqliteConnectOptions;
        use std::str::FromStr;

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| Error::StateError(format!("Invalid database URL: {e}")))?
            .create_if_missing(true);

        let pool = sqlx::SqlitePool::connect_with(options)
            .await
            .map_err(|e| Error::StateError(format!("Failed to connect to database: {e}")))?;

        let backend = Self { pool };
        backend.migrate().await?;
        Ok(backend)
    }

    pub fn from_pool(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::StateError(format!("Failed to run migrations: {e}")))
    }
}

#[async_trait]
impl GrantStore for SqliteBackend {
    #[instrument(name = "db.insert_grant", skip(self, grant), fields(grant_id = %grant.id))]
    async fn insert_grant(&self, grant: &AccessGrant) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO access_grants (id, object_type, object_id, access_type, grantee_type, grantee_id, grantor_id, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            ON CONFLICT (object_type, object_id, access_type, grantee_type, grantee_id) DO NOTHING
            "#,
        )
        .bind(&grant.id)
        .bind(grant.object_type.as_str())
        .bind(&grant.object_id)
        .bind(grant.access_type.as_str())
        .bind(grant.grantee_type.as_str())
        .bind(&grant.grantee_id)
        .bind(&grant.grantor_id)
        .bind(datetime_to_string(grant.created_at))
        .execute(&self.pool)
        .await
        .map_err(|e| Error::StateError(format!("Failed to insert grant: {e}")))?;

        if result.rows_affected() == 0 {
            Ok(InsertOutcome::Conflict)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    #[instrument(name = "db.find_grant", skip(self))]
    async fn find_grant(
        &self,
        object: &ObjectRef,
        access_type: AccessType,
        grantee: &GranteeRef,
    ) -> Result<Option<AccessGrant>> {
        let row = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT id, object_type, object_id, access_type, grantee_type, grantee_id, grantor_id, created_at
            FROM access_grants
            WHERE object_type = ?1 AND object_id = ?2 AND access_type = ?3 AND grantee_type = ?4 AND grantee_id = ?5
            "#,
        )
        .bind(object.kind.as_str())
        .bind(&object.id)
        .bind(access_type.as_str())
        .bind(grantee.kind.as_str())
        .bind(&grantee.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::StateError(format!("Failed to find grant: {e}")))?;

        row.map(AccessGrant::try_from).transpose()
    }

    #[instrument(name = "db.delete_grants", skip(self))]
    async fn delete_grants(
        &self,
        object: &ObjectRef,
        grantee: &GranteeRef,
        access_type: Option<AccessType>,
    ) -> Result<u64> {
        let result = if let Some(access_type) = access_type {
            sqlx::query(
                r#"
                DELETE FROM access_grants
                WHERE object_type = ?1 AND object_id = ?2 AND grantee_type = ?3 AND grantee_id = ?4 AND access_type = ?5
                "#,
            )
            .bind(object.kind.as_str())
            .bind(&object.id)
            .bind(grantee.kind.as_str())
            .bind(&grantee.id)
            .bind(access_type.as_str())
            .execute(&self.pool)
            .await
        } else {
            sqlx::query(
                r#"
                DELETE FROM access_grants
                WHERE object_type = ?1 AND object_id = ?2 AND grantee_type = ?3 AND grantee_id = ?4
                "#,
            )
            .bind(object.kind.as_str())
            .bind(&object.id)
            .bind(grantee.kind.as_str())
            .bind(&grantee.id)
            .execute(&self.pool)
            .await
        }
        .map_err(|e| Error::StateError(format!("Failed to delete grants: {e}")))?;

        Ok(result.rows_affected())
    }

    #[instrument(name = "db.grants_for_object", skip(self))]
    async fn grants_for_object(&self, object: &ObjectRef) -> Result<Vec<AccessGrant>> {
        let rows = sqlx::query_as::<_, GrantRow>(
            r#"
            SELECT id, object_type, object_id, access_type, grantee_type, grantee_id, grantor_id, created_at
            FROM access_grants
            WHERE object_type = ?1 AND object_id = ?2
            ORDER BY created_at, id
            "#,
        )
        .bind(object.kind.as_str())
        .bind(&object.id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| Error::StateError(format!("Failed to list grants: {e}")))?;

        rows.into_iter().map(AccessGrant::try_from).collect()
    }
}

#[async_trait]
impl Directory for SqliteBackend {
    #[instrument(name = "db.resolve_object", skip(self))]
    async fn resolve_object(
        &self,
        kind: ObjectKind,
        id: &str,
        org_id: &str,
    ) -> Result<Option<ProtectedObject>> {
        match kind {
            ObjectKind::Queries | ObjectKind::Dashboards => {
                let table = kind.as_str();
                let row = sqlx::query_as::<_, OwnedRow>(&format!(
                    "SELECT id, user_id FROM {table} WHERE id = ?1 AND org_id = ?2"
                ))
                .bind(id)
                .bind(org_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| Error::StateError(format!("Failed to resolve {kind}: {e}")))?;

                Ok(row.map(|r| r.into_object(kind, org_id)))
            }
            ObjectKind::Users | ObjectKind::Groups => {
                let table = kind.as_str();
                let row = sqlx::query_as::<_, NamedRow>(&format!(
                    "SELECT id, name FROM {table} WHERE id = ?1 AND org_id = ?2"
                ))
                .bind(id)
                .bind(org_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| Error::StateError(format!("Failed to resolve {kind}: {e}")))?;

                // A user owns its own ACL; groups are admin-managed.
                Ok(row.map(|r| ProtectedObject {
                    kind,
                    id: r.id.clone(),
                    org_id: org_id.to_string(),
                    owner_id: (kind == ObjectKind::Users).then(|| r.id),
                }))
            }
        }
    }

    #[instrument(name = "db.resolve_grantee", skip(self))]
    async fn resolve_grantee(
        &self,
        kind: GranteeKind,
        id: &str,
        org_id: &str,
    ) -> Result<Option<GranteeSummary>> {
        let table = kind.as_str();
        let row = sqlx::query_as::<_, NamedRow>(&format!(
            "SELECT id, name FROM {table} WHERE id = ?1 AND org_id = ?2"
        ))
        .bind(id)
        .bind(org_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::StateError(format!("Failed to resolve {kind}: {e}")))?;

        Ok(row.map(|r| r.into_grantee(kind)))
    }

    #[instrument(name = "db.load_identity", skip(self))]
    async fn load_identity(&self, user_id: &str) -> Result<Option<Identity>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, org_id, name, is_admin, group_ids FROM users WHERE id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::StateError(format!("Failed to load identity: {e}")))?;

        row.map(UserRow::into_identity).transpose()
    }
}
