use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use stockpile_audit::{ActivityAction, ActivityRecord, EntityKind};
use stockpile_auth::{
    Hs256TokenCodec, JwtClaims, Role, TokenCodec, TokenError, User, hash_password,
};
use stockpile_core::UserId;
use stockpile_infra::{InventoryStore, MemoryStore, PostgresStore};

use crate::config::AppConfig;

/// Service wiring shared by all handlers: the store, the token codec and the
/// bootstrap-admin identity.
pub struct AppServices {
    store: Arc<dyn InventoryStore>,
    codec: Arc<dyn TokenCodec>,
    token_ttl: Duration,
    admin_email: String,
}

impl AppServices {
    pub fn store(&self) -> &Arc<dyn InventoryStore> {
        &self.store
    }

    pub fn codec(&self) -> &Arc<dyn TokenCodec> {
        &self.codec
    }

    /// Whether `email` names the protected bootstrap admin account.
    pub fn is_master_admin(&self, email: &str) -> bool {
        self.admin_email == email
    }

    pub fn issue_token(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = JwtClaims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role,
            issued_at: now,
            expires_at: now + self.token_ttl,
        };
        self.codec.encode(&claims)
    }

    /// Append an activity record. Best-effort: failures are logged, never
    /// surfaced to the caller.
    pub async fn log_activity(
        &self,
        user_id: UserId,
        action: ActivityAction,
        entity: EntityKind,
        entity_id: Uuid,
        details: impl Into<String>,
    ) {
        let record = ActivityRecord::new(user_id, action, entity, entity_id, details, Utc::now());
        if let Err(e) = self.store.append_activity(record).await {
            tracing::warn!("failed to append activity record: {e}");
        }
    }
}

/// Build the store (env-selected backend), seed the bootstrap admin and wire
/// up the token codec.
pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let store: Arc<dyn InventoryStore> = if config.use_persistent_stores {
        let database_url = config
            .database_url
            .clone()
            .context("DATABASE_URL must be set when USE_PERSISTENT_STORES=true")?;

        let pool = PgPool::connect(&database_url)
            .await
            .context("failed to connect to Postgres")?;

        let store = PostgresStore::new(pool);
        store
            .ensure_schema()
            .await
            .context("failed to ensure database schema")?;
        Arc::new(store)
    } else {
        tracing::info!("using in-memory store (dev/test)");
        Arc::new(MemoryStore::new())
    };

    seed_admin(store.as_ref(), &config.admin_email, &config.admin_password).await?;

    let codec: Arc<dyn TokenCodec> = Arc::new(Hs256TokenCodec::new(config.jwt_secret.as_bytes()));

    Ok(AppServices {
        store,
        codec,
        token_ttl: Duration::hours(config.token_ttl_hours),
        admin_email: config.admin_email.clone(),
    })
}

async fn seed_admin(
    store: &dyn InventoryStore,
    admin_email: &str,
    admin_password: &str,
) -> anyhow::Result<()> {
    if store
        .user_by_email(admin_email)
        .await
        .context("failed to look up bootstrap admin")?
        .is_some()
    {
        return Ok(());
    }

    let now = Utc::now();
    let password_hash =
        hash_password(admin_password).context("failed to hash bootstrap admin password")?;
    let admin = User {
        id: UserId::new(),
        name: "Master Admin".to_string(),
        email: admin_email.to_string(),
        password_hash,
        role: Role::Admin,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    store
        .create_user(admin)
        .await
        .context("failed to seed bootstrap admin")?;
    tracing::info!(email = %admin_email, "bootstrap admin account seeded");
    Ok(())
}
