//! Process configuration, read once from the environment at startup.

use std::net::SocketAddr;

/// Runtime configuration for the API process.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,
    pub jwt_secret: String,
    /// Token lifetime in hours.
    pub token_ttl_hours: i64,
    /// When true, back the API with Postgres (`database_url` required);
    /// otherwise use the in-memory store (dev/test).
    pub use_persistent_stores: bool,
    pub database_url: Option<String>,
    /// Bootstrap admin account, seeded at startup when absent. This account
    /// is protected from admin mutation and deletion.
    pub admin_email: String,
    pub admin_password: String,
}

impl AppConfig {
    /// Read configuration from environment variables, with dev defaults.
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("BIND_ADDR")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_else(|| SocketAddr::from(([0, 0, 0, 0], 8080)));

        let jwt_secret = std::env::var("JWT_SECRET").unwrap_or_else(|_| {
            tracing::warn!("JWT_SECRET not set; using insecure dev default");
            "dev-secret".to_string()
        });

        let token_ttl_hours = std::env::var("TOKEN_TTL_HOURS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(24);

        let use_persistent_stores = std::env::var("USE_PERSISTENT_STORES")
            .unwrap_or_else(|_| "false".to_string())
            .parse::<bool>()
            .unwrap_or(false);

        let database_url = std::env::var("DATABASE_URL").ok();

        let admin_email =
            std::env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@stockpile.local".to_string());
        let admin_password = std::env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
            tracing::warn!("ADMIN_PASSWORD not set; using insecure dev default");
            "admin123".to_string()
        });

        Self {
            bind_addr,
            jwt_secret,
            token_ttl_hours,
            use_persistent_stores,
            database_url,
            admin_email,
            admin_password,
        }
    }

    /// In-memory configuration for tests.
    pub fn in_memory(jwt_secret: impl Into<String>) -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
            jwt_secret: jwt_secret.into(),
            token_ttl_hours: 24,
            use_persistent_stores: false,
            database_url: None,
            admin_email: "admin@stockpile.local".to_string(),
            admin_password: "admin123".to_string(),
        }
    }
}
