use std::env;
use std::time::Duration;

/// Seed values for the bootstrap admin and the platform settings row.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub admin_email: String,
    pub admin_username: String,
    pub deposit_address: String,
    pub admin_wallet: String,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            admin_email: "admin@trading.com".to_string(),
            admin_username: "admin".to_string(),
            deposit_address: String::new(),
            admin_wallet: String::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_acquire_timeout: Duration,
    pub db_lock_timeout: Duration,
    pub server_host: String,
    pub server_port: u16,
    pub bootstrap: BootstrapConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenv::dotenv().ok();

        let database_url = env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;

        let db_max_connections: u32 = env::var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;
        if db_max_connections == 0 {
            return Err("DB_MAX_CONNECTIONS must be at least 1".into());
        }

        let db_acquire_timeout_secs: u64 = env::var("DB_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()?;

        let db_lock_timeout_ms: u64 = env::var("DB_LOCK_TIMEOUT_MS")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()?;

        let server_host = env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let server_port = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()?;

        let defaults = BootstrapConfig::default();
        let bootstrap = BootstrapConfig {
            admin_email: env::var("ADMIN_EMAIL").unwrap_or(defaults.admin_email),
            admin_username: env::var("ADMIN_USERNAME").unwrap_or(defaults.admin_username),
            deposit_address: env::var("BTC_DEPOSIT_ADDRESS").unwrap_or_default(),
            admin_wallet: env::var("ADMIN_BTC_WALLET").unwrap_or_default(),
        };

        Ok(Config {
            database_url,
            db_max_connections,
            db_acquire_timeout: Duration::from_secs(db_acquire_timeout_secs),
            db_lock_timeout: Duration::from_millis(db_lock_timeout_ms),
            server_host,
            server_port,
            bootstrap,
        })
    }

    /// Pool options. Connection waits are bounded by the acquire timeout; row
    /// lock waits by `db_lock_timeout`, applied per transaction.
    pub fn connect_options(&self) -> sea_orm::ConnectOptions {
        let mut options = sea_orm::ConnectOptions::new(self.database_url.clone());
        options
            .max_connections(self.db_max_connections)
            .acquire_timeout(self.db_acquire_timeout)
            .connect_timeout(self.db_acquire_timeout)
            .sqlx_logging(false);
        options
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
