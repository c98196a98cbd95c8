use chirper_gateway::Deployment;
use chirper_storage::{DatabaseConfig, SslMode};
use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::SocketAddr;
use std::time::Duration;

pub const LISTEN_ADDR_ENV: &str = "CHIRPER_LISTEN_ADDR";
pub const DEPLOYMENT_ENV: &str = "CHIRPER_DEPLOYMENT";
pub const STORAGE_BACKEND_ENV: &str = "CHIRPER_STORAGE_BACKEND";
pub const LOG_FORMAT_ENV: &str = "CHIRPER_LOG_FORMAT";
pub const DB_HOST_ENV: &str = "DB_HOST";
pub const DB_PORT_ENV: &str = "DB_PORT";
pub const DB_USER_ENV: &str = "DB_USER";
pub const DB_PASSWORD_ENV: &str = "DB_PASSWORD";
pub const DB_NAME_ENV: &str = "DB_NAME";
pub const DB_SSL_MODE_ENV: &str = "DB_SSL_MODE";
pub const DB_MAX_CONNECTIONS_ENV: &str = "DB_MAX_CONNECTIONS";
pub const DB_ACQUIRE_TIMEOUT_ENV: &str = "DB_ACQUIRE_TIMEOUT_SECS";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8080";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "postgres")]
    Postgres,
    #[value(name = "in-memory")]
    InMemory,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::Postgres => write!(f, "postgres"),
            StorageBackendArg::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[value(name = "text")]
    Text,
    #[value(name = "json")]
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "chirper")]
pub struct CLI {
    #[arg(long, env = LISTEN_ADDR_ENV, default_value = DEFAULT_LISTEN_ADDR)]
    pub listen_addr: SocketAddr,

    #[arg(
        long,
        env = DEPLOYMENT_ENV,
        value_enum,
        default_value_t = Deployment::Standalone
    )]
    pub deployment: Deployment,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Postgres
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = DB_HOST_ENV, required_if_eq("storage", "postgres"))]
    pub db_host: Option<String>,

    #[arg(long, env = DB_PORT_ENV, default_value_t = 5432)]
    pub db_port: u16,

    #[arg(long, env = DB_USER_ENV, required_if_eq("storage", "postgres"))]
    pub db_user: Option<String>,

    #[arg(long, env = DB_PASSWORD_ENV, default_value = "", hide_env_values = true)]
    pub db_password: String,

    #[arg(long, env = DB_NAME_ENV, required_if_eq("storage", "postgres"))]
    pub db_name: Option<String>,

    #[arg(long, env = DB_SSL_MODE_ENV, default_value_t = SslMode::Prefer)]
    pub db_ssl_mode: SslMode,

    #[arg(long, env = DB_MAX_CONNECTIONS_ENV, default_value_t = 5)]
    pub db_max_connections: u32,

    #[arg(long, env = DB_ACQUIRE_TIMEOUT_ENV, default_value_t = 10)]
    pub db_acquire_timeout_secs: u64,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl CLI {
    /// Connection settings for the postgres backend, if all required flags
    /// were given.
    pub fn database_config(&self) -> Option<DatabaseConfig> {
        Some(
            DatabaseConfig::builder()
                .host(self.db_host.clone()?)
                .port(self.db_port)
                .username(self.db_user.clone()?)
                .password(self.db_password.clone())
                .database(self.db_name.clone()?)
                .ssl_mode(self.db_ssl_mode)
                .max_connections(self.db_max_connections)
                .acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs))
                .build(),
        )
    }
}
