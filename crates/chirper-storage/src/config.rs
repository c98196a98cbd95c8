use sqlx::postgres::{PgConnectOptions, PgSslMode};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;
use typed_builder::TypedBuilder;

/// TLS negotiation mode for the PostgreSQL connection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SslMode {
    Disable,
    Allow,
    #[default]
    Prefer,
    Require,
    VerifyCa,
    VerifyFull,
}

impl FromStr for SslMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "disable" => Ok(Self::Disable),
            "allow" => Ok(Self::Allow),
            "prefer" => Ok(Self::Prefer),
            "require" => Ok(Self::Require),
            "verify-ca" => Ok(Self::VerifyCa),
            "verify-full" => Ok(Self::VerifyFull),
            other => Err(format!("unknown ssl mode '{other}'")),
        }
    }
}

impl Display for SslMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mode = match self {
            SslMode::Disable => "disable",
            SslMode::Allow => "allow",
            SslMode::Prefer => "prefer",
            SslMode::Require => "require",
            SslMode::VerifyCa => "verify-ca",
            SslMode::VerifyFull => "verify-full",
        };
        f.write_str(mode)
    }
}

impl From<SslMode> for PgSslMode {
    fn from(mode: SslMode) -> Self {
        match mode {
            SslMode::Disable => PgSslMode::Disable,
            SslMode::Allow => PgSslMode::Allow,
            SslMode::Prefer => PgSslMode::Prefer,
            SslMode::Require => PgSslMode::Require,
            SslMode::VerifyCa => PgSslMode::VerifyCa,
            SslMode::VerifyFull => PgSslMode::VerifyFull,
        }
    }
}

/// Connection settings for [`PostgresRepository`](crate::PostgresRepository).
///
/// Built once at startup and handed to the repository; nothing reads the
/// process environment after that.
#[derive(Debug, Clone, TypedBuilder)]
pub struct DatabaseConfig {
    #[builder(setter(into))]
    pub host: String,
    #[builder(default = 5432)]
    pub port: u16,
    #[builder(setter(into))]
    pub username: String,
    #[builder(default, setter(into))]
    pub password: String,
    #[builder(setter(into))]
    pub database: String,
    #[builder(default)]
    pub ssl_mode: SslMode,
    #[builder(default = 5)]
    pub max_connections: u32,
    /// How long a caller waits for a pooled connection before giving up.
    #[builder(default = Duration::from_secs(10))]
    pub acquire_timeout: Duration,
}

impl DatabaseConfig {
    pub fn connect_options(&self) -> PgConnectOptions {
        let mut options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(&self.username)
            .database(&self.database)
            .ssl_mode(self.ssl_mode.into());
        if !self.password.is_empty() {
            options = options.password(&self.password);
        }
        options
    }
}
