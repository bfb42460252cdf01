use clap::{Parser, builder::BoolishValueParser};
use quiz_store::schema::DEFAULT_CREATOR_EMAIL;
use std::error::Error;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

const DEFAULT_MCP_HTTP_ADDR: &str = "127.0.0.1:4020";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_SSE_KEEP_ALIVE_SECS: u64 = 15;

/// Variable names used by earlier deployments, read when the `QUIZ_*` names are unset.
const LEGACY_DB_URL_ENV: &str = "SUPABASE_URL";
const LEGACY_DB_KEY_ENV: &str = "SUPABASE_SERVICE_ROLE_KEY";

#[derive(Parser, Debug)]
#[command(name = "quiz-mcpd", version, about = "Quiz MCP daemon.")]
#[allow(clippy::struct_excessive_bools)]
struct CliArgs {
    #[arg(long, env = "QUIZ_DB_URL")]
    db_url: Option<String>,

    #[arg(long, env = "QUIZ_DB_SERVICE_KEY", hide_env_values = true)]
    db_key: Option<String>,

    #[arg(
        long,
        env = "QUIZ_DB_IN_MEMORY",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    db_in_memory: bool,

    #[arg(
        long,
        env = "QUIZ_DB_MAX_CONNECTIONS",
        default_value_t = DEFAULT_DB_MAX_CONNECTIONS
    )]
    db_max_connections: u32,

    #[arg(
        long,
        env = "QUIZ_DB_BOOTSTRAP_SCHEMA",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    db_bootstrap_schema: bool,

    #[arg(long, env = "QUIZ_CREATOR_EMAIL", default_value = DEFAULT_CREATOR_EMAIL)]
    creator_email: String,

    #[arg(
        long = "stdio",
        env = "QUIZ_ENABLE_STDIO",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    enable_stdio: bool,

    #[arg(
        long,
        env = "QUIZ_MCP_SERVE",
        default_value_t = false,
        value_parser = BoolishValueParser::new()
    )]
    mcp_serve: bool,

    #[arg(long, env = "QUIZ_MCP_HTTP_ADDR", default_value = DEFAULT_MCP_HTTP_ADDR)]
    mcp_http_addr: SocketAddr,

    #[arg(
        long,
        env = "QUIZ_MCP_STATEFUL",
        default_value_t = true,
        value_parser = BoolishValueParser::new()
    )]
    mcp_stateful: bool,

    /// Seconds between SSE keep-alive pings; 0 disables them.
    #[arg(
        long,
        env = "QUIZ_MCP_SSE_KEEP_ALIVE_SECS",
        default_value_t = DEFAULT_SSE_KEEP_ALIVE_SECS
    )]
    mcp_sse_keep_alive_secs: u64,

    #[arg(long, env = "QUIZ_LOG", default_value = DEFAULT_LOG_LEVEL)]
    log_level: String,
}

/// Connection settings for the hosted database.
#[derive(Clone)]
pub struct DbSettings {
    pub url: String,
    pub service_key: String,
    pub max_connections: u32,
    pub bootstrap_schema: bool,
}

impl fmt::Debug for DbSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DbSettings")
            .field("url", &self.url)
            .field("service_key", &"<redacted>")
            .field("max_connections", &self.max_connections)
            .field("bootstrap_schema", &self.bootstrap_schema)
            .finish()
    }
}

/// Where quiz data lives.
#[derive(Debug, Clone)]
pub enum StoreSettings {
    Postgres(DbSettings),
    InMemory,
}

/// Runtime configuration loaded from CLI arguments and environment variables.
#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub store: StoreSettings,
    pub creator_email: String,
    pub enable_stdio: bool,
    pub mcp_serve: bool,
    pub mcp_http_addr: SocketAddr,
    pub mcp_stateful: bool,
    pub mcp_sse_keep_alive: Option<Duration>,
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    MissingSetting(&'static str),
    InvalidSetting { name: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingSetting(name) => write!(f, "missing required setting: {name}"),
            Self::InvalidSetting { name, value } => {
                write!(f, "invalid {name} value: {value}")
            }
        }
    }
}

impl Error for ConfigError {}

impl QuizConfig {
    /// Parses flags, then fills credentials from the legacy environment names.
    ///
    /// # Errors
    /// Returns `ConfigError` when a required setting is missing or malformed.
    pub fn from_args() -> Result<Self, ConfigError> {
        let mut args = CliArgs::parse();
        args.fill_legacy_env(|name| std::env::var(name).ok());
        Self::try_from(args)
    }
}

impl CliArgs {
    fn fill_legacy_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if is_blank(self.db_url.as_deref()) {
            self.db_url = lookup(LEGACY_DB_URL_ENV);
        }
        if is_blank(self.db_key.as_deref()) {
            self.db_key = lookup(LEGACY_DB_KEY_ENV);
        }
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|value| value.trim().is_empty())
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|value| !is_blank(Some(value)))
}

impl TryFrom<CliArgs> for QuizConfig {
    type Error = ConfigError;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        let store = if args.db_in_memory {
            StoreSettings::InMemory
        } else {
            let url = present(args.db_url).ok_or(ConfigError::MissingSetting("QUIZ_DB_URL"))?;
            let service_key = present(args.db_key)
                .ok_or(ConfigError::MissingSetting("QUIZ_DB_SERVICE_KEY"))?;
            if args.db_max_connections == 0 {
                return Err(ConfigError::InvalidSetting {
                    name: "QUIZ_DB_MAX_CONNECTIONS",
                    value: args.db_max_connections.to_string(),
                });
            }
            StoreSettings::Postgres(DbSettings {
                url,
                service_key,
                max_connections: args.db_max_connections,
                bootstrap_schema: args.db_bootstrap_schema,
            })
        };

        let creator_email = args.creator_email.trim().to_string();
        if creator_email.is_empty() {
            return Err(ConfigError::InvalidSetting {
                name: "QUIZ_CREATOR_EMAIL",
                value: args.creator_email,
            });
        }

        if !args.enable_stdio && !args.mcp_serve {
            return Err(ConfigError::InvalidSetting {
                name: "QUIZ_ENABLE_STDIO",
                value: "false (and QUIZ_MCP_SERVE is false)".to_string(),
            });
        }

        Ok(Self {
            store,
            creator_email,
            enable_stdio: args.enable_stdio,
            mcp_serve: args.mcp_serve,
            mcp_http_addr: args.mcp_http_addr,
            mcp_stateful: args.mcp_stateful,
            mcp_sse_keep_alive: (args.mcp_sse_keep_alive_secs > 0)
                .then(|| Duration::from_secs(args.mcp_sse_keep_alive_secs)),
            log_level: args.log_level,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_args() -> CliArgs {
        CliArgs {
            db_url: Some("postgres://quiz.example.com:5432/postgres".to_string()),
            db_key: Some("service-key".to_string()),
            db_in_memory: false,
            db_max_connections: DEFAULT_DB_MAX_CONNECTIONS,
            db_bootstrap_schema: false,
            creator_email: DEFAULT_CREATOR_EMAIL.to_string(),
            enable_stdio: true,
            mcp_serve: false,
            mcp_http_addr: DEFAULT_MCP_HTTP_ADDR.parse().expect("valid MCP addr"),
            mcp_stateful: true,
            mcp_sse_keep_alive_secs: DEFAULT_SSE_KEEP_ALIVE_SECS,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }

    #[test]
    fn builds_postgres_settings_from_url_and_key() {
        let config = QuizConfig::try_from(base_args()).expect("config should parse");
        let StoreSettings::Postgres(db) = config.store else {
            panic!("expected postgres settings");
        };
        assert_eq!(db.url, "postgres://quiz.example.com:5432/postgres");
        assert_eq!(db.service_key, "service-key");
        assert_eq!(db.max_connections, DEFAULT_DB_MAX_CONNECTIONS);
        assert_eq!(config.creator_email, DEFAULT_CREATOR_EMAIL);
    }

    #[test]
    fn missing_url_is_fatal() {
        let mut args = base_args();
        args.db_url = None;
        let err = QuizConfig::try_from(args).expect_err("url is required");
        assert!(matches!(err, ConfigError::MissingSetting("QUIZ_DB_URL")));
    }

    #[test]
    fn blank_key_counts_as_missing() {
        let mut args = base_args();
        args.db_key = Some("   ".to_string());
        let err = QuizConfig::try_from(args).expect_err("key is required");
        assert!(matches!(err, ConfigError::MissingSetting("QUIZ_DB_SERVICE_KEY")));
        assert_eq!(err.to_string(), "missing required setting: QUIZ_DB_SERVICE_KEY");
    }

    #[test]
    fn in_memory_mode_needs_no_credentials() {
        let mut args = base_args();
        args.db_in_memory = true;
        args.db_url = None;
        args.db_key = None;
        let config = QuizConfig::try_from(args).expect("config should parse");
        assert!(matches!(config.store, StoreSettings::InMemory));
    }

    #[test]
    fn blank_creator_email_is_rejected() {
        let mut args = base_args();
        args.creator_email = " ".to_string();
        let err = QuizConfig::try_from(args).expect_err("email is required");
        assert!(matches!(
            err,
            ConfigError::InvalidSetting {
                name: "QUIZ_CREATOR_EMAIL",
                ..
            }
        ));
    }

    #[test]
    fn requires_a_transport() {
        let mut args = base_args();
        args.enable_stdio = false;
        args.mcp_serve = false;
        assert!(QuizConfig::try_from(args).is_err());
    }

    #[test]
    fn debug_output_hides_the_service_key() {
        let config = QuizConfig::try_from(base_args()).expect("config should parse");
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("service-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn legacy_names_fill_missing_credentials() {
        let mut args = base_args();
        args.db_url = None;
        args.db_key = Some(String::new());
        args.fill_legacy_env(|name| match name {
            LEGACY_DB_URL_ENV => Some("postgres://legacy.example.com/postgres".to_string()),
            LEGACY_DB_KEY_ENV => Some("legacy-key".to_string()),
            _ => None,
        });

        let config = QuizConfig::try_from(args).expect("config should parse");
        let StoreSettings::Postgres(db) = config.store else {
            panic!("expected postgres settings");
        };
        assert_eq!(db.url, "postgres://legacy.example.com/postgres");
        assert_eq!(db.service_key, "legacy-key");
    }

    #[test]
    fn quiz_names_win_over_legacy_names() {
        let mut args = base_args();
        args.fill_legacy_env(|_| Some("legacy".to_string()));
        let config = QuizConfig::try_from(args).expect("config should parse");
        let StoreSettings::Postgres(db) = config.store else {
            panic!("expected postgres settings");
        };
        assert_eq!(db.url, "postgres://quiz.example.com:5432/postgres");
        assert_eq!(db.service_key, "service-key");
    }

    #[test]
    fn missing_legacy_names_still_fail() {
        let mut args = base_args();
        args.db_url = None;
        args.fill_legacy_env(|_| None);
        assert!(matches!(
            QuizConfig::try_from(args),
            Err(ConfigError::MissingSetting("QUIZ_DB_URL"))
        ));
    }

    #[test]
    fn http_session_settings_follow_flags() {
        let config = QuizConfig::try_from(base_args()).expect("config should parse");
        assert!(config.mcp_stateful);
        assert_eq!(config.mcp_sse_keep_alive, Some(Duration::from_secs(15)));

        let mut args = base_args();
        args.mcp_stateful = false;
        args.mcp_sse_keep_alive_secs = 0;
        let config = QuizConfig::try_from(args).expect("config should parse");
        assert!(!config.mcp_stateful);
        assert!(config.mcp_sse_keep_alive.is_none());
    }
}
