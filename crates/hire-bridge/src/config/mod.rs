use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default location of the flat key=value credentials file.
pub const DEFAULT_CONFIG_PATH: &str = "config/config.env";

const REQUIRED_KEYS: [&str; 3] = [
    "BAMBOOHR_COMPANY_DOMAIN",
    "BAMBOOHR_API_KEY",
    "TEAMTAILOR_API_TOKEN",
];

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub http: HttpConfig,
    pub bamboohr: BambooHrConfig,
    pub teamtailor: TeamTailorConfig,
    pub notion: Option<NotionConfig>,
    pub slack: Option<SlackConfig>,
    pub hiring: HiringConfig,
}

impl AppConfig {
    /// Load `path` (or the default `config/config.env`) into the process
    /// environment and read the typed settings from it. Values already present
    /// in the environment win over the file.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => {
                dotenvy::from_path(path).map_err(|source| ConfigError::File {
                    path: path.to_path_buf(),
                    source,
                })?;
            }
            None => {
                load_if_present(Path::new(DEFAULT_CONFIG_PATH))?;
                load_if_present(Path::new(".env"))?;
            }
        }

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let missing: Vec<&'static str> = REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| get(key).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingFields(missing));
        }

        let environment =
            AppEnvironment::from_str(&get("APP_ENV").unwrap_or_else(|| "development".to_string()));

        let host = get("APP_HOST").unwrap_or_else(|| "127.0.0.1".to_string());
        let port = get("APP_PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = get("APP_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        let timeout_secs = match get("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::InvalidNumber {
                key: "HTTP_TIMEOUT_SECS",
                value: raw,
            })?,
            None => 30,
        };

        let domain = get("BAMBOOHR_COMPANY_DOMAIN").unwrap_or_default();
        let bamboohr = BambooHrConfig {
            base_url: get("BAMBOOHR_BASE_URL")
                .unwrap_or_else(|| format!("https://{domain}.bamboohr.com/api/v1")),
            api_key: get("BAMBOOHR_API_KEY").unwrap_or_default(),
            upload_category: get("BAMBOOHR_UPLOAD_CATEGORY").unwrap_or_else(|| "16".to_string()),
            company_domain: domain,
        };

        let teamtailor = TeamTailorConfig {
            api_token: get("TEAMTAILOR_API_TOKEN").unwrap_or_default(),
            base_url: get("TEAMTAILOR_BASE_URL")
                .unwrap_or_else(|| "https://api.teamtailor.com/v1".to_string()),
            api_version: get("TEAMTAILOR_API_VERSION").unwrap_or_else(|| "20240404".to_string()),
            salary_field_id: get("TEAMTAILOR_SALARY_FIELD_ID")
                .unwrap_or_else(|| "75235".to_string()),
            location_id: get("TEAMTAILOR_LOCATION_ID").unwrap_or_else(|| "1200146".to_string()),
        };

        let notion = get("NOTION_API").map(|api_token| NotionConfig {
            api_token,
            base_url: get("NOTION_BASE_URL")
                .unwrap_or_else(|| "https://api.notion.com/v1".to_string()),
        });

        let slack = get("SLACK_WEBHOOK_URL").map(|webhook_url| SlackConfig { webhook_url });

        let test_mode = match get("HIRE_TEST_MODE") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                key: "HIRE_TEST_MODE",
                value: raw,
            })?,
            None => true,
        };

        let hiring = HiringConfig {
            test_mode,
            salary_currency: get("HIRE_SALARY_CURRENCY").unwrap_or_else(|| "USD".to_string()),
            default_location: get("HIRE_DEFAULT_LOCATION").unwrap_or_else(|| "Remote".to_string()),
            staging_dir: get("HIRE_STAGING_DIR").map(PathBuf::from),
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment == AppEnvironment::Development,
            },
            http: HttpConfig {
                timeout: Duration::from_secs(timeout_secs),
            },
            bamboohr,
            teamtailor,
            notion,
            slack,
            hiring,
        })
    }
}

/// Load an optional env file. Only a missing file is skipped.
fn load_if_present(path: &Path) -> Result<(), ConfigError> {
    match dotenvy::from_path(path) {
        Ok(()) => Ok(()),
        Err(err) if err.not_found() => Ok(()),
        Err(source) => Err(ConfigError::File {
            path: path.to_path_buf(),
            source,
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    /// Colourised output, only wanted on a developer terminal.
    pub ansi: bool,
}

/// Outbound HTTP client settings shared by every vendor client.
#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct BambooHrConfig {
    pub company_domain: String,
    pub api_key: String,
    pub base_url: String,
    pub upload_category: String,
}

impl BambooHrConfig {
    /// Browser link to an employee profile.
    pub fn employee_url(&self, employee_id: u64) -> String {
        format!(
            "https://{}.bamboohr.com/employees/{}",
            self.company_domain, employee_id
        )
    }
}

#[derive(Debug, Clone)]
pub struct TeamTailorConfig {
    pub api_token: String,
    pub base_url: String,
    pub api_version: String,
    pub salary_field_id: String,
    pub location_id: String,
}

#[derive(Debug, Clone)]
pub struct NotionConfig {
    pub api_token: String,
    pub base_url: String,
}

#[derive(Debug, Clone)]
pub struct SlackConfig {
    pub webhook_url: String,
}

/// Knobs for the hire provisioning workflow.
#[derive(Debug, Clone)]
pub struct HiringConfig {
    /// Prefix first names with `TEST_` and generate throwaway work e-mails.
    pub test_mode: bool,
    pub salary_currency: String,
    pub default_location: String,
    /// Parent of the per-run staging directories; the system temp dir if unset.
    pub staging_dir: Option<PathBuf>,
}

#[derive(Debug)]
pub enum ConfigError {
    File {
        path: PathBuf,
        source: dotenvy::Error,
    },
    MissingFields(Vec<&'static str>),
    InvalidPort,
    InvalidHost {
        source: std::net::AddrParseError,
    },
    InvalidNumber {
        key: &'static str,
        value: String,
    },
    InvalidFlag {
        key: &'static str,
        value: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::File { path, .. } => {
                write!(f, "unable to read configuration file {}", path.display())
            }
            ConfigError::MissingFields(fields) => write!(
                f,
                "missing required configuration fields: {}",
                fields.join(", ")
            ),
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidNumber { key, value } => {
                write!(f, "{key} must be a non-negative integer (got '{value}')")
            }
            ConfigError::InvalidFlag { key, value } => {
                write!(f, "{key} must be true or false (got '{value}')")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::File { source, .. } => Some(source),
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::MissingFields(_)
            | ConfigError::InvalidPort
            | ConfigError::InvalidNumber { .. }
            | ConfigError::InvalidFlag { .. } => None,
        }
    }
}
