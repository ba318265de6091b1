use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Which store implementation backs the repositories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl StoreBackend {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(format!(
                "Invalid STORE_BACKEND: {}. Must be one of: [\"postgres\", \"memory\"]",
                s
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Memory => "memory",
        }
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
    pub migrations_path: String,
}

/// External vision service used by deposit analysis
#[derive(Debug, Clone)]
pub struct VisionConfig {
    pub url: Option<String>,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout_secs: u64,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub store_backend: StoreBackend,
    pub database: Option<DatabaseConfig>,
    pub vision: VisionConfig,
    pub audit_log_dir: Option<PathBuf>,
    pub log_level: String,
    pub http_host: String,
    pub http_port: u16,
    pub environment: String,
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env_parse::<u32>("DATABASE_MAX_CONNECTIONS").unwrap_or(10);
        let acquire_timeout_secs = env_parse::<u64>("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(30);
        let idle_timeout_secs = env_parse::<u64>("DATABASE_IDLE_TIMEOUT_SECS").unwrap_or(600); // 10 minutes
        let max_lifetime_secs = env_parse::<u64>("DATABASE_MAX_LIFETIME_SECS").unwrap_or(1800); // 30 minutes
        let test_before_acquire = env_parse::<bool>("DATABASE_TEST_BEFORE_ACQUIRE").unwrap_or(true);
        let migrations_path =
            env::var("MIGRATIONS_PATH").unwrap_or_else(|_| "./migrations".to_string());

        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
            migrations_path,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/barter".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
            migrations_path: "./migrations".to_string(),
        }
    }
}

impl VisionConfig {
    pub fn from_env() -> Result<Self, String> {
        let timeout_secs = env_parse::<u64>("VISION_TIMEOUT_SECS").unwrap_or(60);
        if timeout_secs == 0 {
            return Err("VISION_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url: env::var("VISION_SERVICE_URL").ok().filter(|s| !s.is_empty()),
            api_key: env::var("VISION_API_KEY").ok().filter(|s| !s.is_empty()),
            model: env::var("VISION_MODEL").unwrap_or_else(|_| "gpt-4o".to_string()),
            timeout_secs,
        })
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            model: "gpt-4o".to_string(),
            timeout_secs: 60,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let store_backend = match env::var("STORE_BACKEND") {
            Ok(s) => StoreBackend::from_str(&s)?,
            Err(_) => StoreBackend::Postgres,
        };

        let database = match store_backend {
            StoreBackend::Postgres => Some(DatabaseConfig::from_env()?),
            StoreBackend::Memory => None,
        };

        let vision = VisionConfig::from_env()?;

        let audit_log_dir = env::var("AUDIT_LOG_DIR")
            .ok()
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let http_host = env::var("HTTP_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());

        let http_port = match env::var("HTTP_PORT") {
            Ok(s) => s
                .parse::<u16>()
                .map_err(|_| format!("Invalid HTTP_PORT: {}", s))?,
            Err(_) => 8002,
        };

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            store_backend,
            database,
            vision,
            audit_log_dir,
            log_level: log_level.to_lowercase(),
            http_host,
            http_port,
            environment: environment.to_lowercase(),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Socket address string the HTTP server binds to
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database: None,
            vision: VisionConfig::default(),
            audit_log_dir: None,
            log_level: "info".to_string(),
            http_host: "0.0.0.0".to_string(),
            http_port: 8002,
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout_secs, 30);
        assert_eq!(config.migrations_path, "./migrations");
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.http_port, 8002);
        assert_eq!(config.store_backend, StoreBackend::Memory);
        assert!(config.is_development());
        assert!(!config.is_production());
        assert_eq!(config.http_addr(), "0.0.0.0:8002");
    }

    #[test]
    fn test_store_backend_parsing() {
        assert_eq!(StoreBackend::from_str("Postgres").unwrap(), StoreBackend::Postgres);
        assert_eq!(StoreBackend::from_str("memory").unwrap(), StoreBackend::Memory);
        assert!(StoreBackend::from_str("mongo").is_err());
        assert_eq!(StoreBackend::Memory.as_str(), "memory");
    }

    #[test]
    fn test_vision_timeout() {
        let vision = VisionConfig::default();
        assert_eq!(vision.timeout(), Duration::from_secs(60));
        assert!(vision.url.is_none());
    }
}
