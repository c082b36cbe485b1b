use std::env;
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:5000/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub auth_token: Option<String>,
    pub request_timeout_secs: u64,
    pub print_metrics: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            auth_token: None,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            print_metrics: false,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let settings = config::Config::builder()
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        let api_base_url = settings
            .get_string("api.base_url")
            .or_else(|_| env::var("QUIZ_API_URL"))
            .unwrap_or_else(|_| DEFAULT_API_BASE_URL.to_string());

        let auth_token = settings
            .get_string("api.token")
            .or_else(|_| env::var("QUIZ_API_TOKEN"))
            .ok()
            .filter(|token| !token.trim().is_empty());

        let request_timeout_secs = match settings.get_int("api.timeout_secs") {
            Ok(value) => u64::try_from(value).map_err(|_| {
                config::ConfigError::Message(format!(
                    "api.timeout_secs must be positive, got {}",
                    value
                ))
            })?,
            Err(_) => env::var("QUIZ_API_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
        };

        let print_metrics = settings.get_bool("metrics.print").unwrap_or(false);

        let config = Config {
            api_base_url,
            auth_token,
            request_timeout_secs,
            print_metrics,
        };
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let url = url::Url::parse(&self.api_base_url).map_err(|e| {
            config::ConfigError::Message(format!(
                "invalid api base url {}: {}",
                self.api_base_url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(config::ConfigError::Message(format!(
                "api base url must use http or https, got {}",
                url.scheme()
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
