use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;
use std::time::Duration;

pub struct Config {
    pub port: u16,
    pub log_level: String,
    pub jwt_secret: String,
    pub request_timeout: Duration,
    pub cache_ttl: Duration,
    pub bootstrap_approver: Option<BootstrapApprover>,
}

/// First APPROVER account, created at startup so that further approvers can
/// be registered through the protected `/api/approvers` route.
pub struct BootstrapApprover {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("port", &self.port)
            .field("log_level", &self.log_level)
            .field("jwt_secret", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .field("cache_ttl", &self.cache_ttl)
            .field(
                "bootstrap_approver",
                &self.bootstrap_approver.as_ref().map(|a| a.email.as_str()),
            )
            .finish()
    }
}

fn env_secs(key: &str, default: u64) -> Duration {
    Duration::from_secs(env::var(key).ok().and_then(|v| v.parse().ok()).unwrap_or(default))
}

fn bootstrap_approver_from_env() -> Option<BootstrapApprover> {
    let email = env::var("BOOTSTRAP_APPROVER_EMAIL").ok()?;
    let password = env::var("BOOTSTRAP_APPROVER_PASSWORD").ok()?;
    Some(BootstrapApprover {
        id: env::var("BOOTSTRAP_APPROVER_ID").unwrap_or_else(|_| "approver-1".to_string()),
        name: env::var("BOOTSTRAP_APPROVER_NAME").unwrap_or_else(|_| "Payroll Approver".to_string()),
        email,
        password,
    })
}

impl Config {
    fn from_env() -> Self {
        dotenv().ok();

        Self {
            port: env::var("PORT").ok().and_then(|v| v.parse().ok()).unwrap_or(3000),
            log_level: env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            jwt_secret: env::var("JWT_SECRET").unwrap_or_else(|_| "secret".to_string()), // Override in production
            request_timeout: env_secs("REQUEST_TIMEOUT_SECS", 30),
            cache_ttl: env_secs("CACHE_TTL_SECS", 60),
            bootstrap_approver: bootstrap_approver_from_env(),
        }
    }
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
