use clap::Parser;

pub const DEFAULT_PORT: u16 = 3001;
pub const DEFAULT_ENVIRONMENT: &str = "development";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_RATE_LIMIT_MAX: u32 = 100;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 15 * 60;

#[derive(Parser, Clone, Debug)]
#[command(name = "vortex-api", about = "VorteX mock REST API")]
pub struct Config {
    /// HTTP port to listen on.
    #[arg(long, env = "PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Deployment environment (`development`, `staging`, `production`).
    #[arg(long, env = "NODE_ENV", default_value = DEFAULT_ENVIRONMENT)]
    pub environment: String,

    /// Comma-separated list of origins allowed by CORS.
    #[arg(
        long,
        env = "CORS_ORIGINS",
        value_delimiter = ',',
        default_value = DEFAULT_CORS_ORIGIN
    )]
    pub cors_origins: Vec<String>,

    /// Requests allowed per client IP within one window.
    #[arg(long, env = "RATE_LIMIT_MAX", default_value_t = DEFAULT_RATE_LIMIT_MAX)]
    pub rate_limit_max: u32,

    /// Rate-limit window length in seconds.
    #[arg(long, env = "RATE_LIMIT_WINDOW_SECS", default_value_t = DEFAULT_RATE_LIMIT_WINDOW_SECS)]
    pub rate_limit_window_secs: u64,

    /// Seed for deterministic mock data (random when omitted).
    #[arg(long, env = "MOCK_SEED")]
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            environment: DEFAULT_ENVIRONMENT.to_string(),
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            rate_limit_max: DEFAULT_RATE_LIMIT_MAX,
            rate_limit_window_secs: DEFAULT_RATE_LIMIT_WINDOW_SECS,
            seed: None,
        }
    }
}

impl Config {
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}
