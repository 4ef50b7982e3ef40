use clap::builder::TypedValueParser as _;
use clap::Parser;
use dotenvy::dotenv;
use log::LevelFilter;
use semver::{BuildMetadata, Prerelease, Version};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use utoipa::IntoParams;

type APiVersionList = [&'static str; 1];

const DEFAULT_API_VERSION: &str = "1.0.0-beta1";
// Expand this array to include all valid API versions. Versions that have been
// completely removed should be removed from this list - they're no longer valid.
const API_VERSIONS: APiVersionList = [DEFAULT_API_VERSION];

static X_VERSION: &str = "x-version";

/// Default Zoom REST API base URL used when `ZOOM_API_BASE_URL` is not set.
pub const DEFAULT_ZOOM_API_BASE_URL: &str = "https://api.zoom.us/v2";

/// Default Zoom OAuth base URL used when `ZOOM_OAUTH_BASE_URL` is not set.
pub const DEFAULT_ZOOM_OAUTH_BASE_URL: &str = "https://zoom.us";

/// Default OpenAI API base URL used when `OPENAI_BASE_URL` is not set.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Header)]
pub struct ApiVersion {
    /// The version of the API to use for a request.
    #[param(rename = "x-version", style = Simple, required, example = "1.0.0-beta1", value_type = String)]
    pub version: Version,
}

#[derive(Clone, Debug, PartialEq)]
pub enum RustEnv {
    Development,
    Production,
    Staging,
}

#[derive(Debug, PartialEq, Eq)]
pub struct RustEnvParseError;

impl FromStr for RustEnv {
    type Err = RustEnvParseError;
    fn from_str(level: &str) -> Result<RustEnv, Self::Err> {
        match level.to_lowercase().as_str() {
            "development" => Ok(RustEnv::Development),
            "production" => Ok(RustEnv::Production),
            "staging" => Ok(RustEnv::Staging),
            _ => Err(RustEnvParseError),
        }
    }
}

impl fmt::Display for RustEnv {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            RustEnv::Development => write!(f, "development"),
            RustEnv::Production => write!(f, "production"),
            RustEnv::Staging => write!(f, "staging"),
        }
    }
}

#[derive(Clone, Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// A list of full CORS origin URLs that allowed to receive server responses.
    #[arg(
        long,
        env,
        value_delimiter = ',',
        use_value_delimiter = true,
        default_value = "http://localhost:3000,https://localhost:3000"
    )]
    pub allowed_origins: Vec<String>,

    /// Set the current semantic version of the endpoint API to expose to clients. All
    /// endpoints not contained in the specified version will not be exposed by the router.
    #[arg(short, long, env, default_value = DEFAULT_API_VERSION,
        value_parser = clap::builder::PossibleValuesParser::new(API_VERSIONS)
            .map(|s| s.parse::<String>().unwrap()),
        )]
    pub api_version: Option<String>,

    /// The Zoom OAuth application client ID.
    #[arg(long, env)]
    zoom_client_id: Option<String>,

    /// The Zoom OAuth application client secret.
    #[arg(long, env)]
    zoom_client_secret: Option<String>,

    /// The redirect URL registered with the Zoom OAuth application.
    /// Zoom sends the authorization code to this URL after user consent.
    #[arg(long, env)]
    zoom_redirect_url: Option<String>,

    /// The base URL of the Zoom REST API.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_ZOOM_API_BASE_URL)]
    zoom_api_base_url: String,

    /// The base URL used for Zoom OAuth authorization and token exchange.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_ZOOM_OAUTH_BASE_URL)]
    zoom_oauth_base_url: String,

    /// The base URL of the OpenAI API used for transcription and summarization.
    /// Override in tests to point at a mock server.
    #[arg(long, env, default_value = DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,

    /// The API key to use when calling the OpenAI API.
    #[arg(long, env)]
    openai_api_key: Option<String>,

    /// Hex-encoded 32-byte AES-256 key used to encrypt OAuth tokens at rest.
    #[arg(long, env)]
    token_encryption_key: Option<String>,

    /// The base URL of the frontend application (e.g. https://app.momentum.com).
    /// Users are redirected here after a successful OAuth connection.
    #[arg(long, env)]
    frontend_base_url: Option<String>,

    /// Minimum spacing in milliseconds between consecutive Zoom API requests.
    #[arg(long, env, default_value_t = 20)]
    pub rate_limit_base_spacing_ms: u64,

    /// Upper bound in milliseconds on the backed-off request spacing.
    #[arg(long, env, default_value_t = 5000)]
    pub rate_limit_max_spacing_ms: u64,

    /// Seconds without throttling before the request spacing starts decaying.
    #[arg(long, env, default_value_t = 60)]
    pub rate_limit_quiet_period_secs: u64,

    /// The host interface to listen for incoming connections
    #[arg(short, long, env, default_value = "127.0.0.1")]
    pub interface: Option<String>,

    /// The host TCP port to listen for incoming connections
    #[arg(short, long, env, default_value_t = 4000)]
    pub port: u16,

    /// Set the log level verbosity threshold (level) to control what gets displayed on console output
    #[arg(
        short,
        long,
        env,
        default_value_t = LevelFilter::Info,
        value_parser = clap::builder::PossibleValuesParser::new(["OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE"])
            .map(|s| s.parse::<LevelFilter>().unwrap()),
        )]
    pub log_level_filter: LevelFilter,

    /// Set the Rust runtime environment to use.
    #[arg(
    short,
    long,
    env,
    default_value_t = RustEnv::Development,
    value_parser = clap::builder::PossibleValuesParser::new([
        "DEVELOPMENT", "PRODUCTION", "STAGING",
        "development", "production", "staging"
    ])
        .map(|s| s.parse::<RustEnv>().unwrap()),
    )]
    pub runtime_env: RustEnv,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        // Load .env file first
        dotenv().ok();
        // Then parse the command line parameters and flags
        Config::parse()
    }

    pub fn api_version(&self) -> &str {
        self.api_version
            .as_ref()
            .expect("No API version string provided")
    }

    /// Returns the Zoom OAuth client ID, if configured.
    pub fn zoom_client_id(&self) -> Option<String> {
        self.zoom_client_id.clone()
    }

    /// Returns the Zoom OAuth client secret, if configured.
    pub fn zoom_client_secret(&self) -> Option<String> {
        self.zoom_client_secret.clone()
    }

    /// Returns the Zoom OAuth redirect URL, if configured.
    pub fn zoom_redirect_url(&self) -> Option<String> {
        self.zoom_redirect_url.clone()
    }

    /// Returns the Zoom REST API base URL.
    pub fn zoom_api_base_url(&self) -> &str {
        &self.zoom_api_base_url
    }

    /// Returns the Zoom OAuth base URL.
    pub fn zoom_oauth_base_url(&self) -> &str {
        &self.zoom_oauth_base_url
    }

    /// Returns the OpenAI API base URL.
    pub fn openai_base_url(&self) -> &str {
        &self.openai_base_url
    }

    /// Returns the OpenAI API key, if configured.
    pub fn openai_api_key(&self) -> Option<String> {
        self.openai_api_key.clone()
    }

    /// Returns the hex-encoded token encryption key, if configured.
    pub fn token_encryption_key(&self) -> Option<String> {
        self.token_encryption_key.clone()
    }

    /// Returns the frontend application base URL used for post-OAuth redirects.
    pub fn frontend_base_url(&self) -> Option<String> {
        self.frontend_base_url.clone()
    }

    pub fn runtime_env(&self) -> RustEnv {
        self.runtime_env.clone()
    }

    pub fn is_production(&self) -> bool {
        // This could check an environment variable, or a config field
        self.runtime_env() == RustEnv::Production
    }
}

impl ApiVersion {
    pub fn new(version_str: &'static str) -> Self {
        ApiVersion {
            version: Version::parse(version_str).unwrap_or(Version {
                major: 0,
                minor: 0,
                patch: 1,
                pre: Prerelease::EMPTY,
                build: BuildMetadata::EMPTY,
            }),
        }
    }

    pub fn default_version() -> &'static str {
        DEFAULT_API_VERSION
    }

    pub fn field_name() -> &'static str {
        X_VERSION
    }

    pub fn versions() -> APiVersionList {
        API_VERSIONS
    }
}

impl Default for ApiVersion {
    fn default() -> Self {
        ApiVersion {
            version: Version::parse(DEFAULT_API_VERSION).unwrap_or(Version {
                major: 0,
                minor: 0,
                patch: 1,
                pre: Prerelease::EMPTY,
                build: BuildMetadata::EMPTY,
            }),
        }
    }
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.version)
    }
}
