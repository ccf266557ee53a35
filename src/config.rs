use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_DATA_SOURCE: &str = "Cluster0";
const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";
const DEFAULT_PROPERTIES_PATH: &str = "client.properties";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

/// Default number of movies requested from the store.
pub const DEFAULT_MOVIE_LIMIT: usize = 20;
/// Default minimum IMDb rating for a movie to be selected.
pub const DEFAULT_MIN_RATING: f64 = 8.0;
/// Default minimum IMDb vote count for a movie to be selected.
pub const DEFAULT_MIN_VOTES: u64 = 50_000;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for a single Movie Digest run.
///
/// Built once at process start and handed to the stage constructors by reference.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the MongoDB Data API endpoint.
    pub mongodb_uri: String,
    /// Database holding the movie collection.
    pub mongodb_database: String,
    /// Collection holding movie documents.
    pub mongodb_collection: String,
    /// Data API data source (cluster) name.
    pub mongodb_data_source: String,
    /// Optional Data API key.
    pub mongodb_api_key: Option<String>,
    /// Maximum number of movies loaded per run.
    pub movie_limit: usize,
    /// Minimum IMDb rating accepted by the selection predicate.
    pub movie_min_rating: f64,
    /// Minimum IMDb vote count accepted by the selection predicate.
    pub movie_min_votes: u64,
    /// Backend used to generate the summary.
    pub summary_provider: SummaryProvider,
    /// OpenAI API key, required when the provider is OpenAI.
    pub openai_api_key: Option<String>,
    /// Model identifier passed to the completion provider.
    pub openai_model: String,
    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,
    /// Base URL of the Ollama runtime.
    pub ollama_url: String,
    /// Kafka topic receiving the digest.
    pub topic_name: String,
    /// Path of the broker properties file.
    pub kafka_properties_path: PathBuf,
    /// Request timeout applied to every outbound HTTP client.
    pub http_timeout_secs: u64,
    /// How collaborator failures are handled per stage.
    pub failure_policies: FailurePolicies,
}

/// Supported completion backends for the summarize stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SummaryProvider {
    /// Hosted OpenAI chat completions API.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

/// What a stage does when its collaborator fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Propagate the failure and abort the run.
    Abort,
    /// Log the failure and continue with a degraded result.
    Degrade,
}

/// Failure policies for each collaborator-backed stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FailurePolicies {
    /// Store-read failures in the load stage.
    pub load: FailurePolicy,
    /// Inference failures in the summarize stage.
    pub summarize: FailurePolicy,
    /// Delivery failures in the publish stage.
    pub publish: FailurePolicy,
}

impl Default for FailurePolicies {
    fn default() -> Self {
        Self {
            load: FailurePolicy::Degrade,
            summarize: FailurePolicy::Abort,
            publish: FailurePolicy::Degrade,
        }
    }
}

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = FailurePolicies::default();
        let summary_provider = match load_env_optional("SUMMARY_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("SUMMARY_PROVIDER".into()))?,
            None => SummaryProvider::OpenAI,
        };
        let openai_api_key = load_env_optional("OPENAI_API_KEY");
        if summary_provider == SummaryProvider::OpenAI && openai_api_key.is_none() {
            return Err(ConfigError::MissingVariable("OPENAI_API_KEY".into()));
        }

        Ok(Self {
            mongodb_uri: load_env("MONGODB_URI")?,
            mongodb_database: load_env("MONGODB_DATABASE")?,
            mongodb_collection: load_env("MONGODB_COLLECTION")?,
            mongodb_data_source: load_env_optional("MONGODB_DATA_SOURCE")
                .unwrap_or_else(|| DEFAULT_DATA_SOURCE.to_string()),
            mongodb_api_key: load_env_optional("MONGODB_API_KEY"),
            movie_limit: movie_limit(parse_optional("MOVIE_LIMIT")?)?,
            movie_min_rating: parse_optional("MOVIE_MIN_RATING")?.unwrap_or(DEFAULT_MIN_RATING),
            movie_min_votes: parse_optional("MOVIE_MIN_VOTES")?.unwrap_or(DEFAULT_MIN_VOTES),
            summary_provider,
            openai_api_key,
            openai_model: load_env_optional("OPENAI_MODEL")
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: load_env_optional("OPENAI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            ollama_url: load_env_optional("OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            topic_name: load_env("CC_TOPIC_NAME")?,
            kafka_properties_path: load_env_optional("KAFKA_PROPERTIES")
                .unwrap_or_else(|| DEFAULT_PROPERTIES_PATH.to_string())
                .into(),
            http_timeout_secs: parse_optional("HTTP_TIMEOUT_SECS")?
                .unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            failure_policies: FailurePolicies {
                load: parse_optional("LOAD_FAILURE_POLICY")?.unwrap_or(defaults.load),
                summarize: parse_optional("SUMMARY_FAILURE_POLICY")?
                    .unwrap_or(defaults.summarize),
                publish: parse_optional("PUBLISH_FAILURE_POLICY")?.unwrap_or(defaults.publish),
            },
        })
    }

    /// Timeout applied to outbound HTTP requests.
    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}

fn load_env(key: &str) -> Result<String, ConfigError> {
    load_env_optional(key).ok_or_else(|| ConfigError::MissingVariable(key.to_string()))
}

fn load_env_optional(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// A limit of zero means "no limit" to the store, so it is rejected.
fn movie_limit(value: Option<usize>) -> Result<usize, ConfigError> {
    match value {
        Some(0) => Err(ConfigError::InvalidValue("MOVIE_LIMIT".into())),
        Some(limit) => Ok(limit),
        None => Ok(DEFAULT_MOVIE_LIMIT),
    }
}

fn parse_optional<T: std::str::FromStr>(key: &str) -> Result<Option<T>, ConfigError> {
    load_env_optional(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

impl std::str::FromStr for SummaryProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

impl std::str::FromStr for FailurePolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "abort" => Ok(Self::Abort),
            "degrade" => Ok(Self::Degrade),
            _ => Err(()),
        }
    }
}

/// Build the configuration for this process and log the non-secret settings.
pub fn init_config() -> Result<Config, ConfigError> {
    let config = Config::from_env()?;
    tracing::debug!(
        mongodb_uri = %config.mongodb_uri,
        database = %config.mongodb_database,
        collection = %config.mongodb_collection,
        provider = ?config.summary_provider,
        model = %config.openai_model,
        topic = %config.topic_name,
        policies = ?config.failure_policies,
        "Loaded configuration"
    );
    Ok(config)
}
