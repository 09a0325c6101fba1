use std::env;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use tracing::warn;
use url::Url;

pub const DEFAULT_GEMINI_API_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone)]
pub struct Config {
    pub log_level: String,
    pub log_dir: PathBuf,
    pub gemini_api_key: String,
    pub gemini_image_model: String,
    pub gemini_api_base_url: Url,
    pub gemini_request_timeout_seconds: u64,
}

pub static CONFIG: Lazy<Config> = Lazy::new(Config::load);

fn env_string(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn default_base_url() -> Url {
    Url::parse(DEFAULT_GEMINI_API_BASE_URL).expect("default Gemini base URL is valid")
}

fn normalize_base_url(value: &str) -> Url {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return default_base_url();
    }

    match Url::parse(trimmed) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => url,
        Ok(url) => {
            warn!(
                "Unsupported GEMINI_API_BASE_URL scheme '{}'; using {}",
                url.scheme(),
                DEFAULT_GEMINI_API_BASE_URL
            );
            default_base_url()
        }
        Err(err) => {
            warn!(
                "Invalid GEMINI_API_BASE_URL '{}': {}; using {}",
                trimmed, err, DEFAULT_GEMINI_API_BASE_URL
            );
            default_base_url()
        }
    }
}

fn normalize_model(value: String) -> String {
    let trimmed = value.trim();
    let trimmed = trimmed.strip_prefix("models/").unwrap_or(trimmed);
    if trimmed.is_empty() {
        return DEFAULT_GEMINI_IMAGE_MODEL.to_string();
    }
    trimmed.to_string()
}

impl Config {
    pub fn load() -> Self {
        Config {
            log_level: env_string("LOG_LEVEL", "info").to_lowercase(),
            log_dir: PathBuf::from(env_string("LOG_DIR", "logs")),
            gemini_api_key: env_string("GEMINI_API_KEY", "").trim().to_string(),
            gemini_image_model: normalize_model(env_string(
                "GEMINI_IMAGE_MODEL",
                DEFAULT_GEMINI_IMAGE_MODEL,
            )),
            gemini_api_base_url: normalize_base_url(&env_string(
                "GEMINI_API_BASE_URL",
                DEFAULT_GEMINI_API_BASE_URL,
            )),
            gemini_request_timeout_seconds: env_u64("GEMINI_REQUEST_TIMEOUT_SECONDS", 90).max(1),
        }
    }

    /// Configuration pointing at an explicit endpoint, used by hosts that do not
    /// read the environment (and by tests against a local mock service).
    pub fn with_endpoint(api_key: &str, base_url: &str) -> Self {
        Config {
            log_level: "info".to_string(),
            log_dir: PathBuf::from("logs"),
            gemini_api_key: api_key.trim().to_string(),
            gemini_image_model: DEFAULT_GEMINI_IMAGE_MODEL.to_string(),
            gemini_api_base_url: normalize_base_url(base_url),
            gemini_request_timeout_seconds: 90,
        }
    }
}

pub const HAIRSTYLE_SYSTEM_PROMPT: &str = "Apply a professional hairstyle to this person.
Keep the same face, facial features, skin tone, expression, and identity completely unchanged.
Do not modify the background or the person's clothing.
Make the hairstyle look realistic, professionally cut, and naturally blended with the head shape.
Match lighting, shadows, and hair texture to the original photo.
High detail, photorealistic, premium barbershop quality.";

pub const PROCESSING_MESSAGE: &str = "Analyzing face and applying style...";

pub const GENERIC_FAILURE_MESSAGE: &str = "Failed to apply hairstyle. Please try again.";
