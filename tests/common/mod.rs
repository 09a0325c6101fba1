pub mod mock_gemini;

use hairforce::Config;

pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::with_endpoint("test-key-123", base_url);
    config.gemini_request_timeout_seconds = 5;
    config
}

pub const PORTRAIT: &str = "data:image/jpeg;base64,/9j/4AAQSkZJRgABAQ==";

pub fn image_response(parts: &[serde_json::Value]) -> String {
    serde_json::json!({
        "candidates": [{
            "content": { "role": "model", "parts": parts },
            "finishReason": "STOP"
        }]
    })
    .to_string()
}
