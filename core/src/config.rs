use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub model_path: PathBuf,
    pub preview_rows: usize,
    pub max_upload_bytes: usize,
    pub log_requests: bool,
}

impl CoreConfig {
    pub fn from_env() -> Self {
        let model_path = std::env::var("PAYGRADE_MODEL_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_model_path());

        let preview_rows = std::env::var("PAYGRADE_PREVIEW_ROWS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .map(clamp_preview_rows)
            .unwrap_or(5);

        let max_upload_bytes = std::env::var("PAYGRADE_MAX_UPLOAD_BYTES")
            .ok()
            .and_then(|value| value.parse::<usize>().ok())
            .map(clamp_upload_bytes)
            .unwrap_or(20 * 1024 * 1024);

        let log_requests = parse_bool_env("PAYGRADE_LOG_REQUESTS", false);

        CoreConfig {
            model_path,
            preview_rows,
            max_upload_bytes,
            log_requests,
        }
    }
}

fn default_model_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("models")
        .join("salary_model.json")
}

fn clamp_preview_rows(value: usize) -> usize {
    let normalized = if value == 0 { 1 } else { value };
    normalized.min(100)
}

fn clamp_upload_bytes(value: usize) -> usize {
    let normalized = if value < 64 * 1024 { 64 * 1024 } else { value };
    normalized.min(512 * 1024 * 1024)
}

fn parse_bool_env(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "1" | "true" | "yes"
            )
        })
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_rows_clamp() {
        assert_eq!(clamp_preview_rows(0), 1);
        assert_eq!(clamp_preview_rows(5), 5);
        assert_eq!(clamp_preview_rows(10_000), 100);
    }

    #[test]
    fn upload_bytes_clamp() {
        assert_eq!(clamp_upload_bytes(0), 64 * 1024);
        assert_eq!(clamp_upload_bytes(1024 * 1024), 1024 * 1024);
        assert_eq!(clamp_upload_bytes(usize::MAX), 512 * 1024 * 1024);
    }
}
