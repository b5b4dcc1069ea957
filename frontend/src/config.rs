const DEFAULT_BACKEND_URL: &str = "http://localhost:3000";

/// Backend origin baked in at compile time through `BACKEND_URL`.
pub fn get_backend_url() -> &'static str {
    option_env!("BACKEND_URL").unwrap_or(DEFAULT_BACKEND_URL)
}

pub fn contact_endpoint() -> String {
    format!("{}/api/contact", get_backend_url().trim_end_matches('/'))
}
