use std::collections::HashMap;

use crate::config::Config;

pub fn test_config() -> Config {
    let env = HashMap::from([
        ("EMAIL_HOST", "smtp.example.com"),
        ("EMAIL_USER", "mailer"),
        ("EMAIL_PASS", "secret"),
        ("EMAIL_FROM", "Landing <noreply@example.com>"),
        ("EMAIL_TO", "sales@example.com"),
    ]);
    Config::from_lookup(|key| env.get(key).map(|value| value.to_string()))
        .expect("test config is complete")
}
