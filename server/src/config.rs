use std::{env, fmt::Display, path::PathBuf, str::FromStr};

use foodgram_core::FontSource;
use tracing::{info, warn};

pub struct Config {
    pub database_url: String,
    pub bind_addr: String,
    pub db_pool_size: u32,
    pub font: FontSource,
}

impl Config {
    pub fn load() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            bind_addr: try_load("BIND_ADDR", "0.0.0.0:3000"),
            db_pool_size: try_load("DB_POOL_SIZE", "10"),
            font: font_source(env::var("SHOPPING_LIST_FONT").ok()),
        }
    }
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    parse_or_default(key, env::var(key).ok(), default).expect("Environment misconfigured!")
}

fn parse_or_default<T: FromStr>(key: &str, value: Option<String>, default: &str) -> Result<T, String>
where
    T::Err: Display,
{
    let raw = value.unwrap_or_else(|| {
        info!("{key} not set, using default: {default}");
        default.to_string()
    });

    raw.trim().parse().map_err(|e: T::Err| {
        warn!("Invalid {key} value {raw:?}: {e}");
        format!("Invalid {key} value {raw:?}: {e}")
    })
}

fn font_source(value: Option<String>) -> FontSource {
    match value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
        Some(path) => {
            info!("Shopping list PDFs will embed font {path}");
            FontSource::File(PathBuf::from(path))
        }
        None => {
            info!("SHOPPING_LIST_FONT not set, using bundled DejaVu Sans");
            FontSource::Bundled
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_used_when_unset() {
        let size: u32 = parse_or_default("DB_POOL_SIZE", None, "10").unwrap();
        assert_eq!(size, 10);
    }

    #[test]
    fn test_value_overrides_default() {
        let size: u32 = parse_or_default("DB_POOL_SIZE", Some(" 4 ".to_string()), "10").unwrap();
        assert_eq!(size, 4);
    }

    #[test]
    fn test_invalid_value_is_an_error() {
        let result: Result<u32, _> =
            parse_or_default("DB_POOL_SIZE", Some("lots".to_string()), "10");
        assert!(result.is_err());
    }

    #[test]
    fn test_font_source() {
        assert_eq!(font_source(None), FontSource::Bundled);
        assert_eq!(font_source(Some("  ".to_string())), FontSource::Bundled);
        assert_eq!(
            font_source(Some("/usr/share/fonts/arial.ttf".to_string())),
            FontSource::File(PathBuf::from("/usr/share/fonts/arial.ttf"))
        );
    }
}
