use std::env;
use std::path::PathBuf;

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_DB_FILE: &str = "posture.sqlite3";

/// Server configuration, read once at startup from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub database_path: PathBuf,
    /// Whether `ambiguous*` postures count toward daily stats.
    pub collect_ambiguous: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DB_FILE),
            collect_ambiguous: true,
        }
    }
}

impl Config {
    /// Reads `PORT`, `POSTURE_DB` and `COLLECT_AMBIGUOUS`, falling back to
    /// defaults for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse::<u16>().ok())
            .unwrap_or(defaults.port);

        let database_path = env::var("POSTURE_DB")
            .map(PathBuf::from)
            .unwrap_or(defaults.database_path);

        let collect_ambiguous = env::var("COLLECT_AMBIGUOUS")
            .ok()
            .and_then(|raw| parse_bool_flag(&raw))
            .unwrap_or(defaults.collect_ambiguous);

        Self {
            port,
            database_path,
            collect_ambiguous,
        }
    }
}

/// Parses a boolean environment flag. Recognized (case-insensitive):
/// `true/false`, `1/0`, `yes/no`, `y/n`, `on/off`. Anything else is `None`
/// so the caller's default applies.
pub fn parse_bool_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_truthy_and_falsy_spellings() {
        for raw in ["true", "TRUE", "1", "yes", "Y", "on", " On "] {
            assert_eq!(parse_bool_flag(raw), Some(true), "{raw}");
        }
        for raw in ["false", "False", "0", "no", "N", "off", "OFF"] {
            assert_eq!(parse_bool_flag(raw), Some(false), "{raw}");
        }
    }

    #[test]
    fn unrecognized_values_fall_back_to_default() {
        assert_eq!(parse_bool_flag(""), None);
        assert_eq!(parse_bool_flag("maybe"), None);
        assert_eq!(parse_bool_flag("2"), None);
    }

    #[test]
    fn default_collects_ambiguous() {
        let config = Config::default();
        assert!(config.collect_ambiguous);
        assert_eq!(config.port, 8080);
    }
}
