//! Canonical home directory resolution
//!
//! Every lookup of the user's home directory goes through [`get_home_dir`] so
//! that tests and custom deployments can redirect it with `ECO_HOME`.
//!
//! # Precedence
//!
//! 1. `ECO_HOME` environment variable (if set and non-empty)
//! 2. `dirs::home_dir()` platform default

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Environment variable overriding the home directory.
pub const HOME_ENV: &str = "ECO_HOME";

/// Get the home directory for ecosystem operations
///
/// # Errors
///
/// Returns an error if `ECO_HOME` is unset (or blank) and the platform home
/// directory cannot be determined.
pub fn get_home_dir() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Ok(PathBuf::from(trimmed));
        }
    }

    dirs::home_dir().context("Could not determine home directory")
}

/// Directory holding the global config file (`<home>/.config/ecosystem`).
pub fn config_dir(home: &std::path::Path) -> PathBuf {
    home.join(".config").join("ecosystem")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;

    fn with_home_env(value: Option<&str>, f: impl FnOnce()) {
        let original = env::var(HOME_ENV).ok();
        unsafe {
            match value {
                Some(v) => env::set_var(HOME_ENV, v),
                None => env::remove_var(HOME_ENV),
            }
        }

        f();

        unsafe {
            match original {
                Some(v) => env::set_var(HOME_ENV, v),
                None => env::remove_var(HOME_ENV),
            }
        }
    }

    #[test]
    #[serial]
    fn test_eco_home_set() {
        with_home_env(Some("/custom/home"), || {
            let home = get_home_dir().unwrap();
            assert_eq!(home, PathBuf::from("/custom/home"));
        });
    }

    #[test]
    #[serial]
    fn test_eco_home_blank_uses_platform_default() {
        with_home_env(Some("   "), || {
            let home = get_home_dir().unwrap();
            assert_eq!(home, dirs::home_dir().unwrap());
        });
    }

    #[test]
    #[serial]
    fn test_eco_home_unset_uses_platform_default() {
        with_home_env(None, || {
            let home = get_home_dir().unwrap();
            assert_eq!(home, dirs::home_dir().unwrap());
        });
    }

    #[test]
    fn test_config_dir_layout() {
        let dir = config_dir(std::path::Path::new("/home/eco"));
        assert_eq!(dir, PathBuf::from("/home/eco/.config/ecosystem"));
    }
}
