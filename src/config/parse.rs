//! Runfile discovery and parsing

use crate::config::types::Config;
use crate::error::{ConfigError, ConfigResult, RunfileError};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default Runfile names to search for
const RUNFILE_NAMES: &[&str] = &["Runfile.yml", "Runfile.yaml", "runfile.yml", "runfile.yaml"];

/// Find the Runfile by searching the current directory and its parents
pub fn find_runfile() -> ConfigResult<PathBuf> {
    find_runfile_from(env::current_dir().map_err(|e| {
        ConfigError::Invalid(format!("Failed to get current directory: {}", e))
    })?)
}

/// Find the Runfile starting from a specific directory
pub fn find_runfile_from(start_dir: PathBuf) -> ConfigResult<PathBuf> {
    let mut current_dir = start_dir;
    let mut searched_paths = Vec::new();

    loop {
        for file_name in RUNFILE_NAMES {
            let runfile_path = current_dir.join(file_name);
            searched_paths.push(runfile_path.display().to_string());

            if runfile_path.is_file() {
                return Ok(runfile_path);
            }
        }

        match current_dir.parent() {
            Some(parent) => current_dir = parent.to_path_buf(),
            None => {
                return Err(ConfigError::NotFound(searched_paths.join(", ")));
            }
        }
    }
}

/// Parse a Runfile from a path
pub fn parse_config_file(path: &Path) -> Result<Config, RunfileError> {
    let contents = fs::read_to_string(path).map_err(|e| {
        ConfigError::Invalid(format!("Failed to read {}: {}", path.display(), e))
    })?;

    parse_config(&contents)
}

/// Parse a Runfile from a string
pub fn parse_config(yaml: &str) -> Result<Config, RunfileError> {
    let config: Config = serde_yaml::from_str(yaml)?;
    Ok(config)
}

/// Parse with automatic discovery, returning the config and its path
pub fn parse_config_auto() -> Result<(Config, PathBuf), RunfileError> {
    let runfile_path = find_runfile()?;
    let config = parse_config_file(&runfile_path)?;
    Ok((config, runfile_path))
}

/// Load a `.env` file next to the Runfile, if one exists.
///
/// Returns the path that was loaded. Task bodies inherit the variables
/// through the process environment.
pub fn load_dotenv(runfile_path: &Path) -> Option<PathBuf> {
    let dotenv_path = runfile_path.parent()?.join(".env");
    if !dotenv_path.is_file() {
        return None;
    }
    dotenvy::from_path(&dotenv_path).ok()?;
    Some(dotenv_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_simple_config() {
        let yaml = r#"
tasks:
  hello:
    run: echo "hello"
"#;
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.tasks.len(), 1);
        assert!(config.tasks.contains_key("hello"));
    }

    #[test]
    fn test_parse_invalid_yaml() {
        let result = parse_config("tasks: [not: a: mapping");
        assert!(result.is_err());
    }

    #[test]
    fn test_find_runfile_in_current_dir() {
        let temp_dir = TempDir::new().unwrap();
        let runfile_path = temp_dir.path().join("Runfile.yml");

        fs::write(&runfile_path, "tasks:\n  test:\n    run: echo test\n").unwrap();

        let found = find_runfile_from(temp_dir.path().to_path_buf()).unwrap();
        assert_eq!(found, runfile_path);
    }

    #[test]
    fn test_find_runfile_in_parent_dir() {
        let temp_dir = TempDir::new().unwrap();
        let runfile_path = temp_dir.path().join("Runfile.yml");
        let sub_dir = temp_dir.path().join("subdir");

        fs::create_dir(&sub_dir).unwrap();
        fs::write(&runfile_path, "tasks:\n  test:\n    run: echo test\n").unwrap();

        let found = find_runfile_from(sub_dir).unwrap();
        assert_eq!(found, runfile_path);
    }

    #[test]
    fn test_runfile_not_found() {
        let temp_dir = TempDir::new().unwrap();
        let result = find_runfile_from(temp_dir.path().to_path_buf());
        assert!(result.is_err());
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_load_dotenv_absent() {
        let temp_dir = TempDir::new().unwrap();
        let runfile_path = temp_dir.path().join("Runfile.yml");
        fs::write(&runfile_path, "tasks: {}\n").unwrap();

        assert_eq!(load_dotenv(&runfile_path), None);
    }

    #[test]
    fn test_load_dotenv_present() {
        let temp_dir = TempDir::new().unwrap();
        let runfile_path = temp_dir.path().join("Runfile.yml");
        fs::write(&runfile_path, "tasks: {}\n").unwrap();
        fs::write(temp_dir.path().join(".env"), "RUNFILE_DOTENV_PROBE=1\n").unwrap();

        let loaded = load_dotenv(&runfile_path);
        assert!(loaded.is_some());
        assert_eq!(
            env::var("RUNFILE_DOTENV_PROBE").ok().as_deref(),
            Some("1")
        );
        env::remove_var("RUNFILE_DOTENV_PROBE");
    }
}
