use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Error, IoResultExt, Result};

pub const CONFIG_FILE: &str = "config.json";

/// Repository settings persisted as `config.json`.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Config {
    /// URL of the remote bucket used by `push` and `pull`.
    #[serde(default)]
    pub bucket: Option<String>,

    /// When the repository was first initialized. Absent in configs
    /// written before it was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<DateTime<Utc>>,
}

impl Config {
    pub fn load(repo_dir: &Path) -> Result<Config> {
        let path = repo_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }

        let bytes = fs::read(&path).at(&path)?;
        serde_json::from_slice(&bytes).map_err(|source| Error::Config { path, source })
    }

    pub fn save(&self, repo_dir: &Path) -> Result<()> {
        let path = repo_dir.join(CONFIG_FILE);
        let json = serde_json::to_vec(self).map_err(std::io::Error::from)?;
        fs::write(&path, json).at(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_is_default() {
        let temp = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(temp.path()).unwrap(), Config::default());
    }

    #[test]
    fn save_and_load() {
        let temp = tempfile::tempdir().unwrap();
        let config = Config {
            bucket: Some("s3://my-bucket/repos".to_string()),
            created: None,
        };

        config.save(temp.path()).unwrap();
        assert_eq!(
            fs::read_to_string(temp.path().join(CONFIG_FILE)).unwrap(),
            r#"{"bucket":"s3://my-bucket/repos"}"#
        );
        assert_eq!(Config::load(temp.path()).unwrap(), config);
    }

    #[test]
    fn created_round_trips() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            r#"{"bucket":null,"created":"2024-05-01T09:30:00.125Z"}"#,
        )
        .unwrap();

        let config = Config::load(temp.path()).unwrap();
        assert_eq!(
            config.created.unwrap().to_rfc3339(),
            "2024-05-01T09:30:00.125+00:00"
        );

        config.save(temp.path()).unwrap();
        assert_eq!(Config::load(temp.path()).unwrap(), config);
    }

    #[test]
    fn null_and_missing_bucket() {
        let temp = tempfile::tempdir().unwrap();

        fs::write(temp.path().join(CONFIG_FILE), r#"{"bucket":null}"#).unwrap();
        assert_eq!(Config::load(temp.path()).unwrap().bucket, None);

        fs::write(temp.path().join(CONFIG_FILE), "{}").unwrap();
        assert_eq!(Config::load(temp.path()).unwrap().bucket, None);
    }

    #[test]
    fn malformed_file() {
        let temp = tempfile::tempdir().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "bucket = 'x'").unwrap();

        let err = Config::load(temp.path()).unwrap_err();
        if let Error::Config { path, .. } = err {
            assert_eq!(path, temp.path().join(CONFIG_FILE));
        } else {
            panic!("Unexpected error {:?}", err);
        }
    }
}
