//! Layered run settings: `params.yaml`, then `LCD_*` environment variables,
//! then command-line overrides.

use crate::error::Result;
use crate::utils::constants::PARAMS_FILE;
use ::config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;
use validator::Validate;

#[derive(Debug, Clone, PartialEq, Deserialize, Validate)]
pub struct Params {
    #[validate(range(min = 1900, max = 2100))]
    pub year: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    pub params: Params,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

/// Values given on the command line; `None` leaves lower layers in effect
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub year: Option<i32>,
    pub data_dir: Option<PathBuf>,
}

impl Settings {
    /// An explicit `config_file` must exist; the default `params.yaml` is optional
    pub fn load(config_file: Option<&Path>, overrides: &Overrides) -> Result<Self> {
        let file = match config_file {
            Some(path) => File::from(path).required(true),
            None => File::new(PARAMS_FILE, FileFormat::Yaml).required(false),
        };

        let builder = Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("LCD")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("params.year", overrides.year.map(i64::from))?
            .set_override_option(
                "data_dir",
                overrides
                    .data_dir
                    .as_ref()
                    .map(|p| p.to_string_lossy().into_owned()),
            )?;

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.params.validate()?;
        debug!(?settings, "Loaded settings");
        Ok(settings)
    }

    pub fn year(&self) -> i32 {
        self.params.year
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use tempfile::TempDir;

    fn write_params(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("params.yaml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_reads_year_and_ignores_unknown_keys() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_params(&dir, "params:\n  year: 2019\n  n_locs: 50\n");

        let settings = Settings::load(Some(&path), &Overrides::default())?;

        assert_eq!(settings.year(), 2019);
        assert_eq!(settings.data_dir, PathBuf::from("."));
        Ok(())
    }

    #[test]
    fn test_cli_overrides_file() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_params(&dir, "params:\n  year: 2019\n");
        let overrides = Overrides {
            year: Some(2021),
            data_dir: Some(dir.path().to_path_buf()),
        };

        let settings = Settings::load(Some(&path), &overrides)?;

        assert_eq!(settings.year(), 2021);
        assert_eq!(settings.data_dir, dir.path());
        Ok(())
    }

    #[test]
    fn test_year_out_of_range_rejected() -> Result<()> {
        let dir = TempDir::new()?;
        let path = write_params(&dir, "params:\n  year: 1850\n");

        let result = Settings::load(Some(&path), &Overrides::default());

        assert!(matches!(result, Err(ProcessingError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_explicit_config_must_exist() {
        let result = Settings::load(
            Some(Path::new("/nonexistent/params.yaml")),
            &Overrides::default(),
        );
        assert!(matches!(result, Err(ProcessingError::Settings(_))));
    }
}
