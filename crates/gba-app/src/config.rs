use anyhow::Context;
use gba_core::Config;
use log::info;
use std::fs;
use std::path::Path;

/// Reads a TOML config. A missing file yields the defaults.
pub fn load_config(path: &Path) -> anyhow::Result<Config> {
    if !path.exists() {
        info!("No config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: Config =
        toml::from_str(&text).with_context(|| format!("Invalid config {}", path.display()))?;

    info!("Loaded config from {}", path.display());
    Ok(config)
}

pub fn save_config(path: &Path, config: &Config) -> anyhow::Result<()> {
    let text = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, text).with_context(|| format!("Failed to write config {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gba_core::config::{Interpolation, MixerPrecision};
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[audio]\ninterpolation = \"sinc-64\"\nvolume = 40").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.audio.interpolation, Interpolation::Sinc64);
        assert_eq!(config.audio.volume, 40);
        assert_eq!(config.audio.sample_rate, 48_000);
        assert_eq!(config.audio.mixer_precision, MixerPrecision::FixedPoint);
    }

    #[test]
    fn unknown_interpolation_is_an_error_naming_the_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[audio]\ninterpolation = \"linear\"").unwrap();

        let err = load_config(file.path()).unwrap_err();
        assert!(format!("{err}").contains("Invalid config"));
    }

    #[test]
    fn saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gba.toml");

        let mut config = Config::default();
        config.audio.interpolation = Interpolation::Sinc256;
        config.audio.mixer_precision = MixerPrecision::Float;
        config.audio.pace_to_wall_clock = true;
        save_config(&path, &config).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.contains("interpolation = \"sinc-256\""));
        assert!(text.contains("mixer_precision = \"float\""));
        assert_eq!(load_config(&path).unwrap(), config);
    }
}
