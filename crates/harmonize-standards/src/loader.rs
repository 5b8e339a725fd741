#![deny(unsafe_code)]

//! Config source resolution and loading.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::debug;

use crate::config::HarmonizerConfig;
use crate::error::ConfigError;

/// Environment variable naming a config file to use instead of an embedded profile.
pub const CONFIG_ENV_VAR: &str = "HARMONIZE_CONFIG";

const SALES_PROFILE: &str = include_str!("../profiles/sales.toml");
const AUTOMOTIVE_PROFILE: &str = include_str!("../profiles/automotive.toml");

/// Profiles compiled into the binary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Profile {
    #[default]
    Sales,
    Automotive,
}

impl Profile {
    pub const ALL: [Profile; 2] = [Profile::Sales, Profile::Automotive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Profile::Sales => "sales",
            Profile::Automotive => "automotive",
        }
    }

    /// Raw TOML text of the embedded profile.
    pub fn source_text(&self) -> &'static str {
        match self {
            Profile::Sales => SALES_PROFILE,
            Profile::Automotive => AUTOMOTIVE_PROFILE,
        }
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Profile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        Profile::ALL
            .into_iter()
            .find(|p| p.as_str() == name)
            .ok_or_else(|| ConfigError::UnknownProfile {
                name: s.to_string(),
                known: Profile::ALL
                    .iter()
                    .map(Profile::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

/// Where a config comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    Profile(Profile),
}

impl ConfigSource {
    /// Resolution order: explicit path, then `HARMONIZE_CONFIG`, then the
    /// named profile, then the default profile.
    pub fn resolve(explicit: Option<&Path>, profile: Option<Profile>) -> Self {
        let from_env = std::env::var_os(CONFIG_ENV_VAR)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        Self::resolve_with(explicit, from_env, profile)
    }

    fn resolve_with(
        explicit: Option<&Path>,
        from_env: Option<PathBuf>,
        profile: Option<Profile>,
    ) -> Self {
        if let Some(path) = explicit {
            return ConfigSource::File(path.to_path_buf());
        }
        if let Some(path) = from_env {
            return ConfigSource::File(path);
        }
        ConfigSource::Profile(profile.unwrap_or_default())
    }

    pub fn load(&self) -> Result<HarmonizerConfig, ConfigError> {
        match self {
            ConfigSource::File(path) => load_config_file(path),
            ConfigSource::Profile(profile) => load_profile(*profile),
        }
    }
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Profile(profile) => write!(f, "profile:{profile}"),
        }
    }
}

pub fn load_profile(profile: Profile) -> Result<HarmonizerConfig, ConfigError> {
    parse_config(profile.source_text(), &format!("profile:{profile}"))
}

pub fn load_config_file(path: &Path) -> Result<HarmonizerConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
    parse_config(&text, &path.display().to_string())
}

/// Parses and validates a TOML config; `origin` names it in errors.
pub fn parse_config(text: &str, origin: &str) -> Result<HarmonizerConfig, ConfigError> {
    let config: HarmonizerConfig = toml::from_str(text).map_err(|source| ConfigError::Toml {
        origin: origin.to_string(),
        source,
    })?;
    config.validate()?;
    debug!(
        origin,
        name = %config.name,
        fields = config.fields.len(),
        glossary = config.glossary.len(),
        "loaded harmonizer config"
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_path_wins_over_env_and_profile() {
        let source = ConfigSource::resolve_with(
            Some(Path::new("mine.toml")),
            Some(PathBuf::from("env.toml")),
            Some(Profile::Automotive),
        );
        assert_eq!(source, ConfigSource::File(PathBuf::from("mine.toml")));
    }

    #[test]
    fn env_wins_over_profile() {
        let source = ConfigSource::resolve_with(
            None,
            Some(PathBuf::from("env.toml")),
            Some(Profile::Automotive),
        );
        assert_eq!(source, ConfigSource::File(PathBuf::from("env.toml")));
    }

    #[test]
    fn falls_back_to_sales_profile() {
        let source = ConfigSource::resolve_with(None, None, None);
        assert_eq!(source, ConfigSource::Profile(Profile::Sales));
        assert_eq!(source.to_string(), "profile:sales");
    }

    #[test]
    fn unknown_profile_lists_known_names() {
        let err = "retail".parse::<Profile>().expect_err("unknown profile");
        assert_eq!(
            err.to_string(),
            "unknown profile: retail (expected one of: sales, automotive)"
        );
    }
}
