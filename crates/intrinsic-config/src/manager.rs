//! Preset manager.
//!
//! Holds named [`ValuationAssumptions`] presets in memory and reads or writes
//! assumption files.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use crate::assumptions::ValuationAssumptions;
use crate::error::{ConfigError, ConfigResult, Validate};

// =============================================================================
// FILE FORMAT
// =============================================================================

/// On-disk format of an assumptions file, chosen by extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileFormat {
    /// `.json`
    Json,
    /// `.toml`
    Toml,
    /// `.yaml` or `.yml`
    Yaml,
}

impl FileFormat {
    /// Returns the canonical extension for this format.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Toml => "toml",
            Self::Yaml => "yaml",
        }
    }

    /// Detects the format from a path's extension (case-insensitive).
    pub fn from_path(path: &Path) -> ConfigResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            Some("yaml" | "yml") => Ok(Self::Yaml),
            _ => Err(ConfigError::UnsupportedFormat {
                path: path.to_path_buf(),
            }),
        }
    }

    /// Parses assumptions from text in this format.
    pub fn parse(&self, text: &str) -> ConfigResult<ValuationAssumptions> {
        Ok(match self {
            Self::Json => serde_json::from_str(text)?,
            Self::Toml => toml::from_str(text)?,
            Self::Yaml => serde_yaml::from_str(text)?,
        })
    }

    /// Renders assumptions as text in this format.
    pub fn render(&self, assumptions: &ValuationAssumptions) -> ConfigResult<String> {
        Ok(match self {
            Self::Json => serde_json::to_string_pretty(assumptions)?,
            Self::Toml => toml::to_string_pretty(assumptions)?,
            Self::Yaml => serde_yaml::to_string(assumptions)
                .map_err(|e| ConfigError::Serialization(e.to_string()))?,
        })
    }
}

/// Reads and validates an assumptions file.
///
/// The file's name field is kept as written; files without one are named `CUSTOM`.
pub fn load_assumptions(path: impl AsRef<Path>) -> ConfigResult<ValuationAssumptions> {
    let path = path.as_ref();
    let format = FileFormat::from_path(path)?;
    let text = fs::read_to_string(path).map_err(|e| io_error(path, &e))?;
    let mut assumptions = format.parse(&text)?;
    assumptions.read_only = false;
    assumptions.validate_or_error()?;
    log::debug!(
        "loaded assumptions '{}' from {}",
        assumptions.name,
        path.display()
    );
    Ok(assumptions)
}

/// Writes assumptions to a file, in the format named by its extension.
pub fn save_assumptions(
    path: impl AsRef<Path>,
    assumptions: &ValuationAssumptions,
) -> ConfigResult<()> {
    let path = path.as_ref();
    let text = FileFormat::from_path(path)?.render(assumptions)?;
    fs::write(path, text).map_err(|e| io_error(path, &e))
}

fn io_error(path: &Path, err: &std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: PathBuf::from(path),
        message: err.to_string(),
    }
}

// =============================================================================
// CONFIGURATION MANAGER
// =============================================================================

/// Name of the preset used when none is requested.
pub const DEFAULT_PRESET: &str = "DEFAULT";

/// Central preset store.
///
/// Built-in presets (`DEFAULT`, `CONSERVATIVE`, `AGGRESSIVE`) are read-only.
/// Custom presets can be registered, replaced, and deleted.
///
/// # Example
///
/// ```rust
/// use intrinsic_config::{ConfigManager, ValuationAssumptions};
///
/// let manager = ConfigManager::new();
/// let conservative = manager.get("CONSERVATIVE").unwrap();
/// assert_eq!(conservative.default_growth_pct, 3.0);
///
/// let custom = ValuationAssumptions::new("MY.CASE").with_horizon(8);
/// manager.register(custom).unwrap();
/// assert_eq!(manager.get("MY.CASE").unwrap().horizon_years, 8);
/// ```
pub struct ConfigManager {
    presets: RwLock<HashMap<String, ValuationAssumptions>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    /// Creates a manager holding the built-in presets.
    pub fn new() -> Self {
        let manager = Self {
            presets: RwLock::new(HashMap::new()),
        };
        manager.load_standard_presets();
        manager
    }

    fn load_standard_presets(&self) {
        for preset in [
            ValuationAssumptions::standard(),
            ValuationAssumptions::conservative(),
            ValuationAssumptions::aggressive(),
        ] {
            if let Err(e) = self.insert(preset) {
                log::warn!("failed to load standard preset: {}", e);
            }
        }
    }

    /// Registers a preset, replacing any writable preset of the same name.
    pub fn register(&self, assumptions: ValuationAssumptions) -> ConfigResult<()> {
        let assumptions = ValuationAssumptions {
            read_only: false,
            ..assumptions
        };
        self.insert(assumptions)
    }

    fn insert(&self, assumptions: ValuationAssumptions) -> ConfigResult<()> {
        assumptions.validate_or_error()?;

        let mut presets = self
            .presets
            .write()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        if let Some(existing) = presets.get(&assumptions.name) {
            if existing.read_only {
                return Err(ConfigError::ReadOnly {
                    key: assumptions.name.clone(),
                });
            }
        }

        presets.insert(assumptions.name.clone(), assumptions);
        Ok(())
    }

    /// Gets a preset by name.
    pub fn get(&self, name: &str) -> ConfigResult<ValuationAssumptions> {
        let presets = self
            .presets
            .read()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        presets.get(name).cloned().ok_or_else(|| ConfigError::NotFound {
            key: name.to_string(),
        })
    }

    /// Gets the `DEFAULT` preset.
    pub fn default_assumptions(&self) -> ConfigResult<ValuationAssumptions> {
        self.get(DEFAULT_PRESET)
    }

    /// Lists preset names, sorted.
    pub fn list(&self) -> ConfigResult<Vec<String>> {
        let presets = self
            .presets
            .read()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        let mut names: Vec<String> = presets.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Deletes a custom preset. Returns whether it existed.
    pub fn delete(&self, name: &str) -> ConfigResult<bool> {
        let mut presets = self
            .presets
            .write()
            .map_err(|e| ConfigError::Conflict(format!("Lock error: {}", e)))?;

        if let Some(preset) = presets.get(name) {
            if preset.read_only {
                return Err(ConfigError::ReadOnly {
                    key: name.to_string(),
                });
            }
        }

        Ok(presets.remove(name).is_some())
    }

    /// Loads an assumptions file and registers it under its own name.
    pub fn load_file(&self, path: impl AsRef<Path>) -> ConfigResult<ValuationAssumptions> {
        let assumptions = load_assumptions(path)?;
        self.register(assumptions.clone())?;
        Ok(assumptions)
    }
}
