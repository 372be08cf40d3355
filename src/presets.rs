//! Preset management module
//!
//! Handles the builtin strength presets and optional loading of preset
//! overrides from a JSON resource.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use thiserror::Error;

static PRESET_OVERRIDES: RwLock<Option<HashMap<Preset, PresetConfig>>> = RwLock::new(None);

#[derive(Error, Debug)]
pub enum PresetError {
    #[error("Unknown preset '{0}'")]
    Unknown(String),
    #[error("Presets file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("Failed to read presets file: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse presets file: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("Presets file is empty")]
    EmptyFile,
}

/// Named strength levels, ordered weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Preset {
    Simple,
    Normal,
    Fair,
    Medium,
    Strong,
}

impl Preset {
    pub const ALL: [Preset; 5] = [
        Preset::Simple,
        Preset::Normal,
        Preset::Fair,
        Preset::Medium,
        Preset::Strong,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Preset::Simple => "simple",
            Preset::Normal => "normal",
            Preset::Fair => "fair",
            Preset::Medium => "medium",
            Preset::Strong => "strong",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Preset {
    type Err = PresetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "simple" => Ok(Preset::Simple),
            "normal" => Ok(Preset::Normal),
            "fair" => Ok(Preset::Fair),
            "medium" => Ok(Preset::Medium),
            "strong" => Ok(Preset::Strong),
            _ => Err(PresetError::Unknown(s.to_string())),
        }
    }
}

/// The complete set of configuration values applied by one preset.
///
/// Serialized form uses the camelCase field names of the presets file
/// (`minLength`, `minUpper`, ...). `maxLength` may be omitted, meaning
/// unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PresetConfig {
    pub min_length: usize,
    #[serde(default)]
    pub max_length: Option<usize>,
    pub min_lower: usize,
    pub min_upper: usize,
    pub min_numeric: usize,
    pub min_special: usize,
    pub check_username: bool,
    pub check_email: bool,
}

fn builtin(preset: Preset) -> PresetConfig {
    match preset {
        Preset::Simple => PresetConfig {
            min_length: 6,
            max_length: None,
            min_lower: 1,
            min_upper: 0,
            min_numeric: 1,
            min_special: 0,
            check_username: false,
            check_email: false,
        },
        Preset::Normal => PresetConfig {
            min_length: 8,
            max_length: None,
            min_lower: 1,
            min_upper: 1,
            min_numeric: 1,
            min_special: 0,
            check_username: true,
            check_email: true,
        },
        Preset::Fair => PresetConfig {
            min_length: 10,
            max_length: None,
            min_lower: 1,
            min_upper: 1,
            min_numeric: 1,
            min_special: 1,
            check_username: true,
            check_email: true,
        },
        Preset::Medium => PresetConfig {
            min_length: 10,
            max_length: None,
            min_lower: 1,
            min_upper: 1,
            min_numeric: 2,
            min_special: 1,
            check_username: true,
            check_email: true,
        },
        Preset::Strong => PresetConfig {
            min_length: 12,
            max_length: None,
            min_lower: 2,
            min_upper: 2,
            min_numeric: 2,
            min_special: 2,
            check_username: true,
            check_email: true,
        },
    }
}

/// Returns the presets override file path, if one is configured.
///
/// Set `PWD_POLICY_PRESETS_PATH` to point at a JSON presets file. When the
/// variable is unset the builtin table is used as-is.
pub fn presets_path() -> Option<PathBuf> {
    std::env::var("PWD_POLICY_PRESETS_PATH")
        .ok()
        .map(PathBuf::from)
}

/// Loads preset overrides from the file named by `PWD_POLICY_PRESETS_PATH`.
///
/// Returns the number of overridden presets; with the variable unset nothing
/// is loaded and the builtin table stays in effect.
///
/// # Errors
///
/// Returns error if:
/// - File does not exist
/// - File cannot be read or parsed
/// - File is empty
/// - A key names a preset outside the known set
pub fn init_presets() -> Result<usize, PresetError> {
    match presets_path() {
        Some(path) => init_presets_from_path(path),
        None => Ok(0),
    }
}

/// Loads preset overrides from a specific file path.
///
/// The file is a JSON object mapping preset names to configuration values:
///
/// ```json
/// { "simple": { "minLength": 6, "minUpper": 0, "minLower": 1,
///               "minNumeric": 1, "minSpecial": 0,
///               "checkUsername": false, "checkEmail": false } }
/// ```
///
/// Presets absent from the file keep their builtin values. Loading is
/// idempotent: once a table has been loaded, later calls return the loaded
/// count without touching the filesystem.
pub fn init_presets_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<usize, PresetError> {
    {
        let guard = PRESET_OVERRIDES.read().unwrap();
        if let Some(table) = guard.as_ref() {
            return Ok(table.len());
        }
    }

    let path = path.as_ref();

    if !path.exists() {
        #[cfg(feature = "tracing")]
        tracing::error!("Preset initialization FAILED: FileNotFound {}", path.display());
        return Err(PresetError::FileNotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;

    if content.trim().is_empty() {
        #[cfg(feature = "tracing")]
        tracing::error!("Preset initialization FAILED: Empty file {}", path.display());
        return Err(PresetError::EmptyFile);
    }

    let raw: HashMap<String, PresetConfig> = serde_json::from_str(&content)?;
    let mut table = HashMap::with_capacity(raw.len());
    for (name, config) in raw {
        table.insert(name.parse::<Preset>()?, config);
    }

    let count = table.len();
    {
        let mut guard = PRESET_OVERRIDES.write().unwrap();
        *guard = Some(table);
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Presets initialized: {} overrides from {:?}", count, path);

    Ok(count)
}

/// Returns the effective configuration for a preset.
///
/// Overrides loaded via [`init_presets`] take priority; presets absent from
/// the override table fall back to their builtin values. Pure lookup, no
/// side effects.
pub fn preset_config(preset: Preset) -> PresetConfig {
    let guard = PRESET_OVERRIDES.read().unwrap();
    guard
        .as_ref()
        .and_then(|table| table.get(&preset))
        .copied()
        .unwrap_or_else(|| builtin(preset))
}

/// Resets loaded preset overrides for testing purposes.
#[cfg(test)]
pub(crate) fn reset_presets_for_testing() {
    let mut guard = PRESET_OVERRIDES.write().unwrap();
    *guard = None;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    /// Helper to safely set env var in tests
    fn set_env(key: &str, value: &str) {
        // SAFETY: This is only for testing purposes in single-threaded test context
        unsafe { std::env::set_var(key, value); }
    }

    /// Helper to safely remove env var in tests
    fn remove_env(key: &str) {
        // SAFETY: This is only for testing purposes in single-threaded test context
        unsafe { std::env::remove_var(key); }
    }

    fn write_presets_file(json: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        write!(temp_file, "{}", json).expect("Failed to write");
        temp_file
    }

    const SIMPLE_OVERRIDE: &str = r#"{
        "simple": {
            "minLength": 9,
            "minUpper": 1,
            "minLower": 1,
            "minNumeric": 1,
            "minSpecial": 0,
            "checkUsername": false,
            "checkEmail": false
        }
    }"#;

    #[test]
    fn test_builtin_table() {
        let simple = builtin(Preset::Simple);
        assert_eq!(simple.min_length, 6);
        assert_eq!(simple.min_upper, 0);
        assert_eq!(simple.min_lower, 1);
        assert_eq!(simple.min_numeric, 1);
        assert_eq!(simple.min_special, 0);
        assert!(!simple.check_username);
        assert!(!simple.check_email);

        let normal = builtin(Preset::Normal);
        assert_eq!(normal.min_length, 8);
        assert_eq!(normal.min_upper, 1);
        assert_eq!(normal.min_special, 0);
        assert!(normal.check_username);
        assert!(normal.check_email);

        let fair = builtin(Preset::Fair);
        assert_eq!(fair.min_length, 10);
        assert_eq!(fair.min_numeric, 1);
        assert_eq!(fair.min_special, 1);

        let medium = builtin(Preset::Medium);
        assert_eq!(medium.min_length, 10);
        assert_eq!(medium.min_numeric, 2);
        assert_eq!(medium.min_special, 1);

        let strong = builtin(Preset::Strong);
        assert_eq!(strong.min_length, 12);
        assert_eq!(strong.min_upper, 2);
        assert_eq!(strong.min_lower, 2);
        assert_eq!(strong.min_numeric, 2);
        assert_eq!(strong.min_special, 2);

        for preset in Preset::ALL {
            assert_eq!(builtin(preset).max_length, None);
        }
    }

    #[test]
    fn test_preset_from_str() {
        assert_eq!("simple".parse::<Preset>().unwrap(), Preset::Simple);
        assert_eq!("STRONG".parse::<Preset>().unwrap(), Preset::Strong);
        assert_eq!("Medium".parse::<Preset>().unwrap(), Preset::Medium);
    }

    #[test]
    fn test_preset_from_str_unknown() {
        let result = "heroic".parse::<Preset>();
        assert!(matches!(result, Err(PresetError::Unknown(name)) if name == "heroic"));
    }

    #[test]
    fn test_preset_display_round_trip() {
        for preset in Preset::ALL {
            assert_eq!(preset.to_string().parse::<Preset>().unwrap(), preset);
        }
    }

    #[test]
    #[serial]
    fn test_presets_path_default() {
        remove_env("PWD_POLICY_PRESETS_PATH");
        assert_eq!(presets_path(), None);
    }

    #[test]
    #[serial]
    fn test_presets_path_from_env() {
        let custom_path = "/custom/path/presets.json";
        set_env("PWD_POLICY_PRESETS_PATH", custom_path);

        assert_eq!(presets_path(), Some(PathBuf::from(custom_path)));

        remove_env("PWD_POLICY_PRESETS_PATH");
    }

    #[test]
    #[serial]
    fn test_init_presets_without_env_keeps_builtins() {
        reset_presets_for_testing();
        remove_env("PWD_POLICY_PRESETS_PATH");

        assert_eq!(init_presets().unwrap(), 0);
        assert_eq!(preset_config(Preset::Simple), builtin(Preset::Simple));
    }

    #[test]
    #[serial]
    fn test_init_presets_from_path_overrides() {
        reset_presets_for_testing();
        let temp_file = write_presets_file(SIMPLE_OVERRIDE);

        let count = init_presets_from_path(temp_file.path()).unwrap();
        assert_eq!(count, 1);

        let simple = preset_config(Preset::Simple);
        assert_eq!(simple.min_length, 9);
        assert_eq!(simple.min_upper, 1);

        // Presets absent from the file keep their builtin values
        assert_eq!(preset_config(Preset::Strong), builtin(Preset::Strong));

        reset_presets_for_testing();
    }

    #[test]
    #[serial]
    fn test_init_presets_from_env() {
        reset_presets_for_testing();
        let temp_file = write_presets_file(SIMPLE_OVERRIDE);
        let path = temp_file.path().to_str().unwrap();
        set_env("PWD_POLICY_PRESETS_PATH", path);

        let count = init_presets().unwrap();
        assert_eq!(count, 1);
        assert_eq!(preset_config(Preset::Simple).min_length, 9);

        remove_env("PWD_POLICY_PRESETS_PATH");
        reset_presets_for_testing();
    }

    #[test]
    #[serial]
    fn test_init_presets_is_idempotent() {
        reset_presets_for_testing();
        let temp_file = write_presets_file(SIMPLE_OVERRIDE);

        assert_eq!(init_presets_from_path(temp_file.path()).unwrap(), 1);
        // Second call must not reread the file
        assert_eq!(init_presets_from_path("/nonexistent/presets.json").unwrap(), 1);

        reset_presets_for_testing();
    }

    #[test]
    #[serial]
    fn test_init_presets_file_not_found() {
        reset_presets_for_testing();

        let result = init_presets_from_path("/nonexistent/path/presets.json");
        assert!(matches!(result, Err(PresetError::FileNotFound(_))));
    }

    #[test]
    #[serial]
    fn test_init_presets_empty_file() {
        reset_presets_for_testing();
        let temp_file = write_presets_file("");

        let result = init_presets_from_path(temp_file.path());
        assert!(matches!(result, Err(PresetError::EmptyFile)));
    }

    #[test]
    #[serial]
    fn test_init_presets_parse_error() {
        reset_presets_for_testing();
        let temp_file = write_presets_file("{ not json");

        let result = init_presets_from_path(temp_file.path());
        assert!(matches!(result, Err(PresetError::ParseError(_))));
    }

    #[test]
    #[serial]
    fn test_init_presets_unknown_preset_key() {
        reset_presets_for_testing();
        let temp_file = write_presets_file(
            r#"{ "heroic": { "minLength": 4, "minUpper": 0, "minLower": 0,
                 "minNumeric": 0, "minSpecial": 0,
                 "checkUsername": false, "checkEmail": false } }"#,
        );

        let result = init_presets_from_path(temp_file.path());
        assert!(matches!(result, Err(PresetError::Unknown(name)) if name == "heroic"));

        reset_presets_for_testing();
    }

    #[test]
    #[serial]
    fn test_init_presets_serialized_round_trip() {
        reset_presets_for_testing();

        let table: HashMap<&str, PresetConfig> = Preset::ALL
            .iter()
            .map(|&preset| (preset.as_str(), builtin(preset)))
            .collect();
        let json = serde_json::to_string(&table).expect("Failed to serialize");
        let temp_file = write_presets_file(&json);

        assert_eq!(init_presets_from_path(temp_file.path()).unwrap(), 5);
        for preset in Preset::ALL {
            assert_eq!(preset_config(preset), builtin(preset));
        }

        reset_presets_for_testing();
    }
}
