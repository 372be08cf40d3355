//! Password policy validation library
//!
//! This library validates candidate passwords against a configurable set of
//! strength rules (length bounds, character-class minimums, username and
//! email containment) and reports human-readable violation messages.
//! Validation is a deterministic pass/fail check, not a strength estimator.
//!
//! # Features
//!
//! - `tracing`: Enables logging via tracing crate
//!
//! # Environment Variables
//!
//! - `PWD_POLICY_PRESETS_PATH`: Optional path to a JSON file overriding the
//!   builtin preset table
//!
//! # Example
//!
//! ```rust
//! use pwd_policy::{PasswordPolicy, Preset};
//! use secrecy::SecretString;
//!
//! let mut policy = PasswordPolicy::create(Some(Preset::Normal))?;
//!
//! let password = SecretString::new("Tr0ub4dor&3".to_string().into());
//! if !policy.validate(&password, Some("hunter")) {
//!     for message in policy.errors() {
//!         eprintln!("{message}");
//!     }
//! }
//! # Ok::<(), pwd_policy::PolicyError>(())
//! ```

// Internal modules
mod policy;
mod presets;
mod rules;

// Public API
pub use policy::{PasswordPolicy, PolicyError};
pub use presets::{
    Preset, PresetConfig, PresetError, init_presets, init_presets_from_path, preset_config,
    presets_path,
};
pub use rules::{REGISTRY, RuleDefinition, RuleKind};
