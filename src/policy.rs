//! Password policy - configuration and rule evaluation.

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use crate::presets::{Preset, PresetError, preset_config};
use crate::rules::{self, RuleKind};

/// Errors raised while configuring a [`PasswordPolicy`].
///
/// Configuration errors are immediate and non-retryable; validation failures
/// are reported through [`PasswordPolicy::validate`] and
/// [`PasswordPolicy::errors`] instead.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("{field} must be at least {min} (got {value})")]
    InvalidArgument {
        field: &'static str,
        min: usize,
        value: usize,
    },
    #[error(
        "Total number of required characters {required} is greater than maximum allowed {max}. Validation is impossible!"
    )]
    InvalidConfiguration { required: usize, max: usize },
    #[error(transparent)]
    Preset(#[from] PresetError),
}

/// Validates passwords against a configurable set of strength rules.
///
/// Each instance owns its configuration and the violation messages of the
/// most recent [`validate`](PasswordPolicy::validate) call. Instances are
/// independent; share one across threads only with external synchronization.
#[derive(Debug, Clone)]
pub struct PasswordPolicy {
    min_length: usize,
    max_length: Option<usize>,
    min_lower: usize,
    min_upper: usize,
    min_numeric: usize,
    min_special: usize,
    check_username: bool,
    check_email: bool,
    preset: Option<Preset>,
    errors: Vec<String>,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 4,
            max_length: None,
            min_lower: 2,
            min_upper: 2,
            min_numeric: 2,
            min_special: 2,
            check_username: true,
            check_email: true,
            preset: None,
            errors: Vec::new(),
        }
    }
}

impl PasswordPolicy {
    /// Creates a policy with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a policy, optionally applying a preset.
    pub fn create(preset: Option<Preset>) -> Result<Self, PolicyError> {
        let mut policy = Self::new();
        if let Some(preset) = preset {
            policy.set_preset(preset)?;
        }
        Ok(policy)
    }

    /// Applies a preset, overriding all configuration fields.
    ///
    /// Builtin presets leave the maximum length unbounded; a preset loaded
    /// from a custom source that cannot be satisfied is rejected without
    /// changing the current configuration.
    pub fn set_preset(&mut self, preset: Preset) -> Result<(), PolicyError> {
        let config = preset_config(preset);
        check_thresholds(
            config.max_length,
            config.min_lower + config.min_upper + config.min_numeric + config.min_special,
        )?;

        self.min_length = config.min_length;
        self.max_length = config.max_length;
        self.min_lower = config.min_lower;
        self.min_upper = config.min_upper;
        self.min_numeric = config.min_numeric;
        self.min_special = config.min_special;
        self.check_username = config.check_username;
        self.check_email = config.check_email;
        self.preset = Some(preset);
        Ok(())
    }

    /// Applies a preset by name, for callers holding a string.
    pub fn set_preset_by_name(&mut self, name: &str) -> Result<(), PolicyError> {
        self.set_preset(name.parse::<Preset>()?)
    }

    /// The last applied preset, if any.
    pub fn preset(&self) -> Option<Preset> {
        self.preset
    }

    pub fn min_length(&self) -> usize {
        self.min_length
    }

    pub fn set_min_length(&mut self, min_length: usize) {
        self.min_length = min_length;
    }

    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Sets the maximum length, `None` meaning unbounded.
    ///
    /// A configured maximum must be at least 1 and leave room for the
    /// combined character-class minimums; otherwise the change is rejected
    /// and the previous value stays in place.
    pub fn set_max_length(&mut self, max_length: Option<usize>) -> Result<(), PolicyError> {
        if let Some(max) = max_length {
            if max < 1 {
                return Err(PolicyError::InvalidArgument {
                    field: "maxLength",
                    min: 1,
                    value: max,
                });
            }
        }
        check_thresholds(max_length, self.required_chars())?;
        self.max_length = max_length;
        Ok(())
    }

    pub fn min_lower(&self) -> usize {
        self.min_lower
    }

    pub fn set_min_lower(&mut self, min_lower: usize) -> Result<(), PolicyError> {
        check_thresholds(
            self.max_length,
            self.required_chars() - self.min_lower + min_lower,
        )?;
        self.min_lower = min_lower;
        Ok(())
    }

    pub fn min_upper(&self) -> usize {
        self.min_upper
    }

    pub fn set_min_upper(&mut self, min_upper: usize) -> Result<(), PolicyError> {
        check_thresholds(
            self.max_length,
            self.required_chars() - self.min_upper + min_upper,
        )?;
        self.min_upper = min_upper;
        Ok(())
    }

    pub fn min_numeric(&self) -> usize {
        self.min_numeric
    }

    pub fn set_min_numeric(&mut self, min_numeric: usize) -> Result<(), PolicyError> {
        check_thresholds(
            self.max_length,
            self.required_chars() - self.min_numeric + min_numeric,
        )?;
        self.min_numeric = min_numeric;
        Ok(())
    }

    pub fn min_special(&self) -> usize {
        self.min_special
    }

    pub fn set_min_special(&mut self, min_special: usize) -> Result<(), PolicyError> {
        check_thresholds(
            self.max_length,
            self.required_chars() - self.min_special + min_special,
        )?;
        self.min_special = min_special;
        Ok(())
    }

    pub fn check_username(&self) -> bool {
        self.check_username
    }

    pub fn set_check_username(&mut self, check_username: bool) {
        self.check_username = check_username;
    }

    pub fn check_email(&self) -> bool {
        self.check_email
    }

    pub fn set_check_email(&mut self, check_email: bool) {
        self.check_email = check_email;
    }

    /// Evaluates the password against every active rule, in registry order.
    ///
    /// Returns `true` when all active rules pass. Violation messages are
    /// retained and retrievable via [`errors`](PasswordPolicy::errors) until
    /// the next call. An empty username is treated as absent.
    pub fn validate(&mut self, password: &SecretString, username: Option<&str>) -> bool {
        self.errors.clear();

        let pwd = password.expose_secret();
        let length = pwd.chars().count();
        let username = username.filter(|u| !u.is_empty());

        for rule in &rules::REGISTRY {
            let failure = match rule.kind {
                RuleKind::MinLength => (length < self.min_length)
                    .then(|| rules::threshold_params(self.min_length, length)),
                RuleKind::MaxLength => self
                    .max_length
                    .filter(|&max| length > max)
                    .map(|max| rules::threshold_params(max, length)),
                RuleKind::CheckUsername => {
                    let found = self.check_username
                        && username.is_some_and(|u| rules::contains_username(pwd, u));
                    found.then(Vec::new)
                }
                RuleKind::CheckEmail => {
                    (self.check_email && rules::is_email_address(pwd)).then(Vec::new)
                }
                RuleKind::MinLower => class_failure(pwd, self.min_lower, |c: char| c.is_lowercase()),
                RuleKind::MinUpper => class_failure(pwd, self.min_upper, |c: char| c.is_uppercase()),
                RuleKind::MinNumeric => {
                    class_failure(pwd, self.min_numeric, |c: char| c.is_ascii_digit())
                }
                RuleKind::MinSpecial => class_failure(pwd, self.min_special, rules::is_special),
            };

            if let Some(params) = failure {
                self.errors.push(rules::render(rule.template, &params));
            }
        }

        self.errors.is_empty()
    }

    /// Violation messages from the most recent `validate` call, in registry
    /// order. Empty before any call.
    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    fn required_chars(&self) -> usize {
        self.min_lower + self.min_upper + self.min_numeric + self.min_special
    }
}

/// A configured maximum must leave room for the combined class minimums;
/// otherwise no password could ever validate.
fn check_thresholds(max_length: Option<usize>, required: usize) -> Result<(), PolicyError> {
    if let Some(max) = max_length {
        if required > max {
            return Err(PolicyError::InvalidConfiguration { required, max });
        }
    }
    Ok(())
}

fn class_failure<F>(
    password: &str,
    min: usize,
    predicate: F,
) -> Option<Vec<(&'static str, String)>>
where
    F: Fn(char) -> bool,
{
    let found = rules::count_matching(password, predicate);
    (found < min).then(|| rules::threshold_params(min, found))
}
