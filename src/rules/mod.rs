//! Password rule registry
//!
//! Each rule pairs a violation message template with an evaluation mode.
//! The registry order is fixed and determines the order messages appear in
//! a validation result.

mod classes;
mod identity;

pub(crate) use classes::{count_matching, is_special};
pub(crate) use identity::{contains_username, is_email_address};

/// The closed set of password rules, in registry order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuleKind {
    MinLength,
    MaxLength,
    CheckUsername,
    CheckEmail,
    MinLower,
    MinUpper,
    MinNumeric,
    MinSpecial,
}

/// A rule paired with its violation message template.
///
/// Templates use `{n}` (the configured threshold), `{found}` (the measured
/// count) and `{plural}` (empty when the threshold is 1, otherwise `s`).
/// Boolean-presence rules carry no placeholders.
#[derive(Debug, Clone, Copy)]
pub struct RuleDefinition {
    pub kind: RuleKind,
    pub template: &'static str,
}

/// All rules, evaluated in this order.
pub const REGISTRY: [RuleDefinition; 8] = [
    RuleDefinition {
        kind: RuleKind::MinLength,
        template: "Password should contain at least {n} character{plural} ({found} found)!",
    },
    RuleDefinition {
        kind: RuleKind::MaxLength,
        template: "Password should contain at most {n} character{plural} ({found} found)!",
    },
    RuleDefinition {
        kind: RuleKind::CheckUsername,
        template: "Password cannot contain the username",
    },
    RuleDefinition {
        kind: RuleKind::CheckEmail,
        template: "Password cannot contain an email address",
    },
    RuleDefinition {
        kind: RuleKind::MinLower,
        template: "Password should contain at least {n} lower case character{plural} ({found} found)!",
    },
    RuleDefinition {
        kind: RuleKind::MinUpper,
        template: "Password should contain at least {n} upper case character{plural} ({found} found)!",
    },
    RuleDefinition {
        kind: RuleKind::MinNumeric,
        template: "Password should contain at least {n} numeric character{plural} ({found} found)!",
    },
    RuleDefinition {
        kind: RuleKind::MinSpecial,
        template: "Password should contain at least {n} special character{plural} ({found} found)!",
    },
];

/// Substitutes named `{placeholder}` values into a message template.
pub(crate) fn render(template: &str, params: &[(&str, String)]) -> String {
    let mut message = template.to_string();
    for (name, value) in params {
        message = message.replace(&format!("{{{name}}}"), value);
    }
    message
}

/// Parameter set for threshold-mode messages.
pub(crate) fn threshold_params(n: usize, found: usize) -> Vec<(&'static str, String)> {
    vec![
        ("n", n.to_string()),
        ("found", found.to_string()),
        ("plural", if n == 1 { String::new() } else { "s".to_string() }),
    ]
}
