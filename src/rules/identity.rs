//! Username and email presence checks.

use std::sync::LazyLock;

use regex::Regex;

// local-part@domain or local-part@IPv4 with an optional port. The match is
// anchored: the password as a whole has to read as an address.
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([\w!#$%&'*+\-/=?^`{|}~]+\.)*[\w!#$%&'*+\-/=?^`{|}~]+@(((([a-z0-9][a-z0-9-]{0,62}[a-z0-9]|[a-z])\.)+[a-z]{2,6})|(\d{1,3}\.){3}\d{1,3}(:\d{1,5})?)$",
    )
    .expect("email pattern is valid")
});

/// Returns whether the candidate reads as an email address, case-insensitive.
pub(crate) fn is_email_address(candidate: &str) -> bool {
    EMAIL_PATTERN.is_match(candidate)
}

/// Case-insensitive containment check of the username in the password.
pub(crate) fn contains_username(password: &str, username: &str) -> bool {
    password.to_lowercase().contains(&username.to_lowercase())
}
