//! Email address validation.
//!
//! A single pattern accepts `local@domain.tld` and `local@[a.b.c.d]` forms.
//! Quoted local parts (`"john doe"@example.com`) are allowed. Matching is
//! case-sensitive and internationalized domain names are not supported.

use std::sync::LazyLock;

use regex::Regex;

static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
    )
    .expect("address regex is valid")
});

/// Returns `true` if `address` is a well-formed email address.
///
/// # Examples
///
/// ```
/// use courier_core::address::is_valid_address;
///
/// assert!(is_valid_address("user@example.com"));
/// assert!(is_valid_address("user@[10.0.0.1]"));
/// assert!(!is_valid_address("not-an-email"));
/// ```
pub fn is_valid_address(address: &str) -> bool {
    ADDRESS_RE.is_match(address)
}

/// Return every address in `addresses` that is not well-formed, in order.
pub fn invalid_addresses(addresses: &[String]) -> Vec<String> {
    addresses
        .iter()
        .filter(|address| !is_valid_address(address))
        .cloned()
        .collect()
}
