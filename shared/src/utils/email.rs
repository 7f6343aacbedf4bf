//! Email address helpers

use once_cell::sync::Lazy;
use regex::Regex;

/// `local@domain.tld`: one `@`, non-empty local part, a domain with at least one dot
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@([^@\s]+\.[^@\s]+)$").expect("email regex is valid")
});

/// Trim and lower-case an address as typed by a user
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Extract the lower-cased domain of an address, if it is well formed
pub fn email_domain(email: &str) -> Option<String> {
    let normalized = normalize_email(email);
    EMAIL_REGEX
        .captures(&normalized)
        .and_then(|captures| captures.get(1))
        .map(|domain| domain.as_str().to_string())
}

/// Whether the address belongs to one of `allowed_domains` (case-insensitive)
pub fn is_allowed_email(email: &str, allowed_domains: &[String]) -> bool {
    match email_domain(email) {
        Some(domain) => allowed_domains
            .iter()
            .any(|allowed| allowed.trim().eq_ignore_ascii_case(&domain)),
        None => false,
    }
}

/// Mask an address for logs: `alice@example.com` becomes `a***@example.com`
pub fn mask_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        None => "***".to_string(),
    }
}
