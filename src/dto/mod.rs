pub mod admin;
pub mod auth;
pub mod cart;
pub mod coupons;
pub mod orders;
pub mod products;
pub mod profile;
pub mod tracking;

/// Trimmed value, or `None` when absent or blank.
pub(crate) fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::non_blank;

    #[test]
    fn blank_strings_become_none() {
        assert_eq!(non_blank(Some("  ".into())), None);
        assert_eq!(non_blank(Some(" a ".into())).as_deref(), Some("a"));
        assert_eq!(non_blank(None), None);
    }
}
