/// Canonical form of an email address used as the uniqueness key.
///
/// Surrounding whitespace is stripped and the whole address is lowercased,
/// so `" Jane@Example.COM "` and `"jane@example.com"` identify the same user.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" A@B.com "), "a@b.com");
        assert_eq!(normalize_email("X@Y.com "), "x@y.com");
        assert_eq!(normalize_email("already@lower.case"), "already@lower.case");
        assert_eq!(normalize_email("\tTab@Example.org\n"), "tab@example.org");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_email("  MiXeD@Example.Com");
        assert_eq!(normalize_email(&once), once);
    }
}
