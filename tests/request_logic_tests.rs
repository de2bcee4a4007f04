/// Tests for request parsing and pagination logic
///
/// Note: These are unit tests that verify the logic is correct.
/// Integration tests live alongside the router and the managers.

#[cfg(test)]
mod tests {
    #[test]
    fn test_authorization_header_parsing() {
        let auth_header = "Bearer abc123token";
        let token = auth_header.strip_prefix("Bearer ");
        assert_eq!(token, Some("abc123token"));

        let invalid_header = "abc123token";
        let token = invalid_header.strip_prefix("Bearer ");
        assert_eq!(token, None);

        // Scheme is case sensitive
        let lowercase_scheme = "bearer abc123token";
        assert_eq!(lowercase_scheme.strip_prefix("Bearer "), None);
    }

    #[test]
    fn test_username_normalization_steps() {
        // trim, strip one leading @, strip trailing slashes, lowercase
        let raw = " @John-Doe// ";
        let name = raw.trim();
        let name = name.strip_prefix('@').unwrap_or(name);
        let name = name.trim_end_matches('/').trim().to_lowercase();
        assert_eq!(name, "john-doe");

        // Only a single leading @ is stripped
        let raw = "@@double";
        let name = raw.strip_prefix('@').unwrap_or(raw);
        assert_eq!(name, "@double");
    }

    #[test]
    fn test_username_charset() {
        let valid = "john-doe-42";
        assert!(valid
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));

        for invalid in ["john_doe", "john doe", "John", "jöhn"] {
            assert!(
                !invalid
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'),
                "accepted {:?}",
                invalid
            );
        }
    }

    #[test]
    fn test_total_pages_has_floor_of_one() {
        let total_pages = |total: i64, limit: i64| ((total + limit - 1) / limit).max(1);

        // An empty result set still reports one page
        assert_eq!(total_pages(0, 10), 1);
        assert_eq!(total_pages(1, 10), 1);
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(5, 2), 3);
    }

    #[test]
    fn test_page_coercion_falls_back_to_default() {
        let coerce = |raw: Option<&str>, default: i64| {
            raw.and_then(|s| s.trim().parse::<i64>().ok())
                .filter(|v| *v > 0)
                .unwrap_or(default)
        };

        assert_eq!(coerce(Some("2"), 1), 2);
        assert_eq!(coerce(Some("abc"), 1), 1);
        assert_eq!(coerce(Some("0"), 1), 1);
        assert_eq!(coerce(Some("-5"), 10), 10);
        assert_eq!(coerce(None, 10), 10);
    }
}
