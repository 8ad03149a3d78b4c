use regex::Regex;

lazy_static::lazy_static! {
    // Unquoted PostgreSQL identifier, as accepted by `SET LOCAL ROLE`.
    static ref ROLE_REGEX: Regex = Regex::new(r"^[a-z_][a-z0-9_]{0,62}$").unwrap();
}

/// Escapes HTML-significant characters so stored text can never be rendered
/// as markup by a client.
pub fn neutralize_markup(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Whether `role` can be interpolated into a `SET LOCAL ROLE` statement.
pub fn is_valid_role(role: &str) -> bool {
    ROLE_REGEX.is_match(role)
}
