//! Filename parsing for the `N.name.ext` convention.
//!
//! Content files are ordered by a numeric prefix terminated by the first dot:
//! - `1.intro.txt` → order 1
//! - `010.appendix.md` → order 10
//! - `intro.txt` → no order
//! - `12-intro.txt` → no order (the prefix must end in a dot)
//! - `99999999999.big.txt` → no order (does not fit a `u32`)
//!
//! Each content file renders to an HTML file of the same name with the
//! extension swapped: `1.intro.txt` → `1.intro.html`.

use std::path::Path;

/// Leading digits of `name`, when immediately followed by a dot.
fn digit_prefix(name: &str) -> Option<&str> {
    let digits = name.len() - name.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 || !name[digits..].starts_with('.') {
        return None;
    }
    Some(&name[..digits])
}

/// Order number of `name`, if it carries a usable `N.` prefix.
pub fn parse_order_prefix(name: &str) -> Option<u32> {
    digit_prefix(name)?.parse().ok()
}

/// Why `name` has no order number. Only meaningful when
/// [`parse_order_prefix`] returned `None`.
pub fn unordered_reason(name: &str) -> &'static str {
    match digit_prefix(name) {
        Some(_) => "order prefix is too large",
        None => "no numeric prefix",
    }
}

/// Swap the last extension for `.html`, or append it when there is none.
pub fn output_file_name(file_name: &str) -> String {
    Path::new(file_name)
        .with_extension("html")
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_text_file() {
        assert_eq!(parse_order_prefix("1.intro.txt"), Some(1));
        assert_eq!(output_file_name("1.intro.txt"), "1.intro.html");
    }

    #[test]
    fn leading_zeros() {
        assert_eq!(parse_order_prefix("010.appendix.md"), Some(10));
        assert_eq!(parse_order_prefix("000.first.md"), Some(0));
    }

    #[test]
    fn number_only_stem() {
        assert_eq!(parse_order_prefix("7.md"), Some(7));
        assert_eq!(output_file_name("7.md"), "7.html");
    }

    #[test]
    fn unnumbered() {
        assert_eq!(parse_order_prefix("intro.txt"), None);
        assert_eq!(parse_order_prefix(".hidden.txt"), None);
        assert_eq!(unordered_reason("intro.txt"), "no numeric prefix");
    }

    #[test]
    fn dash_prefix_is_not_an_order() {
        assert_eq!(parse_order_prefix("12-intro.txt"), None);
        assert_eq!(unordered_reason("12-intro.txt"), "no numeric prefix");
    }

    #[test]
    fn digits_without_dot() {
        assert_eq!(parse_order_prefix("12"), None);
        assert_eq!(parse_order_prefix("12intro.txt"), None);
    }

    #[test]
    fn oversized_prefix_is_unnumbered_with_reason() {
        assert_eq!(parse_order_prefix("99999999999.big.txt"), None);
        assert_eq!(unordered_reason("99999999999.big.txt"), "order prefix is too large");
        assert_eq!(parse_order_prefix("4294967295.max.txt"), Some(u32::MAX));
    }

    #[test]
    fn output_name_replaces_last_extension_only() {
        assert_eq!(output_file_name("2.body.part.md"), "2.body.part.html");
        assert_eq!(output_file_name("notes"), "notes.html");
    }
}
