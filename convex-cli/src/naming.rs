//! Canonical command and flag names.

/// Convert an identifier to lowercase hyphen-separated form.
///
/// A hyphen is inserted before an uppercase letter when the previous
/// character is lowercase, or when the previous character is uppercase and
/// the next one is lowercase. A run of capitals therefore stays one word and
/// only its last letter starts the following word:
///
/// | input             | output              |
/// |-------------------|---------------------|
/// | `getAll`          | `get-all`           |
/// | `HTTPRequest`     | `http-request`      |
/// | `getHTTPResponse` | `get-http-response` |
/// | `getValue2`       | `get-value2`        |
/// | `myVar_name`      | `my-var_name`       |
///
/// Digits and underscores are copied through and never start a word.
/// Already-converted names are returned unchanged.
pub fn kebab_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                out.push('-');
            }
        }
        out.extend(c.to_lowercase());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_camel_case() {
        assert_eq!(kebab_case("getAll"), "get-all");
        assert_eq!(kebab_case("create"), "create");
        assert_eq!(kebab_case("listAllTodoItems"), "list-all-todo-items");
    }

    #[test]
    fn test_acronyms() {
        assert_eq!(kebab_case("HTTPRequest"), "http-request");
        assert_eq!(kebab_case("getHTTPResponse"), "get-http-response");
        assert_eq!(kebab_case("parseURL"), "parse-url");
        assert_eq!(kebab_case("ID"), "id");
        assert_eq!(kebab_case("userID"), "user-id");
    }

    #[test]
    fn test_leading_capital() {
        assert_eq!(kebab_case("GetAll"), "get-all");
        assert_eq!(kebab_case("A"), "a");
    }

    #[test]
    fn test_digits_and_underscores() {
        assert_eq!(kebab_case("getValue2"), "get-value2");
        assert_eq!(kebab_case("v2Api"), "v2api");
        assert_eq!(kebab_case("myVar_name"), "my-var_name");
        assert_eq!(kebab_case("lib_utils"), "lib_utils");
    }

    #[test]
    fn test_idempotent() {
        for name in ["getAll", "HTTPRequest", "getHTTPResponse", "userID", "lib_utils", "x"] {
            let once = kebab_case(name);
            assert_eq!(kebab_case(&once), once, "{}", name);
        }
        assert_eq!(kebab_case("get-all"), "get-all");
        assert_eq!(kebab_case(""), "");
    }
}
