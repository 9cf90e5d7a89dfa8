//! Name case conversion for generated identifiers

use regex::{Captures, Regex};
use std::sync::LazyLock;

static LEADING_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\-_.]").expect("leading separator regex is valid"));
static SEPARATED_LOWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\-_.\s]([a-z])").expect("separator regex is valid"));

/// Converts a name into `camelCase`.
///
/// Only the first character is lowered, so acronyms keep their remaining capitals:
///
/// ```rust
/// # use castgen_common::case::camel_case;
/// assert_eq!(camel_case("ICFGNode"), "iCFGNode");
/// assert_eq!(camel_case("fun_entry_node"), "funEntryNode");
/// ```
pub fn camel_case(name: &str) -> String {
    let name = LEADING_SEPARATOR.replace(name, "");
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    let rest = SEPARATED_LOWER.replace_all(chars.as_str(), |caps: &Captures| {
        caps[1].to_uppercase()
    });
    format!("{}{}", first.to_lowercase(), rest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lowers_only_first_char() {
        assert_eq!(camel_case("VFG"), "vFG");
        assert_eq!(camel_case("GepObjPN"), "gepObjPN");
        assert_eq!(camel_case("FIObjPN"), "fIObjPN");
    }

    #[test]
    fn test_separators() {
        assert_eq!(camel_case("_private_name"), "privateName");
        assert_eq!(camel_case("dash-case"), "dashCase");
        assert_eq!(camel_case("dotted.name"), "dottedName");
        assert_eq!(camel_case("keep_Upper"), "keep_Upper");
    }

    #[test]
    fn test_empty() {
        assert_eq!(camel_case(""), "");
        assert_eq!(camel_case("_"), "");
    }
}
