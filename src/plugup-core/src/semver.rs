//! Version validation and ordering for plugin headers.
//!
//! Major and minor compare numerically. The remainder ("patch and beyond")
//! decides ties: a release outranks any pre-release of the same major.minor,
//! otherwise the remainders compare with a numeric-aware collation.

use regex::Regex;
use std::cmp::Ordering;
use std::sync::LazyLock;

static SEMVER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^(0|[1-9]\d*)\.(0|[1-9]\d*)\.(0|[1-9]\d*)",
        r"(?:-((?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*)(?:\.(?:0|[1-9]\d*|\d*[a-zA-Z-][0-9a-zA-Z-]*))*))?",
        r"(?:\+([0-9a-zA-Z-]+(?:\.[0-9a-zA-Z-]+)*))?$",
    ))
    .expect("valid semver regex")
});

/// `major.minor.patch[-prerelease][+build]`, no leading `v`, no leading zeros.
pub fn is_valid(version: &str) -> bool {
    SEMVER_RE.is_match(version)
}

pub fn compare(a: &str, b: &str) -> Ordering {
    let a_parts: Vec<&str> = a.split('.').collect();
    let b_parts: Vec<&str> = b.split('.').collect();

    fn component<'a>(parts: &[&'a str], idx: usize) -> &'a str {
        parts.get(idx).copied().unwrap_or("")
    }

    collate(component(&a_parts, 0), component(&b_parts, 0))
        .then_with(|| collate(component(&a_parts, 1), component(&b_parts, 1)))
        .then_with(|| {
            let a_rest = rest_from(&a_parts, 2);
            let b_rest = rest_from(&b_parts, 2);
            match (is_marked(&a_rest), is_marked(&b_rest)) {
                (true, false) => Ordering::Less,
                (false, true) => Ordering::Greater,
                _ => collate(&a_rest, &b_rest),
            }
        })
}

pub fn greater_than(a: &str, b: &str) -> bool {
    compare(a, b) == Ordering::Greater
}

fn rest_from(parts: &[&str], idx: usize) -> String {
    parts.get(idx..).map(|rest| rest.join(".")).unwrap_or_default()
}

// Pre-release suffixes carry a '-' (or a further '.').
fn is_marked(rest: &str) -> bool {
    rest.contains(&['.', '-'][..])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum CharClass {
    Punctuation,
    Digit,
    Letter,
}

#[derive(Debug)]
enum Token<'a> {
    Number(&'a str),
    Char(char),
}

impl Token<'_> {
    fn class(&self) -> CharClass {
        match self {
            Token::Number(_) => CharClass::Digit,
            Token::Char(c) if c.is_alphabetic() => CharClass::Letter,
            Token::Char(c) if c.is_numeric() => CharClass::Digit,
            Token::Char(_) => CharClass::Punctuation,
        }
    }
}

fn tokenize(s: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut chars = s.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        if c.is_ascii_digit() {
            let mut end = start + 1;
            while let Some(&(idx, next)) = chars.peek() {
                if !next.is_ascii_digit() {
                    break;
                }
                end = idx + 1;
                chars.next();
            }
            tokens.push(Token::Number(&s[start..end]));
        } else {
            tokens.push(Token::Char(c));
        }
    }
    tokens
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Numeric-aware string ordering: digit runs compare by value, punctuation
/// sorts before digits and digits before letters. Letters compare without
/// case first; lowercase wins a remaining tie.
pub(crate) fn collate(a: &str, b: &str) -> Ordering {
    let a_tokens = tokenize(a);
    let b_tokens = tokenize(b);

    let mut case_tiebreak = Ordering::Equal;
    for (x, y) in a_tokens.iter().zip(b_tokens.iter()) {
        let ord = x.class().cmp(&y.class()).then_with(|| match (x, y) {
            (Token::Number(x), Token::Number(y)) => compare_numbers(x, y),
            (Token::Char(x), Token::Char(y)) => {
                let folded = x.to_lowercase().cmp(y.to_lowercase());
                if folded == Ordering::Equal && case_tiebreak == Ordering::Equal {
                    case_tiebreak = case_rank(*x).cmp(&case_rank(*y));
                }
                folded
            }
            // non-ASCII numerals sort after ASCII digit runs
            (Token::Number(_), Token::Char(_)) => Ordering::Less,
            (Token::Char(_), Token::Number(_)) => Ordering::Greater,
        });
        if ord != Ordering::Equal {
            return ord;
        }
    }

    a_tokens
        .len()
        .cmp(&b_tokens.len())
        .then(case_tiebreak)
}

fn case_rank(c: char) -> u8 {
    if c.is_uppercase() {
        1
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validity() {
        assert!(is_valid("1.2.3"));
        assert!(is_valid("0.0.0"));
        assert!(is_valid("1.0.0-alpha.1"));
        assert!(is_valid("1.0.0-rc1+build.5"));
        assert!(!is_valid("1.2"));
        assert!(!is_valid("v1.2.3"));
        assert!(!is_valid("01.2.3"));
        assert!(!is_valid("1.2.3-"));
        assert!(!is_valid(""));
    }

    #[test]
    fn equal_strings_compare_equal() {
        for v in ["1.2.3", "0.0.1", "2.0.0-rc1", "1.0.0-alpha.1", "3.1.4+build"] {
            assert_eq!(compare(v, v), Ordering::Equal, "{v}");
        }
    }

    #[test]
    fn release_beats_its_prerelease() {
        assert_eq!(compare("2.0.0", "2.0.0-rc1"), Ordering::Greater);
        assert_eq!(compare("2.0.0-rc1", "2.0.0"), Ordering::Less);
        assert!(!greater_than("2.0.0-rc1", "2.0.0"));
    }

    #[test]
    fn minor_compares_numerically() {
        assert_eq!(compare("1.9.0", "1.10.0"), Ordering::Less);
        assert_eq!(compare("10.0.0", "9.0.0"), Ordering::Greater);
        assert_eq!(compare("1.0.10", "1.0.9"), Ordering::Greater);
    }

    #[test]
    fn prerelease_tags_compare_when_both_marked() {
        assert_eq!(compare("1.0.0-alpha", "1.0.0-beta"), Ordering::Less);
        assert_eq!(compare("1.0.0-rc.2", "1.0.0-rc.10"), Ordering::Less);
        assert_eq!(compare("1.0.0-beta", "1.0.0-alpha"), Ordering::Greater);
    }

    #[test]
    fn major_and_minor_decide_first() {
        assert!(greater_than("2.0.0-rc1", "1.9.9"));
        assert!(greater_than("1.1.0", "1.0.5"));
        assert!(!greater_than("1.0.0", "1.0.0"));
    }

    #[test]
    fn missing_components_compare_as_empty() {
        assert_eq!(compare("1", "1.0"), Ordering::Less);
        assert_eq!(compare("1.2", "1.2"), Ordering::Equal);
        assert!(greater_than("1.2.0", "1.2"));
    }

    #[test]
    fn collation_orders_classes() {
        assert_eq!(collate("-", "0"), Ordering::Less);
        assert_eq!(collate("9", "a"), Ordering::Less);
        assert_eq!(collate("a", "B"), Ordering::Less);
        assert_eq!(collate("a", "A"), Ordering::Less);
        assert_eq!(collate("A", "a"), Ordering::Greater);
        assert_eq!(collate("007", "7"), Ordering::Equal);
    }
}
