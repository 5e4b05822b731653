//! Amount parsing and sort verification for tabular data.
//!
//! Displayed amounts look like `- 320.00 USD` or `+ 1,250.00 USD`. Parsing
//! strips every whitespace character, thousands separators and a trailing
//! three-letter currency code, then reads the rest as a decimal number.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

fn noise() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| Regex::new(r"\s+|,|[A-Za-z]{3}$").expect("valid regex"))
}

/// Parse a displayed amount into a number.
///
/// Returns `None` when the cleaned text is not a decimal number.
#[must_use]
pub fn parse_amount(text: &str) -> Option<f64> {
    let cleaned = noise().replace_all(text.trim(), "");
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Why an amount sequence is not in ascending order
#[derive(Debug, Clone, PartialEq)]
pub enum OrderViolation {
    /// An amount could not be parsed
    Unparsable {
        /// Position in the sequence
        index: usize,
        /// Raw text
        text: String,
    },
    /// Adjacent pair out of order
    OutOfOrder {
        /// Position of the second element of the pair
        index: usize,
        /// Previous value
        previous: f64,
        /// Offending value
        current: f64,
    },
}

impl std::fmt::Display for OrderViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unparsable { index, text } => {
                write!(f, "amount #{index} is not a number: \"{text}\"")
            }
            Self::OutOfOrder {
                index,
                previous,
                current,
            } => write!(f, "amount #{index} ({current}) follows {previous}"),
        }
    }
}

/// Check that `texts` parse to an ascending sequence.
///
/// With `strict`, each value must be greater than its predecessor; otherwise
/// equal neighbours are allowed. Returns the parsed values on success.
pub fn check_ascending<S: AsRef<str>>(
    texts: &[S],
    strict: bool,
) -> Result<Vec<f64>, OrderViolation> {
    let values = texts
        .iter()
        .enumerate()
        .map(|(index, text)| {
            parse_amount(text.as_ref()).ok_or_else(|| OrderViolation::Unparsable {
                index,
                text: text.as_ref().to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    for (index, pair) in values.windows(2).enumerate() {
        let (previous, current) = (pair[0], pair[1]);
        let ordered = if strict {
            current > previous
        } else {
            current >= previous
        };
        if !ordered {
            return Err(OrderViolation::OutOfOrder {
                index: index + 1,
                previous,
                current,
            });
        }
    }
    Ok(values)
}

/// Whether two text lists hold the same multiset of entries
#[must_use]
pub fn same_multiset<A: AsRef<str>, B: AsRef<str>>(before: &[A], after: &[B]) -> bool {
    if before.len() != after.len() {
        return false;
    }
    let mut counts: HashMap<&str, isize> = HashMap::new();
    for text in before {
        *counts.entry(text.as_ref()).or_default() += 1;
    }
    for text in after {
        *counts.entry(text.as_ref()).or_default() -= 1;
    }
    counts.values().all(|c| *c == 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod parse_tests {
        use super::*;

        #[test]
        fn test_parse_negative_with_currency() {
            assert_eq!(parse_amount("- 320.00 USD"), Some(-320.0));
        }

        #[test]
        fn test_parse_positive_with_thousands() {
            assert_eq!(parse_amount("+ 1,250.00 USD"), Some(1250.0));
            assert_eq!(parse_amount(" + 17.99 USD "), Some(17.99));
        }

        #[test]
        fn test_parse_plain_number() {
            assert_eq!(parse_amount("42"), Some(42.0));
        }

        #[test]
        fn test_parse_garbage() {
            assert_eq!(parse_amount("n/a"), None);
            assert_eq!(parse_amount(""), None);
            assert_eq!(parse_amount("USD"), None);
        }
    }

    mod order_tests {
        use super::*;

        #[test]
        fn test_ascending_table_column() {
            let column = [
                "- 320.00 USD",
                "- 244.00 USD",
                "+ 17.99 USD",
                "+ 340.00 USD",
                "+ 952.23 USD",
                "+ 1,250.00 USD",
            ];
            let values = check_ascending(&column, true).unwrap();
            assert_eq!(values.len(), 6);
        }

        #[test]
        fn test_strict_rejects_equal_neighbours() {
            let column = ["1.00 USD", "1.00 USD"];
            assert!(matches!(
                check_ascending(&column, true),
                Err(OrderViolation::OutOfOrder { index: 1, .. })
            ));
            assert!(check_ascending(&column, false).is_ok());
        }

        #[test]
        fn test_unparsable_reported() {
            let column = ["1.00 USD", "oops"];
            let err = check_ascending(&column, true).unwrap_err();
            assert!(err.to_string().contains("oops"));
        }

        #[test]
        fn test_empty_and_single() {
            let empty: [&str; 0] = [];
            assert!(check_ascending(&empty, true).is_ok());
            assert!(check_ascending(&["5"], true).is_ok());
        }

        #[test]
        fn test_multiset() {
            assert!(same_multiset(&["a", "b", "a"], &["a", "a", "b"]));
            assert!(!same_multiset(&["a", "b"], &["a", "a"]));
            assert!(!same_multiset(&["a"], &["a", "a"]));
        }
    }

    proptest! {
        #[test]
        fn prop_sorted_cents_are_ascending(mut cents in prop::collection::btree_set(-100_000_000i64..100_000_000, 0..20)
            .prop_map(|s| s.into_iter().collect::<Vec<_>>())) {
            cents.sort_unstable();
            let texts: Vec<String> = cents.iter().map(|c| {
                let sign = if *c < 0 { "-" } else { "+" };
                let abs = c.unsigned_abs();
                format!("{sign} {}.{:02} USD", abs / 100, abs % 100)
            }).collect();
            prop_assert!(check_ascending(&texts, true).is_ok());
        }

        #[test]
        fn prop_permutation_is_same_multiset(texts in prop::collection::vec("[a-z]{1,4}", 0..12)) {
            let mut shuffled = texts.clone();
            shuffled.reverse();
            prop_assert!(same_multiset(&texts, &shuffled));
        }
    }
}
