//! Naming strategies: how a raw member identifier becomes a label.
//!
//! ## Examples
//! ```rust
//! use reflectgrid_core::naming::NamingStrategy;
//!
//! let split = NamingStrategy::SplitToCapitalizedWords;
//! assert_eq!(split.display_name("portToSendTo"), "Port To Send To");
//! assert_eq!(split.display_name("port_to_send_to"), "Port To Send To");
//! assert_eq!(NamingStrategy::Verbatim.display_name("port_to_send_to"), "port_to_send_to");
//! ```

use std::fmt;
use std::sync::Arc;

/// Map a member identifier to a display string.
#[derive(Clone, Default)]
pub enum NamingStrategy {
    /// Use the identifier as-is.
    Verbatim,
    /// Split on uppercase letters and underscores, then capitalise each word.
    #[default]
    SplitToCapitalizedWords,
    Custom(Arc<dyn Fn(&str) -> String + Send + Sync>),
}

impl NamingStrategy {
    pub fn custom(f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        NamingStrategy::Custom(Arc::new(f))
    }

    pub fn display_name(&self, raw: &str) -> String {
        match self {
            NamingStrategy::Verbatim => raw.to_string(),
            NamingStrategy::SplitToCapitalizedWords => split_to_capitalized_words(raw),
            NamingStrategy::Custom(f) => f(raw),
        }
    }
}

impl fmt::Debug for NamingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NamingStrategy::Verbatim => f.write_str("Verbatim"),
            NamingStrategy::SplitToCapitalizedWords => f.write_str("SplitToCapitalizedWords"),
            NamingStrategy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Split an identifier into capitalised words.
///
/// ## Notes
/// - Every uppercase letter starts a new word, so acronyms split per letter (`HTTPPort` becomes
///   `H T T P Port`).
/// - Underscores separate words and are dropped; runs of underscores never produce empty words.
pub fn split_to_capitalized_words(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 4);
    let mut boundary = true;

    for c in raw.chars() {
        if c == '_' {
            boundary = true;
            continue;
        }
        if c.is_uppercase() {
            boundary = true;
        }

        if boundary {
            if !out.is_empty() {
                out.push(' ');
            }
            out.extend(c.to_uppercase());
            boundary = false;
        } else {
            out.extend(c.to_lowercase());
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_camel_case() {
        assert_eq!(split_to_capitalized_words("receiverPort"), "Receiver Port");
        assert_eq!(split_to_capitalized_words("score"), "Score");
    }

    #[test]
    fn splits_snake_case_and_drops_underscores() {
        assert_eq!(split_to_capitalized_words("max_retry_count"), "Max Retry Count");
        assert_eq!(split_to_capitalized_words("__private__name"), "Private Name");
    }

    #[test]
    fn acronyms_split_per_letter() {
        assert_eq!(split_to_capitalized_words("HTTPPort"), "H T T P Port");
    }

    #[test]
    fn lowercases_inside_words() {
        assert_eq!(split_to_capitalized_words("PORT"), "P O R T");
        assert_eq!(split_to_capitalized_words("field2Name"), "Field2 Name");
    }

    #[test]
    fn empty_identifier_stays_empty() {
        assert_eq!(split_to_capitalized_words(""), "");
        assert_eq!(split_to_capitalized_words("___"), "");
    }

    #[test]
    fn custom_strategy_is_applied() {
        let upper = NamingStrategy::custom(|raw| raw.to_uppercase());
        assert_eq!(upper.display_name("port"), "PORT");
        assert_eq!(format!("{upper:?}"), "Custom(..)");
    }
}
