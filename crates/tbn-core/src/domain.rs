//! Binding-site domains and their complements.

use crate::error::{TbnError, TbnResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A labeled binding site: an identifier plus a starred flag.
///
/// Two domains bind iff they share an identifier and differ in
/// starredness. Unstarred sorts before starred for the same identifier.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Domain {
    name: String,
    starred: bool,
}

fn is_word(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Domain {
    pub fn new(name: impl Into<String>, starred: bool) -> TbnResult<Self> {
        let name = name.into();
        if !is_word(&name) {
            return Err(TbnError::Parse(format!(
                "could not parse domain name: '{name}'"
            )));
        }
        Ok(Domain { name, starred })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_starred(&self) -> bool {
        self.starred
    }

    /// The domain this one binds to: same identifier, flipped star.
    pub fn complement(&self) -> Domain {
        Domain {
            name: self.name.clone(),
            starred: !self.starred,
        }
    }

    /// The unstarred domain with the same identifier.
    pub fn unstarred(&self) -> Domain {
        Domain {
            name: self.name.clone(),
            starred: false,
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.starred {
            write!(f, "{}*", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

impl FromStr for Domain {
    type Err = TbnError;

    /// Accepts `name`, `name*`, and (for StableGen compatibility) a
    /// trailing `:tag`, which is ignored.
    fn from_str(text: &str) -> TbnResult<Domain> {
        let bare = match text.split_once(':') {
            Some((head, tag)) => {
                if !is_word(tag) {
                    return Err(TbnError::Parse(format!("could not parse domain: '{text}'")));
                }
                head
            }
            None => text,
        };
        let (name, starred) = match bare.strip_suffix('*') {
            Some(name) => (name, true),
            None => (bare, false),
        };
        if !is_word(name) {
            return Err(TbnError::Parse(format!("could not parse domain: '{text}'")));
        }
        Ok(Domain {
            name: name.to_string(),
            starred,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_star_and_ignored_tag() {
        let a: Domain = "a".parse().unwrap();
        let a_star: Domain = "a*".parse().unwrap();
        let tagged: Domain = "a*:x3".parse().unwrap();
        assert!(!a.is_starred());
        assert!(a_star.is_starred());
        assert_eq!(a_star, tagged);
        assert_eq!(a.complement(), a_star);
        assert_eq!(a_star.complement(), a);
    }

    #[test]
    fn rejects_malformed_text() {
        assert!("".parse::<Domain>().is_err());
        assert!("*".parse::<Domain>().is_err());
        assert!("a**".parse::<Domain>().is_err());
        assert!("a b".parse::<Domain>().is_err());
        assert!("a:".parse::<Domain>().is_err());
    }

    #[test]
    fn unstarred_sorts_before_starred() {
        let a: Domain = "a".parse().unwrap();
        let a_star: Domain = "a*".parse().unwrap();
        let b: Domain = "b".parse().unwrap();
        assert!(a < a_star);
        assert!(a_star < b);
    }

    #[test]
    fn displays_round_trip() {
        for text in ["a", "a*", "x_7"] {
            let domain: Domain = text.parse().unwrap();
            assert_eq!(domain.to_string(), text);
        }
    }
}
