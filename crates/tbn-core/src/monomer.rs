//! Monomers: named multisets of domains.

use crate::count::Count;
use crate::domain::Domain;
use crate::error::{TbnError, TbnResult};
use crate::multiset::PositiveMultiset;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

/// A non-empty multiset of domains, optionally named.
///
/// Identity (equality, ordering, hashing) is the rendered form: the name
/// when one was given, the bracketed sorted composition otherwise. A name
/// must therefore denote a single composition; TBN construction enforces
/// that process-wide uniqueness.
#[derive(Debug, Clone)]
pub struct Monomer {
    domains: PositiveMultiset<Domain>,
    name: Option<String>,
    rendered: String,
}

fn is_word(text: &str) -> bool {
    !text.is_empty()
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl Monomer {
    pub fn try_new(
        domain_counts: BTreeMap<Domain, Count>,
        name: Option<String>,
    ) -> TbnResult<Monomer> {
        if domain_counts.is_empty() {
            return Err(TbnError::InvalidInput(
                "attempted to create an empty monomer".into(),
            ));
        }
        let domains = PositiveMultiset::finite(domain_counts)?;

        let name = match name {
            Some(raw) => {
                let trimmed = raw.trim();
                if trimmed.is_empty() {
                    return Err(TbnError::InvalidInput(
                        "cannot give a whitespace string as a name for a monomer".into(),
                    ));
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        let rendered = match &name {
            Some(name) => name.clone(),
            None => format!("[{}]", composition_string(&domains)),
        };

        Ok(Monomer {
            domains,
            name,
            rendered,
        })
    }

    /// Parses `domainexpr (' ' domainexpr)* ('>' NAME)?` where a
    /// `domainexpr` is `DOMAIN` or `INT(DOMAIN)`.
    ///
    /// A name may come from the `>NAME` suffix or the `name` argument,
    /// but not both.
    pub fn from_string(text: &str, name: Option<&str>) -> TbnResult<Monomer> {
        let (composition, inline_name) = match text.split_once('>') {
            Some((head, raw_name)) => {
                let raw_name = raw_name.trim();
                if !is_word(raw_name) {
                    return Err(TbnError::Parse(format!(
                        "could not parse monomer name from string '{text}'"
                    )));
                }
                (head, Some(raw_name))
            }
            None => (text, None),
        };

        let name = match (inline_name, name) {
            (Some(_), Some(_)) => {
                return Err(TbnError::InvalidInput(
                    "monomer name specified both in the string and as an argument".into(),
                ))
            }
            (Some(inline), None) => Some(inline),
            (None, passed) => passed,
        };

        let mut domain_counts: BTreeMap<Domain, Count> = BTreeMap::new();
        let mut saw_domain = false;
        for token in composition.split_whitespace() {
            saw_domain = true;
            let (count, domain_text) = split_quantity(token)?;
            let domain: Domain = domain_text.parse()?;
            *domain_counts.entry(domain).or_insert(Count::ZERO) += Count::Finite(count);
        }
        if !saw_domain {
            return Err(TbnError::Parse(format!(
                "could not parse monomer from string '{text}'"
            )));
        }

        Monomer::try_new(domain_counts, name.map(str::to_string))
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Count of `domain` minus the count of its complement; the sign
    /// indicates excess or deficit of that flavor within the monomer.
    pub fn net_count(&self, domain: &Domain) -> i64 {
        let here = self.domains.count(domain).as_finite().unwrap_or(0) as i64;
        let there = self
            .domains
            .count(&domain.complement())
            .as_finite()
            .unwrap_or(0) as i64;
        here - there
    }

    /// The distinct identifiers appearing in the monomer, star-stripped
    /// and sorted.
    pub fn unstarred_domain_types(&self) -> Vec<Domain> {
        let set: BTreeSet<Domain> = self.domains.keys().map(Domain::unstarred).collect();
        set.into_iter().collect()
    }

    /// Every domain occurrence, listed explicitly in sorted order.
    pub fn as_explicit_list(&self) -> Vec<Domain> {
        let mut list = Vec::new();
        for (domain, count) in self.domains.iter() {
            for _ in 0..count.as_finite().unwrap_or(0) {
                list.push(domain.clone());
            }
        }
        list
    }

    pub fn domain_counts(&self) -> &PositiveMultiset<Domain> {
        &self.domains
    }

    /// `true` when both monomers carry the same domain multiset
    /// (regardless of name).
    pub fn same_composition(&self, other: &Monomer) -> bool {
        self.domains == other.domains
    }
}

fn composition_string(domains: &PositiveMultiset<Domain>) -> String {
    let pieces: Vec<String> = domains
        .iter()
        .map(|(domain, count)| match count {
            Count::Finite(1) => domain.to_string(),
            count => format!("{count}({domain})"),
        })
        .collect();
    pieces.join(" ")
}

/// Splits `5(a*)` into `(5, "a*")`; a bare token has quantity 1.
fn split_quantity(token: &str) -> TbnResult<(u64, &str)> {
    match token.find('(') {
        Some(open) => {
            let inner = token[open + 1..].strip_suffix(')').ok_or_else(|| {
                TbnError::Parse(format!("could not parse domain expression: '{token}'"))
            })?;
            let quantity = &token[..open];
            let count: u64 = quantity.parse().map_err(|_| {
                TbnError::Parse(format!("could not parse domain quantity: '{quantity}'"))
            })?;
            if count == 0 {
                return Err(TbnError::Parse(format!(
                    "domain quantity must be positive: '{token}'"
                )));
            }
            Ok((count, inner.trim()))
        }
        None => Ok((1, token)),
    }
}

impl fmt::Display for Monomer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rendered)
    }
}

impl PartialEq for Monomer {
    fn eq(&self, other: &Self) -> bool {
        self.rendered == other.rendered
    }
}

impl Eq for Monomer {}

impl PartialOrd for Monomer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Monomer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rendered.cmp(&other.rendered)
    }
}

impl Hash for Monomer {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rendered.hash(state);
    }
}
