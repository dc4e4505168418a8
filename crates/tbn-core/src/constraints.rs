//! User-supplied knobs bounding the configuration search.

use crate::error::{TbnError, TbnResult};
use serde::{Deserialize, Serialize};

/// Bounds on polymer count, merge count, and energy, plus the optimize /
/// sort flags and the bond weight.
///
/// `None` bounds are unconstrained. Updates go through the `with_*`
/// builders, which leave the original untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    max_polymers: Option<u64>,
    min_polymers: u64,
    max_merges: Option<u64>,
    min_merges: u64,
    max_energy: Option<f64>,
    min_energy: Option<f64>,
    sort: bool,
    optimize: bool,
    bond_weight: f64,
}

impl Default for Constraints {
    fn default() -> Self {
        Constraints {
            max_polymers: None,
            min_polymers: 0,
            max_merges: None,
            min_merges: 0,
            max_energy: None,
            min_energy: None,
            sort: true,
            optimize: true,
            bond_weight: 2.0,
        }
    }
}

impl Constraints {
    /// Parses one case-insensitive directive per non-blank line.
    pub fn from_string(text: &str) -> TbnResult<Constraints> {
        let mut constraints = Constraints::default();
        for raw_line in text.lines() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }
            constraints.apply_directive(line)?;
        }
        Ok(constraints)
    }

    fn apply_directive(&mut self, line: &str) -> TbnResult<()> {
        let upper = line.to_ascii_uppercase();
        let words: Vec<&str> = upper.split_whitespace().collect();
        match words.as_slice() {
            ["OPTIMIZE"] => self.optimize = true,
            ["NO", "OPTIMIZE"] => self.optimize = false,
            ["SORT"] => self.sort = true,
            ["NO", "SORT"] => self.sort = false,
            ["MAX", "ENERGY", value] => self.max_energy = Some(parse_float(line, value)?),
            ["MIN", "ENERGY", value] => self.min_energy = Some(parse_float(line, value)?),
            ["MAX", "MERGES", value] => self.max_merges = Some(parse_integer(line, value)?),
            ["MIN", "MERGES", value] => self.min_merges = parse_integer(line, value)?,
            ["MAX", "POLYMERS", value] => self.max_polymers = Some(parse_integer(line, value)?),
            ["MIN", "POLYMERS", value] => self.min_polymers = parse_integer(line, value)?,
            ["BOND", "WEIGHT", value] => {
                let weight = parse_float(line, value)?;
                if weight < 0.0 {
                    return Err(TbnError::Parse(format!(
                        "bond weight cannot be negative in line '{line}'"
                    )));
                }
                self.bond_weight = weight;
            }
            _ => {
                return Err(TbnError::Parse(format!(
                    "cannot parse line '{line}' in constraints file"
                )))
            }
        }
        Ok(())
    }

    pub fn with_fixed_polymers(&self, number_of_polymers: u64) -> Constraints {
        let mut this = self.clone();
        this.max_polymers = Some(number_of_polymers);
        this.min_polymers = number_of_polymers;
        this
    }

    pub fn with_fixed_merges(&self, number_of_merges: u64) -> Constraints {
        let mut this = self.clone();
        this.max_merges = Some(number_of_merges);
        this.min_merges = number_of_merges;
        this
    }

    pub fn with_fixed_energy(&self, amount_of_energy: f64) -> Constraints {
        let mut this = self.clone();
        this.max_energy = Some(amount_of_energy);
        this.min_energy = Some(amount_of_energy);
        this
    }

    pub fn with_bond_weight(&self, bond_weight: f64) -> Constraints {
        let mut this = self.clone();
        this.bond_weight = bond_weight;
        this
    }

    pub fn with_unset_optimization_flag(&self) -> Constraints {
        let mut this = self.clone();
        this.optimize = false;
        this
    }

    pub fn max_polymers(&self) -> Option<u64> {
        self.max_polymers
    }

    pub fn min_polymers(&self) -> u64 {
        self.min_polymers
    }

    pub fn max_merges(&self) -> Option<u64> {
        self.max_merges
    }

    pub fn min_merges(&self) -> u64 {
        self.min_merges
    }

    pub fn max_energy(&self) -> Option<f64> {
        self.max_energy
    }

    pub fn min_energy(&self) -> Option<f64> {
        self.min_energy
    }

    pub fn sort(&self) -> bool {
        self.sort
    }

    pub fn optimize(&self) -> bool {
        self.optimize
    }

    pub fn bond_weight(&self) -> f64 {
        self.bond_weight
    }
}

fn parse_integer(line: &str, value: &str) -> TbnResult<u64> {
    value
        .parse()
        .map_err(|_| TbnError::Parse(format!("cannot parse integer in line '{line}'")))
}

fn parse_float(line: &str, value: &str) -> TbnResult<f64> {
    value
        .parse()
        .map_err(|_| TbnError::Parse(format!("cannot parse number in line '{line}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let constraints = Constraints::default();
        assert_eq!(constraints.max_polymers(), None);
        assert_eq!(constraints.min_polymers(), 0);
        assert_eq!(constraints.max_merges(), None);
        assert_eq!(constraints.min_merges(), 0);
        assert_eq!(constraints.max_energy(), None);
        assert_eq!(constraints.min_energy(), None);
        assert!(constraints.sort());
        assert!(constraints.optimize());
        assert_eq!(constraints.bond_weight(), 2.0);
    }

    #[test]
    fn parses_every_directive() {
        let text = "
            no optimize
            NO SORT
            max energy -1.5
            MIN ENERGY -2.5
            Max Merges 7
            min merges 2
            MAX POLYMERS 9
            MIN POLYMERS 3
            bond weight 0.5
        ";
        let constraints = Constraints::from_string(text).unwrap();
        assert!(!constraints.optimize());
        assert!(!constraints.sort());
        assert_eq!(constraints.max_energy(), Some(-1.5));
        assert_eq!(constraints.min_energy(), Some(-2.5));
        assert_eq!(constraints.max_merges(), Some(7));
        assert_eq!(constraints.min_merges(), 2);
        assert_eq!(constraints.max_polymers(), Some(9));
        assert_eq!(constraints.min_polymers(), 3);
        assert_eq!(constraints.bond_weight(), 0.5);
    }

    #[test]
    fn rejects_unknown_directives() {
        assert!(Constraints::from_string("MAX WIDGETS 4").is_err());
        assert!(Constraints::from_string("MAX MERGES seven").is_err());
        assert!(Constraints::from_string("BOND WEIGHT -0.5").is_err());
        assert!(Constraints::from_string("OPTIMIZE HARDER").is_err());
    }

    #[test]
    fn serde_round_trip() {
        let constraints = Constraints::from_string("NO SORT\nMAX POLYMERS 5\nBOND WEIGHT 0.4").unwrap();
        let json = serde_json::to_string(&constraints).unwrap();
        let back: Constraints = serde_json::from_str(&json).unwrap();
        assert_eq!(back, constraints);
    }

    #[test]
    fn builders_leave_the_original_untouched() {
        let base = Constraints::default();
        let fixed = base.with_fixed_polymers(4);
        assert_eq!(base.max_polymers(), None);
        assert_eq!(fixed.max_polymers(), Some(4));
        assert_eq!(fixed.min_polymers(), 4);

        let merged = base.with_fixed_merges(2);
        assert_eq!(merged.max_merges(), Some(2));
        assert_eq!(merged.min_merges(), 2);

        let energetic = base.with_fixed_energy(1.5);
        assert_eq!(energetic.max_energy(), Some(1.5));
        assert_eq!(energetic.min_energy(), Some(1.5));

        let weighted = base.with_bond_weight(0.4);
        assert_eq!(weighted.bond_weight(), 0.4);
        assert_eq!(base.bond_weight(), 2.0);

        let unset = base.with_unset_optimization_flag();
        assert!(!unset.optimize());
        assert!(base.optimize());
    }
}
