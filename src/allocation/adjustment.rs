//! Parser for adjustment messages.
//!
//! Managers write free-text notes like `"+2 cases"` or
//! `"-1 bag and +1 pan"`. Every signed `<sign> <integer> <unit>` clause
//! in the text is an adjustment; anything else is display-only prose.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use regex::Regex;

use super::catalog::ContainerUnit;

static CLAUSE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([+-])\s*(\d+)\s*(cases?|bags?|pans?|buckets?)\b").unwrap()
});

/// One recognized clause, sign already applied.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdjustmentClause {
    pub delta: i64,
    pub unit: ContainerUnit,
}

/// All clauses recognized in one message.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedAdjustment {
    pub clauses: Vec<AdjustmentClause>,
}

impl ParsedAdjustment {
    /// True when the text held no recognizable clause.
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Net delta for one container unit across all clauses.
    pub fn delta_for(&self, unit: ContainerUnit) -> i64 {
        self.clauses
            .iter()
            .filter(|c| c.unit == unit)
            .map(|c| c.delta)
            .sum()
    }

    /// Per-unit net deltas, keyed by unit name, for the computed view.
    pub fn unit_totals(&self) -> BTreeMap<String, i64> {
        let mut totals = BTreeMap::new();
        for clause in &self.clauses {
            *totals.entry(clause.unit.to_string()).or_insert(0) += clause.delta;
        }
        totals
    }
}

/// Extracts every signed clause from a message. Joining words (`and`,
/// commas) and surrounding prose are ignored; a quantity too large for
/// i64 drops its clause rather than failing the whole message.
pub fn parse(message: &str) -> ParsedAdjustment {
    let clauses = CLAUSE_RE
        .captures_iter(message)
        .filter_map(|caps| {
            let qty: i64 = caps[2].parse().ok()?;
            let unit: ContainerUnit = caps[3].parse().ok()?;
            let delta = if &caps[1] == "-" { -qty } else { qty };
            Some(AdjustmentClause { delta, unit })
        })
        .collect();
    ParsedAdjustment { clauses }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_single_clause() {
        let parsed = parse("+2 cases");
        assert_eq!(parsed.clauses.len(), 1);
        assert_eq!(parsed.delta_for(ContainerUnit::Cases), 2);
    }

    #[test]
    fn parses_clauses_joined_by_and() {
        let parsed = parse("-1 bag and +1 pan");
        assert_eq!(parsed.delta_for(ContainerUnit::Bags), -1);
        assert_eq!(parsed.delta_for(ContainerUnit::Pans), 1);
        assert_eq!(parsed.delta_for(ContainerUnit::Cases), 0);
    }

    #[test]
    fn sums_repeated_units_across_comma_list() {
        let parsed = parse("+3 cases, -2 cases");
        assert_eq!(parsed.delta_for(ContainerUnit::Cases), 1);
        assert_eq!(parsed.unit_totals().get("cases"), Some(&1));
    }

    #[test]
    fn accepts_singular_units_and_mixed_case() {
        let parsed = parse("Team: pull +1 Case and -2 BUCKETS tonight");
        assert_eq!(parsed.delta_for(ContainerUnit::Cases), 1);
        assert_eq!(parsed.delta_for(ContainerUnit::Buckets), -2);
    }

    #[test]
    fn tolerates_missing_whitespace() {
        let parsed = parse("+2cases and -1bag");
        assert_eq!(parsed.delta_for(ContainerUnit::Cases), 2);
        assert_eq!(parsed.delta_for(ContainerUnit::Bags), -1);
    }

    #[test]
    fn prose_without_clauses_is_empty() {
        assert!(parse("thaw extra for the catering order").is_empty());
        assert!(parse("").is_empty());
    }

    #[test]
    fn unsigned_quantities_are_not_clauses() {
        assert!(parse("2 cases").is_empty());
    }

    #[test]
    fn unknown_units_are_not_clauses() {
        assert!(parse("+2 boxes").is_empty());
        // Partial token: "buck" is not a unit.
        assert!(parse("+2 buck").is_empty());
    }

    #[test]
    fn overflowing_quantity_drops_only_that_clause() {
        let parsed = parse("+99999999999999999999999 cases and -1 bag");
        assert_eq!(parsed.delta_for(ContainerUnit::Cases), 0);
        assert_eq!(parsed.delta_for(ContainerUnit::Bags), -1);
    }
}
