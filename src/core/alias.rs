//! Alias groups collapse several index constituents into one economic entity.

use crate::core::holdings::{Holding, finite_or_zero};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasGroup {
    /// Combined symbol, e.g. `GOOG+GOOGL`.
    pub symbol: String,
    pub name: String,
    pub members: Vec<String>,
}

impl AliasGroup {
    pub fn alphabet() -> Self {
        Self {
            symbol: "GOOG+GOOGL".to_string(),
            name: "Alphabet (GOOG + GOOGL)".to_string(),
            members: vec!["GOOG".to_string(), "GOOGL".to_string()],
        }
    }
}

/// Resolves alias members to their combined symbol. Built once per configuration.
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    groups: Vec<AliasGroup>,
    member_to_alias: HashMap<String, usize>,
}

impl AliasResolver {
    pub fn new(groups: Vec<AliasGroup>) -> Self {
        let groups: Vec<AliasGroup> = groups
            .into_iter()
            .map(|g| AliasGroup {
                symbol: g.symbol.trim().to_uppercase(),
                name: g.name,
                members: g
                    .members
                    .iter()
                    .map(|m| m.trim().to_uppercase())
                    .collect(),
            })
            .collect();

        let mut member_to_alias = HashMap::new();
        for (idx, group) in groups.iter().enumerate() {
            for member in &group.members {
                member_to_alias.entry(member.clone()).or_insert(idx);
            }
        }

        Self {
            groups,
            member_to_alias,
        }
    }

    /// Canonical symbol for `symbol`; identity when it is not an alias member.
    pub fn resolve<'a>(&'a self, symbol: &'a str) -> &'a str {
        self.member_to_alias
            .get(symbol)
            .map_or(symbol, |idx| self.groups[*idx].symbol.as_str())
    }

    /// True for combined alias symbols such as `GOOG+GOOGL`.
    pub fn is_alias(&self, symbol: &str) -> bool {
        self.groups.iter().any(|g| g.symbol == symbol)
    }

    pub fn is_member(&self, symbol: &str) -> bool {
        self.member_to_alias.contains_key(symbol)
    }

    /// Restricts the resolver to the groups whose combined symbol is in `allowed`.
    ///
    /// Members of an inactive group resolve to themselves.
    pub fn active_for(&self, allowed: &BTreeSet<String>) -> AliasResolver {
        AliasResolver::new(
            self.groups
                .iter()
                .filter(|g| allowed.contains(&g.symbol))
                .cloned()
                .collect(),
        )
    }

    /// Collapses alias members into their combined holding.
    ///
    /// Other holdings keep their order; each combined entry is appended after them, in group
    /// order, and only when at least one member was present.
    pub fn merge_holdings(&self, holdings: &[Holding]) -> Vec<Holding> {
        let mut merged = Vec::with_capacity(holdings.len());
        let mut group_weights: Vec<Option<f64>> = vec![None; self.groups.len()];

        for holding in holdings {
            match self.member_to_alias.get(&holding.symbol) {
                Some(idx) => {
                    let weight = group_weights[*idx].get_or_insert(0.0);
                    *weight += finite_or_zero(holding.weight_pct);
                }
                None => merged.push(holding.clone()),
            }
        }

        for (group, weight) in self.groups.iter().zip(group_weights) {
            if let Some(weight_pct) = weight {
                merged.push(Holding {
                    symbol: group.symbol.clone(),
                    name: group.name.clone(),
                    weight_pct,
                });
            }
        }

        merged
    }
}
