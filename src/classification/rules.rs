//! Ordered category rules.
//!
//! A rule's position in the table is its priority. Matching is plain
//! case-insensitive substring search, so narrow keywords ("tpm") must sit
//! before the broad ones that would also catch them ("pm", "manager").

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// One category definition. Empty `keywords` or `levels` means "any".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub label: String,
    /// Lower-cased keywords as displayed in the category index.
    pub keywords: Vec<String>,
    pub levels: Vec<i32>,
}

impl CategoryRule {
    pub fn new(label: impl Into<String>, keywords: &[&str], levels: &[i32]) -> Self {
        Self {
            label: label.into(),
            keywords: keywords
                .iter()
                .map(|keyword| keyword.trim().to_lowercase())
                .filter(|keyword| !keyword.is_empty())
                .collect(),
            levels: levels.to_vec(),
        }
    }

    pub fn catch_all(label: impl Into<String>) -> Self {
        Self::new(label, &[], &[])
    }

    pub fn is_catch_all(&self) -> bool {
        self.keywords.is_empty() && self.levels.is_empty()
    }

    /// `normalized_title` must already be lower-cased.
    pub fn matches(&self, normalized_title: &str, level: Option<i32>) -> bool {
        let keyword_ok = self.keywords.is_empty()
            || self
                .keywords
                .iter()
                .any(|keyword| normalized_title.contains(keyword.as_str()));

        let level_ok = self.levels.is_empty()
            || level.map_or(false, |level| self.levels.contains(&level));

        keyword_ok && level_ok
    }
}

/// Which built-in table to classify with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleSet {
    /// Title keywords combined with seniority levels.
    #[default]
    Leveled,
    /// Title keywords only.
    Keyword,
}

impl RuleSet {
    pub fn table(self) -> RuleTable {
        match self {
            RuleSet::Leveled => RuleTable::leveled(),
            RuleSet::Keyword => RuleTable::keyword(),
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "leveled" => Some(RuleSet::Leveled),
            "keyword" => Some(RuleSet::Keyword),
            _ => None,
        }
    }
}

/// Immutable ordered rule list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<CategoryRule>,
}

impl RuleTable {
    /// Build a table, rejecting an empty list or duplicate labels. A missing
    /// fallback is allowed here and reported by [`RuleTable::validate`].
    pub fn new(rules: Vec<CategoryRule>) -> EngineResult<Self> {
        if rules.is_empty() {
            return Err(EngineError::InvalidRuleTable {
                reason: "table has no rules".into(),
            });
        }

        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.label.as_str()) {
                return Err(EngineError::InvalidRuleTable {
                    reason: format!("duplicate category label {}", rule.label),
                });
            }
        }

        Ok(Self { rules })
    }

    /// Fails with `NoMatchingRule` unless the last rule is a catch-all.
    pub fn validate(&self) -> EngineResult<()> {
        if self.fallback().is_some() {
            Ok(())
        } else {
            Err(EngineError::NoMatchingRule {
                title: String::new(),
            })
        }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|rule| rule.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The trailing catch-all rule, if the table has one.
    pub fn fallback(&self) -> Option<&CategoryRule> {
        self.rules.last().filter(|rule| rule.is_catch_all())
    }

    /// Rules evaluated before falling back.
    pub(crate) fn ordered_rules(&self) -> &[CategoryRule] {
        match self.fallback() {
            Some(_) => &self.rules[..self.rules.len() - 1],
            None => &self.rules,
        }
    }

    /// Level-aware table used for category bundles.
    pub fn leveled() -> Self {
        Self {
            rules: vec![
                CategoryRule::new("svp", &["SVP", "Senior Vice President"], &[1]),
                CategoryRule::new("vp", &["VP", "Vice President"], &[2]),
                CategoryRule::new("director", &["Director"], &[3]),
                CategoryRule::new(
                    "sdm",
                    &["SDM", "Senior Development Manager", "Senior Manager"],
                    &[4, 5],
                ),
                CategoryRule::new("manager", &["Manager", "Mgr"], &[4, 5, 6]),
                CategoryRule::new(
                    "sde",
                    &[
                        "SDE",
                        "Senior Software Development Engineer",
                        "Software Development Engineer",
                    ],
                    &[5, 6],
                ),
                CategoryRule::new("tpm", &["TPM", "Technical Program Manager"], &[5, 6]),
                CategoryRule::new("pm", &["PM", "Product Manager", "Program Manager"], &[5, 6]),
                CategoryRule::new("l4", &[], &[4]),
                CategoryRule::new("l5", &[], &[5]),
                CategoryRule::new("l6", &[], &[6]),
                CategoryRule::new("l7", &[], &[7]),
                CategoryRule::catch_all("other"),
            ],
        }
    }

    /// Keyword-only table, grouped by job family.
    pub fn keyword() -> Self {
        Self {
            rules: vec![
                CategoryRule::new(
                    "executives",
                    &["CEO", "President", "SVP", "Senior Vice President", "Chief"],
                    &[],
                ),
                CategoryRule::new("vps", &["VP", "Vice President"], &[]),
                CategoryRule::new("directors", &["Director"], &[]),
                CategoryRule::new(
                    "managers",
                    &["Manager", "Mgr", "SDM", "Senior Development Manager"],
                    &[],
                ),
                CategoryRule::new(
                    "engineers",
                    &["Engineer", "SDE", "Software Development Engineer", "Developer", "Dev"],
                    &[],
                ),
                CategoryRule::new("tpm", &["TPM", "Technical Program Manager"], &[]),
                CategoryRule::new("pm", &["PM", "Product Manager", "Program Manager"], &[]),
                CategoryRule::new("designers", &["Designer", "UX", "UI", "Design"], &[]),
                CategoryRule::new(
                    "data",
                    &["Data", "Analyst", "Scientist", "ML", "Machine Learning"],
                    &[],
                ),
                CategoryRule::new("operations", &["Operations", "Ops", "Support", "Customer"], &[]),
                CategoryRule::new("sales", &["Sales", "Account", "Business Development"], &[]),
                CategoryRule::new("marketing", &["Marketing", "Growth", "Brand"], &[]),
                CategoryRule::new("hr", &["HR", "People", "Recruiting", "Talent"], &[]),
                CategoryRule::new(
                    "finance",
                    &["Finance", "Accounting", "CFO", "Financial"],
                    &[],
                ),
                CategoryRule::new("legal", &["Legal", "Counsel", "Attorney"], &[]),
                CategoryRule::catch_all("other"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_normalized_and_blank_ones_dropped() {
        let rule = CategoryRule::new("tpm", &["TPM", "  ", "Technical Program Manager"], &[5]);
        assert_eq!(rule.keywords, vec!["tpm", "technical program manager"]);
    }

    #[test]
    fn missing_level_never_satisfies_a_level_set() {
        let rule = CategoryRule::new("l5", &[], &[5]);
        assert!(!rule.matches("engineer", None));
        assert!(rule.matches("engineer", Some(5)));
    }

    #[test]
    fn duplicate_labels_and_empty_tables_are_rejected() {
        let duplicate = RuleTable::new(vec![
            CategoryRule::new("vp", &["VP"], &[]),
            CategoryRule::new("vp", &["Vice President"], &[]),
        ]);
        assert!(matches!(duplicate, Err(EngineError::InvalidRuleTable { .. })));
        assert!(matches!(
            RuleTable::new(Vec::new()),
            Err(EngineError::InvalidRuleTable { .. })
        ));
    }

    #[test]
    fn table_without_trailing_fallback_fails_validation() {
        let table = RuleTable::new(vec![
            CategoryRule::catch_all("everyone"),
            CategoryRule::new("vp", &["VP"], &[]),
        ])
        .unwrap();
        assert!(matches!(
            table.validate(),
            Err(EngineError::NoMatchingRule { .. })
        ));
        assert_eq!(table.ordered_rules().len(), 2);
    }

    #[test]
    fn built_in_tables_are_well_formed() {
        for set in [RuleSet::Leveled, RuleSet::Keyword] {
            let table = set.table();
            table.validate().unwrap();
            let rebuilt = RuleTable::new(table.rules().to_vec()).unwrap();
            assert_eq!(rebuilt, table);
            assert_eq!(table.fallback().map(|rule| rule.label.as_str()), Some("other"));
        }
        assert_eq!(RuleSet::parse("keyword"), Some(RuleSet::Keyword));
        assert_eq!(RuleSet::parse("nope"), None);
    }
}
