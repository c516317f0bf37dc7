use crate::classification::rules::RuleTable;
use crate::error::{EngineError, EngineResult};
use crate::models::Record;

/// Assign `record` to exactly one category of `table`.
///
/// Rules are tried in table order and the first match wins. Records no rule
/// accepts land in the trailing fallback; without one the table is
/// misconfigured and `NoMatchingRule` is returned.
pub fn classify<'t>(record: &Record, table: &'t RuleTable) -> EngineResult<&'t str> {
    let title = record.job_title.to_lowercase();

    if let Some(rule) = table
        .ordered_rules()
        .iter()
        .find(|rule| rule.matches(&title, record.level))
    {
        return Ok(rule.label.as_str());
    }

    table
        .fallback()
        .map(|rule| rule.label.as_str())
        .ok_or_else(|| EngineError::NoMatchingRule {
            title: record.job_title.clone(),
        })
}
