use std::collections::HashMap;

use crate::classification::{classify, RuleTable};
use crate::error::EngineResult;
use crate::models::{CategoryBundle, CategoryIndex, CategorySummary, Record};

/// Records assigned to one category, in roster order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    pub label: String,
    pub keywords: Vec<String>,
    pub levels: Vec<i32>,
    pub records: Vec<Record>,
}

impl Bucket {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> CategorySummary {
        CategorySummary {
            name: self.label.clone(),
            count: self.records.len(),
            keywords: Some(self.keywords.clone()),
            levels: Some(self.levels.clone()),
        }
    }

    pub fn to_bundle(&self, generated_at: &str) -> CategoryBundle {
        CategoryBundle {
            category: self.label.clone(),
            total_count: self.records.len(),
            generated_at: generated_at.to_string(),
            employees: self.records.clone(),
        }
    }
}

/// Disjoint buckets in rule-table order, empty buckets included.
#[derive(Debug, Clone, PartialEq)]
pub struct Partition {
    buckets: Vec<Bucket>,
    total: usize,
}

impl Partition {
    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    pub fn get(&self, label: &str) -> Option<&Bucket> {
        self.buckets.iter().find(|bucket| bucket.label == label)
    }

    /// Number of records partitioned.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn index(&self, generated_at: &str) -> CategoryIndex {
        CategoryIndex {
            categories: self.buckets.iter().map(Bucket::summary).collect(),
            total_employees: self.total,
            generated_at: generated_at.to_string(),
        }
    }
}

/// Classify every record of the roster against `table`.
///
/// The table is validated first, so a missing fallback fails before any
/// record is touched.
pub fn partition(records: &[Record], table: &RuleTable) -> EngineResult<Partition> {
    table.validate()?;

    let mut buckets: Vec<Bucket> = table
        .rules()
        .iter()
        .map(|rule| Bucket {
            label: rule.label.clone(),
            keywords: rule.keywords.clone(),
            levels: rule.levels.clone(),
            records: Vec::new(),
        })
        .collect();
    let positions: HashMap<String, usize> = buckets
        .iter()
        .enumerate()
        .map(|(position, bucket)| (bucket.label.clone(), position))
        .collect();

    for record in records {
        let label = classify(record, table)?;
        // Labels come from the same table the buckets were built from.
        if let Some(&position) = positions.get(label) {
            buckets[position].records.push(record.clone());
        }
    }

    Ok(Partition {
        buckets,
        total: records.len(),
    })
}
