//! Documents describing category bundles and the category index.

use serde::{Deserialize, Serialize};

use crate::models::Record;

/// One category file as written by the partition driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryBundle {
    pub category: String,
    pub total_count: usize,
    pub generated_at: String,
    pub employees: Vec<Record>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub count: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keywords: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub levels: Option<Vec<i32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryIndex {
    pub categories: Vec<CategorySummary>,
    pub total_employees: usize,
    pub generated_at: String,
}
