//! Join candidate detection.
//!
//! Suggests column pairs that probably join, from names alone:
//!
//! ```text
//! orders.user_id   ──ForeignKeySuffix──▶  users.id
//! employees.dept_id ◀──ExactName──▶ departments.dept_id
//! a.customerid     ◀──NormalizedName──▶ b.customer_id
//! ```
//!
//! Columns in internal schemas and columns of non-key types (temporal,
//! boolean, json, varchar, decimal, nested, ...) are ignored. Candidates are
//! unverified; nothing is checked against the data.

mod heuristics;

pub use heuristics::{
    id_prefix, is_internal_schema, is_joinable_type, joinability, normalize_column_name, pluralize,
    table_matches_prefix,
};

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::cache::CachePath;
use crate::metadata::{ColumnMetadata, MetadataWalker};

/// Why two columns were paired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinBasis {
    /// Same name, ignoring case.
    ExactName,
    /// Same name once underscores and case are ignored.
    NormalizedName,
    /// `x_id` pointing at the `id` column of table `x`/`xs`.
    ForeignKeySuffix,
}

impl fmt::Display for JoinBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinBasis::ExactName => "exact name",
            JoinBasis::NormalizedName => "normalized name",
            JoinBasis::ForeignKeySuffix => "foreign key suffix",
        })
    }
}

/// A suggested join between two columns.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct JoinCandidate {
    /// The referencing column for [`JoinBasis::ForeignKeySuffix`].
    pub left: ColumnMetadata,
    pub right: ColumnMetadata,
    pub basis: JoinBasis,
}

impl fmt::Display for JoinCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arrow = match self.basis {
            JoinBasis::ForeignKeySuffix => "->",
            _ => "<->",
        };
        write!(f, "{} {} {} [{}]", self.left, arrow, self.right, self.basis)
    }
}

/// How far apart two columns may be.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinStrategy {
    /// Only pair columns within one schema.
    #[default]
    SameSchema,
    /// Pair columns anywhere in the catalog.
    Global,
}

/// Name-based join candidate detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinDetector {
    strategy: JoinStrategy,
}

impl JoinDetector {
    pub fn new(strategy: JoinStrategy) -> Self {
        Self { strategy }
    }

    /// Candidates among `columns`, deduplicated and sorted.
    pub fn detect(&self, columns: &[ColumnMetadata]) -> Vec<JoinCandidate> {
        let eligible: Vec<&ColumnMetadata> = columns
            .iter()
            .filter(|c| !is_internal_schema(&c.schema) && is_joinable_type(&c.native_type))
            .collect();

        let mut found = BTreeSet::new();
        for scope in self.scopes(eligible) {
            foreign_key_candidates(&scope, &mut found);
            shared_name_candidates(&scope, &mut found);
        }
        found.into_iter().collect()
    }

    /// Walk `catalog`, detect, and cache the result under its `joins` entry.
    pub async fn detect_catalog(&self, walker: &MetadataWalker, catalog: &str) -> Vec<JoinCandidate> {
        let columns = walker.catalog_columns(catalog).await;
        let candidates = self.detect(&columns);

        tracing::info!(
            catalog,
            columns = columns.len(),
            candidates = candidates.len(),
            strategy = ?self.strategy,
            "join detection finished"
        );
        walker.remember(&CachePath::joins(catalog), &candidates);
        candidates
    }

    fn scopes<'a>(&self, columns: Vec<&'a ColumnMetadata>) -> Vec<Vec<&'a ColumnMetadata>> {
        match self.strategy {
            JoinStrategy::Global => vec![columns],
            JoinStrategy::SameSchema => {
                let mut by_schema: BTreeMap<(&str, &str), Vec<&ColumnMetadata>> = BTreeMap::new();
                for column in columns {
                    by_schema
                        .entry((column.catalog.as_str(), column.schema.as_str()))
                        .or_default()
                        .push(column);
                }
                by_schema.into_values().collect()
            }
        }
    }
}

fn same_table(a: &ColumnMetadata, b: &ColumnMetadata) -> bool {
    a.catalog == b.catalog && a.schema == b.schema && a.table == b.table
}

fn foreign_key_candidates(scope: &[&ColumnMetadata], found: &mut BTreeSet<JoinCandidate>) {
    for column in scope {
        let Some(prefix) = id_prefix(&column.column) else {
            continue;
        };

        for target in scope {
            if target.column.eq_ignore_ascii_case("id")
                && !same_table(column, target)
                && table_matches_prefix(&target.table, prefix)
            {
                found.insert(JoinCandidate {
                    left: (*column).clone(),
                    right: (*target).clone(),
                    basis: JoinBasis::ForeignKeySuffix,
                });
            }
        }
    }
}

fn shared_name_candidates(scope: &[&ColumnMetadata], found: &mut BTreeSet<JoinCandidate>) {
    let mut groups: BTreeMap<String, Vec<&ColumnMetadata>> = BTreeMap::new();
    for column in scope {
        groups
            .entry(normalize_column_name(&column.column))
            .or_default()
            .push(*column);
    }

    for group in groups.values().filter(|g| g.len() > 1) {
        for (i, a) in group.iter().enumerate() {
            for b in &group[i + 1..] {
                if same_table(a, b) {
                    continue;
                }
                if let Some(basis) = joinability(&a.column, &b.column) {
                    let (left, right) = if a <= b { (a, b) } else { (b, a) };
                    found.insert(JoinCandidate {
                        left: (*left).clone(),
                        right: (*right).clone(),
                        basis,
                    });
                }
            }
        }
    }
}
