use crate::types::{Column, KpiRecord, Selection};
use std::collections::BTreeSet;

/// The loaded KPI table. Built once by the loader and only read afterwards.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    records: Vec<KpiRecord>,
    columns: Vec<Column>,
}

impl Dataset {
    /// `columns` is the header order of the source file, restricted to the
    /// known columns.
    pub fn new(records: Vec<KpiRecord>, columns: Vec<Column>) -> Self {
        Self { records, columns }
    }

    /// Build from records alone, using the canonical column order.
    pub fn from_records(records: Vec<KpiRecord>) -> Self {
        Self::new(records, Column::ALL.to_vec())
    }

    pub fn records(&self) -> &[KpiRecord] {
        &self.records
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records matching all three parts of `selection`, in file order.
    pub fn filter<'a>(&'a self, selection: &'a Selection) -> impl Iterator<Item = &'a KpiRecord> {
        self.records.iter().filter(move |r| r.matches(selection))
    }

    /// Sorted distinct values of one categorical field.
    pub fn distinct<F>(&self, field: F) -> Vec<String>
    where
        F: Fn(&KpiRecord) -> &str,
    {
        self.records
            .iter()
            .map(&field)
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .map(str::to_string)
            .collect()
    }
}
