//! Prescription table state: search, pagination and row expansion.

use std::collections::HashSet;

use crate::config;
use crate::models::{Prescription, PrescriptionId};

#[derive(Debug, Clone)]
pub struct TableState {
    search: String,
    page: usize,
    rows_per_page: usize,
    expanded: HashSet<PrescriptionId>,
}

impl Default for TableState {
    fn default() -> Self {
        Self {
            search: String::new(),
            page: 0,
            rows_per_page: config::DEFAULT_ROWS_PER_PAGE,
            expanded: HashSet::new(),
        }
    }
}

impl TableState {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_search(&mut self, text: &str) {
        self.search = text.to_string();
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn rows_per_page(&self) -> usize {
        self.rows_per_page
    }

    /// Any positive size is accepted; the page resets to the first.
    pub fn set_rows_per_page(&mut self, rows: usize) {
        if rows == 0 {
            tracing::warn!("Ignoring rows-per-page of 0");
            return;
        }
        if !config::ROWS_PER_PAGE_OPTIONS.contains(&rows) {
            tracing::debug!(rows, "Non-standard rows-per-page");
        }
        self.rows_per_page = rows;
        self.page = 0;
    }

    /// Returns whether `id` is expanded after the toggle.
    pub fn toggle_expanded(&mut self, id: PrescriptionId) -> bool {
        if self.expanded.remove(&id) {
            false
        } else {
            self.expanded.insert(id);
            true
        }
    }

    pub fn is_expanded(&self, id: PrescriptionId) -> bool {
        self.expanded.contains(&id)
    }

    /// Rows matching the search text, in list order.
    pub fn filter<'a>(&self, rows: &'a [Prescription]) -> Vec<&'a Prescription> {
        let needle = self.search.trim().to_lowercase();
        rows.iter().filter(|p| p.matches(&needle)).collect()
    }

    /// The current page of the filtered rows. Past the end is empty.
    pub fn page_of<'a>(&self, rows: &'a [Prescription]) -> Vec<&'a Prescription> {
        self.filter(rows)
            .into_iter()
            .skip(self.page.saturating_mul(self.rows_per_page))
            .take(self.rows_per_page)
            .collect()
    }

    pub fn page_count(&self, rows: &[Prescription]) -> usize {
        self.filter(rows).len().div_ceil(self.rows_per_page)
    }
}
