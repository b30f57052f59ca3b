//! In-memory mount target for [`CssHandle`](super::CssHandle)s.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;

#[derive(Debug, Default)]
struct Sheets {
    next: u64,
    mounted: IndexMap<u64, Sheet>,
}

#[derive(Debug)]
struct Sheet {
    id: String,
    css: String,
}

/// Shared set of mounted stylesheets.
///
/// Every handle owns its own sheet slot, so two handles created with the
/// same id mount two separate sheets and unmounting one leaves the other in
/// place. Queries by id see all sheets mounted under that id.
///
/// Cloning a `Document` yields another handle to the same sheets. Mount
/// order is preserved, and re-mounting a slot keeps its original position
/// the way a reused `<style>` element would.
#[derive(Debug, Clone, Default)]
pub struct Document {
    sheets: Arc<Mutex<Sheets>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    fn sheets(&self) -> MutexGuard<'_, Sheets> {
        self.sheets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserves a slot for a new handle.
    pub(crate) fn allocate(&self) -> u64 {
        let mut sheets = self.sheets();
        let slot = sheets.next;
        sheets.next += 1;
        slot
    }

    pub(crate) fn mount(&self, slot: u64, id: &str, css: &str) {
        self.sheets().mounted.insert(
            slot,
            Sheet {
                id: id.to_string(),
                css: css.to_string(),
            },
        );
    }

    pub(crate) fn unmount(&self, slot: u64) {
        self.sheets().mounted.shift_remove(&slot);
    }

    /// Replaces the text of a mounted sheet. Does nothing if `slot` is not
    /// mounted.
    pub(crate) fn refresh(&self, slot: u64, css: &str) {
        if let Some(sheet) = self.sheets().mounted.get_mut(&slot) {
            sheet.css = css.to_string();
        }
    }

    /// Whether any sheet is mounted under `id`.
    pub fn is_mounted(&self, id: &str) -> bool {
        self.count(id) > 0
    }

    /// Number of sheets mounted under `id`.
    pub fn count(&self, id: &str) -> usize {
        self.sheets()
            .mounted
            .values()
            .filter(|sheet| sheet.id == id)
            .count()
    }

    /// Returns the text of the sheets mounted under `id`, concatenated in
    /// mount order.
    pub fn css(&self, id: &str) -> Option<String> {
        let sheets = self.sheets();
        let mut matching = sheets.mounted.values().filter(|sheet| sheet.id == id).peekable();
        matching.peek()?;
        Some(matching.map(|sheet| sheet.css.as_str()).collect())
    }

    /// Returns the id of every mounted sheet in mount order. An id appears
    /// once per sheet mounted under it.
    pub fn ids(&self) -> Vec<String> {
        self.sheets()
            .mounted
            .values()
            .map(|sheet| sheet.id.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.sheets().mounted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets().mounted.is_empty()
    }

    /// Concatenates every mounted sheet in mount order.
    pub fn render(&self) -> String {
        self.sheets()
            .mounted
            .values()
            .map(|sheet| sheet.css.as_str())
            .collect()
    }
}
