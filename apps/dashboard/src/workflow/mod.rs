//! # Workflow Module
//!
//! Controllers behind the dashboard pages.
//!
//! - [`Workflow`] - list, search and add/edit/delete dialogs of one entity
//! - [`StockEditor`] - quantity form of one warehouse

mod controller;
mod stock_editor;

pub use controller::{Dialog, Phase, Workflow};
pub use stock_editor::{StockEditor, StockRow};

/// Sets a busy flag for as long as it lives.
///
/// A dropped submission future clears the flag too.
pub(crate) struct Submitting<'a>(&'a mut bool);

impl<'a> Submitting<'a> {
    pub(crate) fn begin(flag: &'a mut bool) -> Self {
        *flag = true;
        Submitting(flag)
    }
}

impl Drop for Submitting<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}
