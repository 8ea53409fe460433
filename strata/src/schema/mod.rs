//! The schema model shared by migrations and adapters: column types and options,
//! table and index definitions, and the introspection records adapters return.

mod column;
mod index;
mod table;

pub use column::*;
pub use index::*;
pub use table::*;

use crate::common::Value;
use indexmap::IndexMap;

/// One table row, keyed by column name in column order.
pub type Row = IndexMap<String, Value>;

/// Outcome of an `*_if_exists` removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Removed,
    AlreadyAbsent,
}

impl Removal {
    pub fn removed(&self) -> bool {
        matches!(self, Removal::Removed)
    }
}
