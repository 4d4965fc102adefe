//! Client module
//!
//! `Airtable` → [`Base`] → [`Table<T>`]. The root owns configuration,
//! transport and mapper; each base memoizes its tables by name; each table
//! exposes select/find/create/update/destroy.

mod airtable;
mod base;
mod table;

pub use airtable::Airtable;
pub use base::Base;
pub use table::Table;

#[cfg(test)]
mod tests;
