//! Card storage.
//!
//! - `traits`: the `CardRepository` interface
//! - `types`: cards, filters and update builders
//! - `jsonl`: append-only JSON-lines backend

pub mod jsonl;
pub mod traits;
pub mod types;

pub use jsonl::{CorruptLinePolicy, JsonlStore};
pub use traits::CardRepository;
pub use types::{Card, CardFilter, CardUpdate, FieldMap, NewCard};
