//! Card repository trait definition.
//!
//! The `CardRepository` trait defines the interface that all card stores
//! must implement. Callers depend only on this trait, so the JSON-lines log
//! can be swapped for an indexed store without touching them.

use super::types::{Card, CardFilter, CardUpdate, NewCard};
use crate::error::Result;

/// Card store interface.
///
/// All implementations must ensure:
/// - Reads return cards in insertion order (oldest first)
/// - `create` never inserts a second card with the same note type and fields
/// - A missing backing store reads as empty
pub trait CardRepository {
    /// Insert a new card unless an identical one exists.
    ///
    /// # Returns
    ///
    /// Returns the guid of the inserted card, or of the existing card when
    /// one with the same note type and field values is already stored.
    fn create(&mut self, card: &NewCard) -> Result<String>;

    /// List cards matching every predicate of the filter.
    fn list(&self, filter: &CardFilter) -> Result<Vec<Card>>;

    /// Get the first card with the given guid.
    ///
    /// # Returns
    ///
    /// Returns `Ok(Some(card))` if found, `Ok(None)` if not found.
    fn get(&self, guid: &str) -> Result<Option<Card>>;

    /// Replace the fields and/or tags of a card.
    ///
    /// # Returns
    ///
    /// Returns `Ok(false)` when no card has the guid.
    fn update(&mut self, guid: &str, update: &CardUpdate) -> Result<bool>;

    /// Remove a card.
    ///
    /// # Returns
    ///
    /// Returns `Ok(false)` when no card has the guid.
    fn delete(&mut self, guid: &str) -> Result<bool>;

    /// Number of stored cards.
    fn count(&self) -> Result<usize> {
        Ok(self.list(&CardFilter::new())?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trait_is_object_safe() {
        fn _accepts_repository(_repo: &mut dyn CardRepository) {}
    }
}
