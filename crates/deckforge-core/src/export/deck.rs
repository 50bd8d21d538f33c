//! Deck resolution and grouping.

use crate::catalog::Catalog;
use crate::storage::Card;

/// Deck used when neither an override nor a note type default applies.
pub const FALLBACK_DECK: &str = "Default";

/// Id of Anki's built-in "Default" deck, which every collection carries.
pub const DEFAULT_DECK_ID: i64 = 1;
const DECK_ID_RANGE: u64 = 10_000_000_000;

/// How cards are assigned to decks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeckPolicy {
    /// Every card goes into the named deck
    Override(String),
    /// Each card goes into its note type's default deck, or `FALLBACK_DECK`
    NoteTypeDefault,
}

impl DeckPolicy {
    /// Override when a name is given, note type defaults otherwise.
    pub fn from_option(name: Option<String>) -> Self {
        match name {
            Some(name) => DeckPolicy::Override(name),
            None => DeckPolicy::NoteTypeDefault,
        }
    }

    /// Deck name for `card`.
    pub fn resolve<'a>(&'a self, card: &Card, catalog: &'a Catalog) -> &'a str {
        match self {
            DeckPolicy::Override(name) => name,
            DeckPolicy::NoteTypeDefault => catalog
                .get(&card.note_type)
                .and_then(|nt| nt.default_deck.as_deref())
                .unwrap_or(FALLBACK_DECK),
        }
    }
}

/// Stable numeric deck id for a deck name.
///
/// `FALLBACK_DECK` maps onto the built-in deck id so imports merge into it
/// instead of creating a second "Default". Any other name takes the first
/// eight bytes of its BLAKE3 hash reduced into `[0, 10^10)`, never the
/// built-in id. Distinct names can collide; with personal deck counts the
/// odds are negligible.
pub fn deck_id(name: &str) -> i64 {
    if name == FALLBACK_DECK {
        return DEFAULT_DECK_ID;
    }
    let hash = blake3::hash(name.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&hash.as_bytes()[..8]);
    let id = (u64::from_le_bytes(prefix) % DECK_ID_RANGE) as i64;
    if id == DEFAULT_DECK_ID {
        id + 1
    } else {
        id
    }
}

/// Cards assigned to one deck, in input order.
#[derive(Debug, Clone)]
pub struct DeckGroup<'a> {
    pub name: String,
    pub id: i64,
    pub cards: Vec<&'a Card>,
}

/// Group cards by resolved deck name.
///
/// Decks appear in the order their first card was seen.
pub fn group_by_deck<'a>(
    cards: &'a [Card],
    policy: &DeckPolicy,
    catalog: &Catalog,
) -> Vec<DeckGroup<'a>> {
    let mut groups: Vec<DeckGroup<'a>> = Vec::new();
    for card in cards {
        let name = policy.resolve(card, catalog);
        match groups.iter_mut().find(|group| group.name == name) {
            Some(group) => group.cards.push(card),
            None => groups.push(DeckGroup {
                name: name.to_string(),
                id: deck_id(name),
                cards: vec![card],
            }),
        }
    }
    groups
}
