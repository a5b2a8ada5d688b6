//! Deck factory - shuffled deck builders for each card family
//!
//! Pure functions over any `Rng`, plus `DeckKind` so a rules engine can
//! declare its deck and let the match runtime build it.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::domain::cards::{
    Card, FrenchCard, FrenchRank, FrenchSuit, SpanishCard, SpanishRank, SpanishSuit, UnoCard,
    UnoColor, UnoFace,
};

pub const FRENCH_DECK_SIZE: usize = 52;
pub const SPANISH_DECK_SIZE: usize = 52;
pub const UNO_DECK_SIZE: usize = 108;

/// The deck a rules engine plays with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DeckKind {
    French,
    Spanish { excluded: Vec<SpanishRank> },
    Uno,
}

impl DeckKind {
    /// Build the shuffled deck. A seed makes the deal reproducible;
    /// without one the shuffle draws from entropy.
    pub fn build(&self, seed: Option<u64>) -> Vec<Card> {
        let mut rng = match seed {
            Some(s) => ChaCha8Rng::seed_from_u64(s),
            None => ChaCha8Rng::from_entropy(),
        };
        match self {
            DeckKind::French => standard_deck(&mut rng),
            DeckKind::Spanish { excluded } => spanish_deck(excluded, &mut rng),
            DeckKind::Uno => uno_deck(&mut rng),
        }
    }
}

/// 52-card French deck, shuffled.
pub fn standard_deck<R: Rng>(rng: &mut R) -> Vec<Card> {
    let mut deck = Vec::with_capacity(FRENCH_DECK_SIZE);
    for suit in FrenchSuit::ALL {
        for rank in FrenchRank::ALL {
            deck.push(Card::French(FrenchCard { suit, rank }));
        }
    }
    deck.shuffle(rng);
    deck
}

/// Spanish deck minus the excluded ranks, shuffled.
pub fn spanish_deck<R: Rng>(excluded: &[SpanishRank], rng: &mut R) -> Vec<Card> {
    let mut deck = Vec::with_capacity(SPANISH_DECK_SIZE);
    for suit in SpanishSuit::ALL {
        for rank in SpanishRank::all() {
            if !excluded.contains(&rank) {
                deck.push(Card::Spanish(SpanishCard { suit, rank }));
            }
        }
    }
    deck.shuffle(rng);
    deck
}

/// 108-card Uno deck: per color one zero, two each of 1-9 and of the three
/// action faces, plus four wilds and four wild-draw-fours.
pub fn uno_deck<R: Rng>(rng: &mut R) -> Vec<Card> {
    let mut deck = Vec::with_capacity(UNO_DECK_SIZE);
    for color in UnoColor::ALL {
        deck.push(Card::Uno(UnoCard::Colored {
            color,
            face: UnoFace::Number(0),
        }));
        for n in 1..=9 {
            for _ in 0..2 {
                deck.push(Card::Uno(UnoCard::Colored {
                    color,
                    face: UnoFace::Number(n),
                }));
            }
        }
        for face in [UnoFace::Skip, UnoFace::Reverse, UnoFace::DrawTwo] {
            for _ in 0..2 {
                deck.push(Card::Uno(UnoCard::Colored { color, face }));
            }
        }
    }
    for _ in 0..4 {
        deck.push(Card::Uno(UnoCard::Wild));
        deck.push(Card::Uno(UnoCard::WildDrawFour));
    }
    deck.shuffle(rng);
    deck
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_standard_deck_composition() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let deck = standard_deck(&mut rng);
        assert_eq!(deck.len(), FRENCH_DECK_SIZE);
        let unique: HashSet<_> = deck.iter().collect();
        assert_eq!(unique.len(), FRENCH_DECK_SIZE);
    }

    #[test]
    fn test_spanish_deck_full_and_stripped() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let full = spanish_deck(&[], &mut rng);
        assert_eq!(full.len(), SPANISH_DECK_SIZE);

        let excluded = [
            SpanishRank::Numeral(8),
            SpanishRank::Numeral(9),
            SpanishRank::Joker,
        ];
        let stripped = spanish_deck(&excluded, &mut rng);
        assert_eq!(stripped.len(), 40);
        for card in &stripped {
            let spanish = card.spanish().unwrap();
            assert!(!excluded.contains(&spanish.rank));
        }
    }

    #[test]
    fn test_uno_deck_composition() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let deck = uno_deck(&mut rng);
        assert_eq!(deck.len(), UNO_DECK_SIZE);

        let wilds = deck
            .iter()
            .filter(|c| matches!(c, Card::Uno(UnoCard::Wild)))
            .count();
        let draw_fours = deck
            .iter()
            .filter(|c| matches!(c, Card::Uno(UnoCard::WildDrawFour)))
            .count();
        assert_eq!(wilds, 4);
        assert_eq!(draw_fours, 4);

        let red_zeroes = deck
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Card::Uno(UnoCard::Colored {
                        color: UnoColor::Red,
                        face: UnoFace::Number(0)
                    })
                )
            })
            .count();
        assert_eq!(red_zeroes, 1);

        let blue_skips = deck
            .iter()
            .filter(|c| {
                matches!(
                    c,
                    Card::Uno(UnoCard::Colored {
                        color: UnoColor::Blue,
                        face: UnoFace::Skip
                    })
                )
            })
            .count();
        assert_eq!(blue_skips, 2);
    }

    #[test]
    fn test_seeded_build_is_reproducible() {
        let a = DeckKind::French.build(Some(42));
        let b = DeckKind::French.build(Some(42));
        assert_eq!(a, b);

        let c = DeckKind::French.build(Some(43));
        assert_ne!(a, c);
    }

    #[test]
    fn test_deck_kind_builds_right_family() {
        let uno = DeckKind::Uno.build(Some(7));
        assert!(uno.iter().all(|c| c.uno().is_some()));

        let spanish = DeckKind::Spanish { excluded: vec![] }.build(Some(7));
        assert!(spanish.iter().all(|c| c.spanish().is_some()));
    }
}
