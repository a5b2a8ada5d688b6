//! Card - the card families every deck in the room can deal
//!
//! One value object per family (French, Spanish, Uno) plus the `Card`
//! union the runtime stores in hands, decks and table piles.

use serde::{Deserialize, Serialize};
use std::fmt;

/// French-suited card suit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrenchSuit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl FrenchSuit {
    pub const ALL: [FrenchSuit; 4] = [
        FrenchSuit::Clubs,
        FrenchSuit::Diamonds,
        FrenchSuit::Hearts,
        FrenchSuit::Spades,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            FrenchSuit::Clubs => "♣",
            FrenchSuit::Diamonds => "♦",
            FrenchSuit::Hearts => "♥",
            FrenchSuit::Spades => "♠",
        }
    }
}

/// French rank, Two lowest through Ace highest (the derived order is the
/// comparison War uses).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrenchRank {
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl FrenchRank {
    pub const ALL: [FrenchRank; 13] = [
        FrenchRank::Two,
        FrenchRank::Three,
        FrenchRank::Four,
        FrenchRank::Five,
        FrenchRank::Six,
        FrenchRank::Seven,
        FrenchRank::Eight,
        FrenchRank::Nine,
        FrenchRank::Ten,
        FrenchRank::Jack,
        FrenchRank::Queen,
        FrenchRank::King,
        FrenchRank::Ace,
    ];

    pub fn symbol(&self) -> &'static str {
        match self {
            FrenchRank::Two => "2",
            FrenchRank::Three => "3",
            FrenchRank::Four => "4",
            FrenchRank::Five => "5",
            FrenchRank::Six => "6",
            FrenchRank::Seven => "7",
            FrenchRank::Eight => "8",
            FrenchRank::Nine => "9",
            FrenchRank::Ten => "10",
            FrenchRank::Jack => "J",
            FrenchRank::Queen => "Q",
            FrenchRank::King => "K",
            FrenchRank::Ace => "A",
        }
    }
}

/// A card from the 52-card French deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrenchCard {
    pub suit: FrenchSuit,
    pub rank: FrenchRank,
}

impl FrenchCard {
    pub fn label(&self) -> String {
        format!("{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

/// Spanish-suited card suit
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpanishSuit {
    Oros,
    Copas,
    Espadas,
    Bastos,
}

impl SpanishSuit {
    pub const ALL: [SpanishSuit; 4] = [
        SpanishSuit::Oros,
        SpanishSuit::Copas,
        SpanishSuit::Espadas,
        SpanishSuit::Bastos,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpanishSuit::Oros => "oros",
            SpanishSuit::Copas => "copas",
            SpanishSuit::Espadas => "espadas",
            SpanishSuit::Bastos => "bastos",
        }
    }
}

/// Spanish rank: the numerals 1 through 12 plus a per-suit joker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SpanishRank {
    Numeral(u8),
    Joker,
}

impl SpanishRank {
    /// Every rank the full 52-card Spanish deck carries.
    pub fn all() -> impl Iterator<Item = SpanishRank> {
        (1..=12)
            .map(SpanishRank::Numeral)
            .chain(std::iter::once(SpanishRank::Joker))
    }
}

/// A card from the 52-card Spanish deck
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpanishCard {
    pub suit: SpanishSuit,
    pub rank: SpanishRank,
}

impl SpanishCard {
    pub fn label(&self) -> String {
        match self.rank {
            SpanishRank::Numeral(n) => format!("{} de {}", n, self.suit.as_str()),
            SpanishRank::Joker => format!("joker de {}", self.suit.as_str()),
        }
    }
}

/// Uno card color
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnoColor {
    Red,
    Yellow,
    Green,
    Blue,
}

impl UnoColor {
    pub const ALL: [UnoColor; 4] = [
        UnoColor::Red,
        UnoColor::Yellow,
        UnoColor::Green,
        UnoColor::Blue,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UnoColor::Red => "red",
            UnoColor::Yellow => "yellow",
            UnoColor::Green => "green",
            UnoColor::Blue => "blue",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "red" => Some(UnoColor::Red),
            "yellow" => Some(UnoColor::Yellow),
            "green" => Some(UnoColor::Green),
            "blue" => Some(UnoColor::Blue),
            _ => None,
        }
    }
}

/// Face of a colored Uno card: a number 0-9 or one of the action faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnoFace {
    Number(u8),
    Skip,
    Reverse,
    DrawTwo,
}

impl UnoFace {
    pub fn label(&self) -> String {
        match self {
            UnoFace::Number(n) => n.to_string(),
            UnoFace::Skip => "skip".to_string(),
            UnoFace::Reverse => "reverse".to_string(),
            UnoFace::DrawTwo => "draw two".to_string(),
        }
    }
}

/// An Uno card: colored face card or one of the two wild kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnoCard {
    Colored { color: UnoColor, face: UnoFace },
    Wild,
    WildDrawFour,
}

impl UnoCard {
    /// Printed color; wilds have none until a color is forced.
    #[inline]
    pub fn color(&self) -> Option<UnoColor> {
        match self {
            UnoCard::Colored { color, .. } => Some(*color),
            UnoCard::Wild | UnoCard::WildDrawFour => None,
        }
    }

    #[inline]
    pub fn face(&self) -> Option<UnoFace> {
        match self {
            UnoCard::Colored { face, .. } => Some(*face),
            UnoCard::Wild | UnoCard::WildDrawFour => None,
        }
    }

    #[inline]
    pub fn is_wild(&self) -> bool {
        matches!(self, UnoCard::Wild | UnoCard::WildDrawFour)
    }

    pub fn label(&self) -> String {
        match self {
            UnoCard::Colored { color, face } => format!("{} {}", color.as_str(), face.label()),
            UnoCard::Wild => "wild".to_string(),
            UnoCard::WildDrawFour => "wild draw four".to_string(),
        }
    }
}

/// Any card the runtime can hold; each rules engine works with exactly
/// one family and treats the others as corrupt state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Card {
    French(FrenchCard),
    Spanish(SpanishCard),
    Uno(UnoCard),
}

impl Card {
    #[inline]
    pub fn french(&self) -> Option<FrenchCard> {
        match self {
            Card::French(c) => Some(*c),
            _ => None,
        }
    }

    #[inline]
    pub fn spanish(&self) -> Option<SpanishCard> {
        match self {
            Card::Spanish(c) => Some(*c),
            _ => None,
        }
    }

    #[inline]
    pub fn uno(&self) -> Option<UnoCard> {
        match self {
            Card::Uno(c) => Some(*c),
            _ => None,
        }
    }

    /// Short human-readable label used on choice buttons and in notices.
    pub fn label(&self) -> String {
        match self {
            Card::French(c) => c.label(),
            Card::Spanish(c) => c.label(),
            Card::Uno(c) => c.label(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
