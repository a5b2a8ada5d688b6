//! Domain layer - cards, decks, the match runtime and the rule engines

pub mod actions;
pub mod cards;
pub mod deck;
pub mod match_runtime;
pub mod meta;
pub mod ports;
pub mod rules;
pub mod seat;
pub mod settlement;
pub mod view;
