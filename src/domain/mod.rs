//! Domain layer - core business logic and entities

pub mod matching;
pub mod price;
pub mod promotion;
pub mod title;
