pub mod card;
pub mod deck;
pub mod rank;
pub mod result;
pub mod stack;
pub mod suit;
