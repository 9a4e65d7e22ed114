pub mod auction;
pub mod health;
pub mod party;
