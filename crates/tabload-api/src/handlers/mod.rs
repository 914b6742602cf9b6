pub mod health;
pub mod hook;
pub mod index;
pub mod ingestions;
