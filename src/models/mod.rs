//! Data models for the Flashcards application.
//!
//! Resource shapes mirror the backend's JSON schemas field for field.

mod auth;
mod deck;
mod flashcard;
mod session;
mod user;

pub use auth::*;
pub use deck::*;
pub use flashcard::*;
pub use session::*;
pub use user::*;
