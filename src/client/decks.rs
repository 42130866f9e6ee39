//! Deck operations.

use super::{require_text, ApiClient, Result};
use crate::models::{Deck, DeckCreate, DeckUpdate, MessageResponse};

impl ApiClient {
    /// GET /decks
    pub async fn list_decks(&self) -> Result<Vec<Deck>> {
        self.get("/decks").await
    }

    /// POST /decks
    pub async fn create_deck(&self, data: &DeckCreate) -> Result<Deck> {
        require_text("Deck name", &data.name)?;
        self.post("/decks", data).await
    }

    /// GET /decks/{id}
    pub async fn get_deck(&self, id: i64) -> Result<Deck> {
        self.get(&format!("/decks/{}", id)).await
    }

    /// PUT /decks/{id}
    pub async fn update_deck(&self, id: i64, data: &DeckUpdate) -> Result<Deck> {
        if let Some(name) = &data.name {
            require_text("Deck name", name)?;
        }
        self.put(&format!("/decks/{}", id), data).await
    }

    /// DELETE /decks/{id}
    pub async fn delete_deck(&self, id: i64) -> Result<MessageResponse> {
        self.delete(&format!("/decks/{}", id)).await
    }
}
