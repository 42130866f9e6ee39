//! Flashcard operations.

use super::{require_text, ApiClient, Result};
use crate::models::{Flashcard, FlashcardCreate, FlashcardUpdate, MessageResponse};

impl ApiClient {
    /// GET /flashcards/deck/{deck_id}
    pub async fn list_deck_flashcards(&self, deck_id: i64) -> Result<Vec<Flashcard>> {
        self.get(&format!("/flashcards/deck/{}", deck_id)).await
    }

    /// POST /flashcards/deck/{deck_id}
    pub async fn create_flashcard(&self, deck_id: i64, data: &FlashcardCreate) -> Result<Flashcard> {
        require_text("Front", &data.front)?;
        require_text("Back", &data.back)?;
        self.post(&format!("/flashcards/deck/{}", deck_id), data).await
    }

    /// GET /flashcards/{id}
    pub async fn get_flashcard(&self, id: i64) -> Result<Flashcard> {
        self.get(&format!("/flashcards/{}", id)).await
    }

    /// PUT /flashcards/{id}
    pub async fn update_flashcard(&self, id: i64, data: &FlashcardUpdate) -> Result<Flashcard> {
        if let Some(front) = &data.front {
            require_text("Front", front)?;
        }
        if let Some(back) = &data.back {
            require_text("Back", back)?;
        }
        self.put(&format!("/flashcards/{}", id), data).await
    }

    /// DELETE /flashcards/{id}
    pub async fn delete_flashcard(&self, id: i64) -> Result<MessageResponse> {
        self.delete(&format!("/flashcards/{}", id)).await
    }
}
