//! Study-mode cursor over a deck's flashcards.

use crate::models::Flashcard;

/// Which side of the current card is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
}

impl Face {
    fn flipped(self) -> Self {
        match self {
            Face::Front => Face::Back,
            Face::Back => Face::Front,
        }
    }
}

/// Outcome of [`StudySession::advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Moved to the card at this index.
    Moved(usize),
    /// Advanced past the last card; study mode is over.
    Finished,
    /// Study mode is not active.
    Idle,
}

/// Linear position in a deck while studying. Nothing is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudySession {
    card_count: usize,
    index: usize,
    face: Face,
    active: bool,
}

impl StudySession {
    /// An inactive session over `card_count` cards.
    pub fn new(card_count: usize) -> Self {
        Self {
            card_count,
            index: 0,
            face: Face::Front,
            active: false,
        }
    }

    /// Start (or restart) studying from the first card, front side up.
    ///
    /// Returns false, leaving study mode off, when there are no cards.
    pub fn enter(&mut self) -> bool {
        self.index = 0;
        self.face = Face::Front;
        self.active = self.card_count > 0;
        self.active
    }

    pub fn exit(&mut self) {
        self.active = false;
    }

    pub fn advance(&mut self) -> Step {
        if !self.active {
            return Step::Idle;
        }
        if self.index + 1 < self.card_count {
            self.index += 1;
            self.face = Face::Front;
            Step::Moved(self.index)
        } else {
            self.active = false;
            Step::Finished
        }
    }

    /// Step back one card. Returns false at the first card.
    pub fn retreat(&mut self) -> bool {
        if !self.active || self.index == 0 {
            return false;
        }
        self.index -= 1;
        self.face = Face::Front;
        true
    }

    pub fn flip(&mut self) -> Face {
        if self.active {
            self.face = self.face.flipped();
        }
        self.face
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn face(&self) -> Face {
        self.face
    }

    pub fn is_last(&self) -> bool {
        self.index + 1 == self.card_count
    }

    /// One-based position and total, e.g. `(1, 10)` for "Card 1 of 10".
    pub fn progress(&self) -> (usize, usize) {
        (self.index + 1, self.card_count)
    }

    /// The card under the cursor, while studying.
    pub fn current<'a>(&self, cards: &'a [Flashcard]) -> Option<&'a Flashcard> {
        if !self.active {
            return None;
        }
        cards.get(self.index)
    }

    /// Text of the visible side of the current card.
    pub fn visible_text<'a>(&self, cards: &'a [Flashcard]) -> Option<&'a str> {
        self.current(cards).map(|card| match self.face {
            Face::Front => card.front.as_str(),
            Face::Back => card.back.as_str(),
        })
    }
}
