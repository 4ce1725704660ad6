//! feedback — posture guidance categories and their debounce
//!
//! Each frame maps to at most one guidance category. A message is issued only
//! when the category differs from the last one issued, so holding a pose does
//! not repeat the same sentence every frame.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackCategory {
    /// Get back into the start position.
    Position,
    /// Push further through the movement.
    Lift,
    /// Top of the movement reached.
    Hold,
    /// Required joints are not visible.
    NoPerson,
}

/// Half-open angle range `[min, max)` mapped to a category and its message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackBand {
    pub category: FeedbackCategory,
    pub min: f32,
    pub max: f32,
    pub message: String,
}

impl FeedbackBand {
    pub fn new(category: FeedbackCategory, min: f32, max: f32, message: &str) -> Self {
        Self {
            category,
            min,
            max,
            message: message.to_string(),
        }
    }

    pub fn contains(&self, angle: f32) -> bool {
        angle >= self.min && angle < self.max
    }
}

/// First band containing `angle`, if any.
pub fn classify(bands: &[FeedbackBand], angle: f32) -> Option<&FeedbackBand> {
    bands.iter().find(|band| band.contains(angle))
}

/// Remembers the last issued category and suppresses repeats.
#[derive(Debug, Clone, Default)]
pub struct FeedbackDispatcher {
    last: Option<FeedbackCategory>,
}

impl FeedbackDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `Some(category)` when it should be announced now.
    pub fn observe(&mut self, category: FeedbackCategory) -> Option<FeedbackCategory> {
        if self.last == Some(category) {
            return None;
        }
        self.last = Some(category);
        Some(category)
    }

    pub fn last(&self) -> Option<FeedbackCategory> {
        self.last
    }

    /// Forget the last category so the next observation is always issued.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Fill `{side}` and `{reps}` in a repetition message template.
pub fn render_rep_message(template: &str, side: &str, reps: u32) -> String {
    template
        .replace("{side}", side)
        .replace("{reps}", &reps.to_string())
}
