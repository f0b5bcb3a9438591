//! Cosmetic conversation colors.
//!
//! Every conversation gets a palette color at creation time.  The color has
//! no behavioral meaning; it only tints the conversation in the UI.

use rand::seq::SliceRandom;

/// Palette a new conversation's color is drawn from.
pub const CONVERSATION_PALETTE: &[&str] = &[
    "#F44336", "#E91E63", "#9C27B0", "#673AB7", "#3F51B5", "#2196F3",
    "#03A9F4", "#00BCD4", "#009688", "#4CAF50", "#FF9800", "#795548",
];

/// Pick a random palette color for a newly created conversation.
pub fn pick_conversation_color() -> String {
    let mut rng = rand::thread_rng();
    CONVERSATION_PALETTE
        .choose(&mut rng)
        .copied()
        .unwrap_or("#2196F3")
        .to_string()
}
