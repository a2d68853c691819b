//! Avatar asset assignment.
//!
//! Sprite selection is a deterministic lookup; only the facing direction is
//! randomized. The two concerns stay separate so tests can pin the randomness
//! and assert the deterministic half.

use rand::Rng;

/// Known identifier/name tokens mapped to sprite keys, matched
/// case-insensitively against both the external id and the extracted name.
const SPRITES: &[(&str, &str)] = &[
    ("alex", "alex"),
    ("kevin", "kevin"),
    ("lena", "lena"),
    ("n8n-bot", "n8n_bot"),
    ("n8nbot", "n8n_bot"),
    ("writer", "writer"),
    ("寫文專家", "writer"),
    ("main", "kevin"),
    ("secguard", "kevin"),
];

const DEFAULT_SPRITE: &str = "kevin";

const ORIENTATIONS: [&str; 4] = ["ne", "nw", "se", "sw"];

/// Deterministic sprite lookup. The external id is tried first, then the
/// display name; unknown agents share the default sprite.
pub fn sprite_for(external_id: &str, name: &str) -> &'static str {
    let id = external_id.to_lowercase();
    let name = name.to_lowercase();
    SPRITES
        .iter()
        .find(|(token, _)| *token == id)
        .or_else(|| SPRITES.iter().find(|(token, _)| *token == name))
        .map(|(_, sprite)| *sprite)
        .unwrap_or(DEFAULT_SPRITE)
}

/// Compose the asset reference with an orientation drawn from `rng`.
///
/// Orientation is re-rolled on every call, so re-scanning an unchanged
/// workspace may change its avatar. Accepted cosmetic non-determinism.
pub fn assign_avatar_with<R: Rng>(external_id: &str, name: &str, rng: &mut R) -> String {
    let sprite = sprite_for(external_id, name);
    let orientation = ORIENTATIONS[rng.random_range(0..ORIENTATIONS.len())];
    format!("/assets/agents/{sprite}_{orientation}.png")
}

/// [`assign_avatar_with`] using the thread-local generator.
pub fn assign_avatar(external_id: &str, name: &str) -> String {
    assign_avatar_with(external_id, name, &mut rand::rng())
}
