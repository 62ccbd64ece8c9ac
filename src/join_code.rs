//! League join codes: 6-character codes drawn from a
//! 32-character alphabet that excludes visually ambiguous glyphs
//! (`0`, `1`, `I`, `O`). Persisted upper-case; lookups are
//! case-insensitive.

use rand::Rng;

const ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LENGTH: usize = 6;

/// Generates a random 6-character join code.
pub fn generate(rng: &mut impl Rng) -> String {
    (0..CODE_LENGTH)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

/// Normalizes a user-entered code to its persisted (upper-case) form.
pub fn normalize(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}
