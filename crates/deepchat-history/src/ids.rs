//! Conversation ID generation.

use rand::RngCore;
use rand::rngs::OsRng;

/// Number of random bytes in a generated conversation ID.
pub const CHAT_ID_BYTES: usize = 8;

/// Generate a fresh conversation ID: 8 bytes from the OS CSPRNG as 16 lowercase hex chars.
pub fn generate_chat_id() -> String {
    let mut bytes = [0u8; CHAT_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}
