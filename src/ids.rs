use rand::{thread_rng, Rng};

/// Number of random bytes in an identifier.
const ID_BYTES: usize = 12;

/// Generate a new document identifier: 24 lowercase hex characters.
#[must_use]
pub fn generate_id() -> String {
    let bytes: [u8; ID_BYTES] = thread_rng().gen();
    hex::encode(bytes)
}

/// Check whether a raw path segment has the shape of a document identifier.
///
/// Anything else can never resolve to a stored document.
#[must_use]
pub fn is_valid_id(raw: &str) -> bool {
    raw.len() == ID_BYTES * 2
        && raw
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}
