//! Hash key derivation for business keys.
//!
//! A hash key is the lower-case hex digest of the business key's text form. Composite
//! business keys join their parts with [`COMPOSITE_KEY_DELIMITER`] before hashing, so
//! `("A", "BC")` and `("AB", "C")` never produce the same key.

use aws_lc_rs::digest;
use config::shared::HashAlgorithm;

use crate::bail;
use crate::error::{ErrorKind, VaultResult};
use crate::types::Cell;

/// Delimiter placed between the parts of a composite business key.
pub const COMPOSITE_KEY_DELIMITER: &str = "||";

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Computes the hash key for the given business key values.
///
/// Fails with [`ErrorKind::InvalidData`] when the key is empty or any part is null, since a
/// null business key has no identity to hash.
pub fn hash_business_key(algorithm: HashAlgorithm, values: &[&Cell]) -> VaultResult<String> {
    if values.is_empty() {
        bail!(
            ErrorKind::InvalidData,
            "Business key has no columns to hash"
        );
    }

    let mut parts = Vec::with_capacity(values.len());
    for (position, value) in values.iter().enumerate() {
        let Some(text) = value.to_text() else {
            bail!(
                ErrorKind::InvalidData,
                "Business key contains a null value",
                format!("part {position} of the business key is null")
            );
        };
        parts.push(text);
    }

    Ok(hash_text(algorithm, &parts.join(COMPOSITE_KEY_DELIMITER)))
}

/// Hex digest of `text` with the given algorithm.
pub fn hash_text(algorithm: HashAlgorithm, text: &str) -> String {
    let algorithm = match algorithm {
        HashAlgorithm::Sha1 => &digest::SHA1_FOR_LEGACY_USE_ONLY,
        HashAlgorithm::Sha256 => &digest::SHA256,
    };

    encode_hex(digest::digest(algorithm, text.as_bytes()).as_ref())
}

/// Encodes bytes as lower-case hexadecimal.
pub fn encode_hex(bytes: &[u8]) -> String {
    let mut encoded = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        encoded.push(HEX_DIGITS[(byte >> 4) as usize] as char);
        encoded.push(HEX_DIGITS[(byte & 0x0f) as usize] as char);
    }

    encoded
}
