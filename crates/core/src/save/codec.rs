use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use serde_json::Value;

use crate::seed::make_checksum;

use super::migrate::{migrate, sanitize};
use super::{CURRENT_SAVE_VERSION, SaveError, SaveErrorCode, SaveState};

pub const SAVE_CODE_PREFIX: &str = "MAZED";

const ALPHABET: &[u8; 62] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

static CODE_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^MAZED-([A-Za-z0-9]+)-([A-Za-z0-9]{6})$").expect("save code pattern is valid")
});

/// `MAZED-<payload>-<checksum>` where the payload is the UTF-8 JSON of a
/// [`SaveState`], each byte written as two base-62 digits.
#[derive(Clone, Copy, Debug, Default)]
pub struct SaveCodec;

impl SaveCodec {
    pub fn encode(state: &SaveState) -> String {
        let payload = SaveState { version: CURRENT_SAVE_VERSION, ..state.clone() };
        let json = serde_json::to_string(&payload).expect("SaveState serializes to JSON");
        wrap_payload(&json)
    }

    /// Validates shape, checksum, byte pairs, JSON and version, in that
    /// order, then migrates the payload to the current version.
    pub fn decode(code: &str) -> Result<SaveState, SaveError> {
        let reject = |kind: SaveErrorCode, reason: &str| {
            debug!("save code rejected ({kind}): {reason}");
            SaveError::new(kind)
        };

        let captures = CODE_SHAPE
            .captures(code.trim())
            .ok_or_else(|| reject(SaveErrorCode::InvalidFormat, "shape"))?;
        let (payload, checksum) = (&captures[1], &captures[2]);

        if make_checksum(payload) != checksum {
            return Err(reject(SaveErrorCode::ChecksumMismatch, "checksum"));
        }

        let bytes = base62_pairs_to_bytes(payload)
            .ok_or_else(|| reject(SaveErrorCode::InvalidFormat, "byte pairs"))?;
        let text =
            String::from_utf8(bytes).map_err(|_| reject(SaveErrorCode::DecodeFailed, "utf-8"))?;
        let parsed: Value =
            serde_json::from_str(&text).map_err(|_| reject(SaveErrorCode::DecodeFailed, "json"))?;
        let Value::Object(mut fields) = parsed else {
            return Err(reject(SaveErrorCode::DecodeFailed, "payload is not an object"));
        };

        let version = fields.get("version").and_then(Value::as_f64);
        let Some(version) =
            version.filter(|&version| (1.0..=f64::from(CURRENT_SAVE_VERSION)).contains(&version))
        else {
            return Err(reject(SaveErrorCode::UnsupportedVersion, "version"));
        };
        if version.fract() != 0.0 {
            return Err(reject(SaveErrorCode::DecodeFailed, "fractional version"));
        }

        migrate(&mut fields, version as u32)?;
        sanitize(&fields).ok_or_else(|| reject(SaveErrorCode::DecodeFailed, "required fields"))
    }
}

/// Frames raw payload text as a save code.
pub(crate) fn wrap_payload(json: &str) -> String {
    let encoded = bytes_to_base62_pairs(json.as_bytes());
    let checksum = make_checksum(&encoded);
    format!("{SAVE_CODE_PREFIX}-{encoded}-{checksum}")
}

fn bytes_to_base62_pairs(bytes: &[u8]) -> String {
    let mut output = String::with_capacity(bytes.len() * 2);
    for &byte in bytes {
        output.push(char::from(ALPHABET[usize::from(byte / 62)]));
        output.push(char::from(ALPHABET[usize::from(byte % 62)]));
    }
    output
}

fn base62_pairs_to_bytes(encoded: &str) -> Option<Vec<u8>> {
    let digits = encoded.as_bytes();
    if digits.len() % 2 != 0 {
        return None;
    }
    digits
        .chunks_exact(2)
        .map(|pair| {
            let high = ALPHABET.iter().position(|&symbol| symbol == pair[0])?;
            let low = ALPHABET.iter().position(|&symbol| symbol == pair[1])?;
            u8::try_from(high * 62 + low).ok()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base62_pairs_cover_the_full_byte_range() {
        let bytes: Vec<u8> = (0..=255).collect();
        let encoded = bytes_to_base62_pairs(&bytes);
        assert_eq!(&encoded[..4], "0001");
        assert_eq!(&encoded[encoded.len() - 2..], "47");
        assert_eq!(base62_pairs_to_bytes(&encoded), Some(bytes));
    }

    #[test]
    fn pairs_above_a_byte_are_rejected() {
        assert_eq!(base62_pairs_to_bytes("48"), None);
        assert_eq!(base62_pairs_to_bytes("zz"), None);
        assert_eq!(base62_pairs_to_bytes("123"), None);
        assert_eq!(base62_pairs_to_bytes("-1"), None);
    }
}
