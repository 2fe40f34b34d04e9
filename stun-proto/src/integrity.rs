
use md5::{Digest, Md5};
use ring::hmac;
use shared::error::*;

use crate::attributes::*;
use crate::message::*;

/// MESSAGE_INTEGRITY_SIZE is the length of the HMAC-SHA1 digest.
pub const MESSAGE_INTEGRITY_SIZE: usize = 20;

/// message_integrity returns HMAC-SHA1 of b keyed by key.
pub fn message_integrity(key: &[u8], b: &[u8]) -> Vec<u8> {
    let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key);
    hmac::sign(&key, b).as_ref().to_vec()
}

/// long_term_key derives the key of the long-term credential mechanism,
/// MD5(username ":" realm ":" password), RFC 5389 Section 15.4.
pub fn long_term_key(username: &str, realm: &str, password: &str) -> Vec<u8> {
    let mut h = Md5::new();
    h.update(format!("{username}:{realm}:{password}").as_bytes());
    h.finalize().to_vec()
}

impl Message {
    /// add_message_integrity computes HMAC-SHA1 over the message as it would
    /// be sent with one more 24-byte attribute and stores the digest. When a
    /// FINGERPRINT is also wanted it has to be added afterwards.
    pub fn add_message_integrity(&mut self, key: &[u8]) -> Result<()> {
        let raw = self.encode_with_extra_length(ATTRIBUTE_HEADER_SIZE + MESSAGE_INTEGRITY_SIZE)?;
        let descriptor = registry()
            .by_type(ATTR_MESSAGE_INTEGRITY)
            .ok_or_else(|| Error::ErrUnknownAttribute(ATTR_MESSAGE_INTEGRITY.to_string()))?;
        self.set_attr(descriptor, AttrValue::Bytes(message_integrity(key, &raw)));
        Ok(())
    }
}

/// check_message_integrity verifies the MESSAGE-INTEGRITY attribute of a
/// received datagram. Attributes following it (FINGERPRINT) are excluded
/// from the digest and the length field is adjusted accordingly. Returns
/// false if the attribute is absent.
pub fn check_message_integrity(data: &[u8], key: &[u8]) -> Result<bool> {
    // Validates the framing before walking attributes.
    Message::decode(data)?;

    let mut pos = HEADER_LENGTH;
    while pos + ATTRIBUTE_HEADER_SIZE <= data.len() {
        let attr_type = u16::from_be_bytes([data[pos], data[pos + 1]]);
        let attr_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        let start = pos + ATTRIBUTE_HEADER_SIZE;
        let end = start + attr_len;

        if attr_type == ATTR_MESSAGE_INTEGRITY.0 {
            if attr_len != MESSAGE_INTEGRITY_SIZE {
                return Err(Error::ErrAttributeSizeInvalid);
            }
            let mut head = data[..pos].to_vec();
            let length = (end - HEADER_LENGTH) as u16;
            head[2..4].copy_from_slice(&length.to_be_bytes());

            let key = hmac::Key::new(hmac::HMAC_SHA1_FOR_LEGACY_USE_ONLY, key);
            return Ok(hmac::verify(&key, &head, &data[start..end]).is_ok());
        }

        pos = end + padding(attr_len);
    }

    Ok(false)
}
