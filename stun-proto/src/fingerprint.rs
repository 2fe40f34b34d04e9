
use crc::{CRC_32_ISO_HDLC, Crc};
use shared::error::*;

use crate::attributes::*;
use crate::message::*;

/// FINGERPRINT_XOR is the value XOR-ed with the CRC32 of the message.
pub const FINGERPRINT_XOR: u32 = 0x5354554e;
/// FINGERPRINT_SIZE is the length of the FINGERPRINT value.
pub const FINGERPRINT_SIZE: usize = 4;

const CRC32: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// fingerprint_value returns CRC32 of b XOR-ed by FINGERPRINT_XOR.
pub fn fingerprint_value(b: &[u8]) -> u32 {
    CRC32.checksum(b) ^ FINGERPRINT_XOR
}

impl Message {
    /// add_fingerprint computes the FINGERPRINT over the message as it would
    /// be sent with one more 8-byte attribute and stores it. It must be the
    /// last attribute added.
    pub fn add_fingerprint(&mut self) -> Result<()> {
        let raw = self.encode_with_extra_length(ATTRIBUTE_HEADER_SIZE + FINGERPRINT_SIZE)?;
        let descriptor = registry()
            .by_type(ATTR_FINGERPRINT)
            .ok_or_else(|| Error::ErrUnknownAttribute(ATTR_FINGERPRINT.to_string()))?;
        self.set_attr(descriptor, AttrValue::Unsigned(fingerprint_value(&raw)));
        Ok(())
    }
}

/// check_fingerprint verifies that a received datagram ends with a valid
/// FINGERPRINT attribute. Datagrams without one are rejected.
pub fn check_fingerprint(data: &[u8]) -> bool {
    let attr_size = ATTRIBUTE_HEADER_SIZE + FINGERPRINT_SIZE;
    if data.len() < HEADER_LENGTH + attr_size {
        return false;
    }

    let (head, attr) = data.split_at(data.len() - attr_size);
    if u16::from_be_bytes([attr[0], attr[1]]) != ATTR_FINGERPRINT.0
        || u16::from_be_bytes([attr[2], attr[3]]) as usize != FINGERPRINT_SIZE
    {
        return false;
    }

    let expected = u32::from_be_bytes([attr[4], attr[5], attr[6], attr[7]]);
    fingerprint_value(head) == expected
}
