
use bytes::{BufMut, BytesMut};
use log::trace;
use rand::Rng;
use shared::error::*;
use std::fmt;

use crate::attributes::*;

/// COOKIE is the fixed magic cookie value of RFC 5389.
pub const COOKIE: u32 = 0x2112a442;
/// HEADER_LENGTH is the size of the message header in bytes.
pub const HEADER_LENGTH: usize = 20;
/// TRANSACTION_ID_SIZE is the length of a transaction id in bytes.
pub const TRANSACTION_ID_SIZE: usize = 12;
/// ATTRIBUTE_HEADER_SIZE is the size of an attribute type and length pair.
pub const ATTRIBUTE_HEADER_SIZE: usize = 4;

const METHOD_MASK: u16 = 0x3eef;
// Only the upper class bit is recovered on decode.
const CLASS_MASK: u16 = 0x0100;

/// padding returns the number of zero bytes that align an attribute value of
/// length l to a 4-byte boundary.
pub(crate) fn padding(l: usize) -> usize {
    (4 - l % 4) % 4
}

/// TransactionId is a 12-byte value correlating a request to its response.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Default, Debug)]
pub struct TransactionId(pub [u8; TRANSACTION_ID_SIZE]);

impl TransactionId {
    /// new returns new random transaction ID using crypto-safe random numbers.
    pub fn new() -> Self {
        let mut b = TransactionId([0u8; TRANSACTION_ID_SIZE]);
        rand::rng().fill(&mut b.0);
        b
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in &self.0 {
            write!(f, "{b:02x}")?;
        }
        Ok(())
    }
}

/// Method is the 12-bit method field of the message type.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub struct Method(pub u16);

pub const METHOD_BINDING: Method = Method(0x001);

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            METHOD_BINDING => write!(f, "BINDING"),
            Method(v) => write!(f, "0x{v:x}"),
        }
    }
}

/// MessageClass is the class bits of the message type.
#[derive(Default, PartialEq, Eq, Debug, Copy, Clone, Hash)]
pub struct MessageClass(pub u16);

pub const CLASS_REQUEST: MessageClass = MessageClass(0x000);
pub const CLASS_INDICATION: MessageClass = MessageClass(0x010);
pub const CLASS_RESPONSE: MessageClass = MessageClass(0x100);
pub const CLASS_ERROR: MessageClass = MessageClass(0x110);

impl fmt::Display for MessageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match *self {
            CLASS_REQUEST => "REQUEST",
            CLASS_INDICATION => "INDICATION",
            CLASS_RESPONSE => "RESPONSE",
            CLASS_ERROR => "ERROR",
            _ => "UNKNOWN",
        };
        write!(f, "{s}")
    }
}

/// Message represents a single STUN packet. Attributes keep their insertion
/// order, which is also their order on the wire.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub method: Method,
    pub class: MessageClass,
    pub transaction_id: TransactionId,
    attributes: Vec<(&'static AttributeDescriptor, AttrValue)>,
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message(message_method={}, message_class={}, transaction_id={})",
            self.method, self.class, self.transaction_id
        )
    }
}

impl Message {
    pub fn new(method: Method, class: MessageClass, transaction_id: TransactionId) -> Self {
        Message {
            method,
            class,
            transaction_id,
            attributes: vec![],
        }
    }

    /// typ returns the 16-bit message type field.
    pub fn typ(&self) -> u16 {
        self.method.0 | self.class.0
    }

    /// set stores value under the attribute called name. An attribute that is
    /// already present keeps its position and gets the new value.
    pub fn set(&mut self, name: &str, value: impl Into<AttrValue>) -> Result<()> {
        let descriptor =
            lookup_by_name(name).ok_or_else(|| Error::ErrUnknownAttribute(name.to_owned()))?;
        self.set_attr(descriptor, value.into());
        Ok(())
    }

    pub(crate) fn set_attr(&mut self, descriptor: &'static AttributeDescriptor, value: AttrValue) {
        match self
            .attributes
            .iter_mut()
            .find(|(d, _)| d.typ == descriptor.typ)
        {
            Some((_, v)) => *v = value,
            None => self.attributes.push((descriptor, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|(d, _)| d.name == name)
            .map(|(_, v)| v)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        let pos = self.attributes.iter().position(|(d, _)| d.name == name)?;
        Some(self.attributes.remove(pos).1)
    }

    /// attributes iterates (name, value) pairs in wire order.
    pub fn attributes(&self) -> impl Iterator<Item = (&'static str, &AttrValue)> + '_ {
        self.attributes.iter().map(|(d, v)| (d.name, v))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// encode serializes the header followed by every attribute in insertion
    /// order, each padded to a 4-byte boundary.
    pub fn encode(&self) -> Result<BytesMut> {
        let mut attrs = BytesMut::new();
        for (descriptor, value) in &self.attributes {
            let v = descriptor.codec.encode(value, &self.transaction_id)?;
            let attr_len = u16::try_from(v.len()).map_err(|_| Error::ErrAttributeSizeOverflow)?;
            attrs.put_u16(descriptor.typ.0);
            attrs.put_u16(attr_len);
            attrs.put_slice(&v);
            attrs.put_bytes(0, padding(v.len()));
        }

        let length = u16::try_from(attrs.len()).map_err(|_| Error::ErrAttributeSizeOverflow)?;
        let mut raw = BytesMut::with_capacity(HEADER_LENGTH + attrs.len());
        raw.put_u16(self.typ());
        raw.put_u16(length);
        raw.put_u32(COOKIE);
        raw.put_slice(&self.transaction_id.0);
        raw.put_slice(&attrs);
        Ok(raw)
    }

    /// encode_with_extra_length serializes the message and rewrites the
    /// length field as if extra more attribute bytes followed. The attributes
    /// themselves are not serialized again.
    pub(crate) fn encode_with_extra_length(&self, extra: usize) -> Result<BytesMut> {
        let mut raw = self.encode()?;
        let length = u16::try_from(raw.len() - HEADER_LENGTH + extra)
            .map_err(|_| Error::ErrAttributeSizeOverflow)?;
        raw[2..4].copy_from_slice(&length.to_be_bytes());
        Ok(raw)
    }

    /// decode parses a message from data. Attributes with type codes that are
    /// not registered are skipped.
    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() < HEADER_LENGTH {
            return Err(Error::ErrMessageTooShort);
        }

        let message_type = u16::from_be_bytes([data[0], data[1]]);
        let length = u16::from_be_bytes([data[2], data[3]]) as usize;
        if data.len() != HEADER_LENGTH + length {
            return Err(Error::ErrMessageLengthMismatch);
        }

        let mut transaction_id = TransactionId::default();
        transaction_id.0.copy_from_slice(&data[8..HEADER_LENGTH]);

        let mut m = Message::new(
            Method(message_type & METHOD_MASK),
            MessageClass(message_type & CLASS_MASK),
            transaction_id,
        );

        let mut pos = HEADER_LENGTH;
        while pos + ATTRIBUTE_HEADER_SIZE <= data.len() {
            let attr_type = u16::from_be_bytes([data[pos], data[pos + 1]]);
            let attr_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
            let start = pos + ATTRIBUTE_HEADER_SIZE;
            let end = start + attr_len;
            if end > data.len() {
                return Err(Error::ErrAttributeTruncated);
            }

            if let Some(descriptor) = lookup_by_type(attr_type) {
                let value = descriptor
                    .codec
                    .decode(&data[start..end], &m.transaction_id)?;
                m.set_attr(descriptor, value);
            } else {
                trace!("skipping unknown attribute 0x{attr_type:04x} ({attr_len} bytes)");
            }

            pos = end + padding(attr_len);
        }

        Ok(m)
    }
}

/// parse_message decodes a STUN message from a datagram.
pub fn parse_message(data: &[u8]) -> Result<Message> {
    Message::decode(data)
}
