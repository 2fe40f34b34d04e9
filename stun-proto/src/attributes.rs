#[cfg(test)]
mod attributes_test;

use shared::error::*;
use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;

use crate::addr::*;
use crate::message::TransactionId;
use crate::xoraddr::*;

/// AttrType is attribute type.
#[derive(PartialEq, Eq, Hash, Debug, Copy, Clone, Default)]
pub struct AttrType(pub u16);

impl fmt::Display for AttrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match lookup_by_type(self.0) {
            Some(descriptor) => write!(f, "{}", descriptor.name),
            None => write!(f, "0x{:04x}", self.0),
        }
    }
}

impl AttrType {
    /// required returns true if type is from comprehension-required range (0x0000-0x7FFF).
    pub fn required(&self) -> bool {
        self.0 <= 0x7FFF
    }

    /// optional returns true if type is from comprehension-optional range (0x8000-0xFFFF).
    pub fn optional(&self) -> bool {
        self.0 >= 0x8000
    }

    /// value returns uint16 representation of attribute type.
    pub fn value(&self) -> u16 {
        self.0
    }
}

// Attributes from RFC 5389.
pub const ATTR_MAPPED_ADDRESS: AttrType = AttrType(0x0001);
pub const ATTR_USERNAME: AttrType = AttrType(0x0006);
pub const ATTR_MESSAGE_INTEGRITY: AttrType = AttrType(0x0008);
pub const ATTR_REALM: AttrType = AttrType(0x0014);
pub const ATTR_NONCE: AttrType = AttrType(0x0015);
pub const ATTR_XORMAPPED_ADDRESS: AttrType = AttrType(0x0020);
pub const ATTR_SOFTWARE: AttrType = AttrType(0x8022);
pub const ATTR_FINGERPRINT: AttrType = AttrType(0x8028);

// Attributes from RFC 3489, kept for classic NAT behavior discovery.
pub const ATTR_CHANGE_REQUEST: AttrType = AttrType(0x0003);
pub const ATTR_SOURCE_ADDRESS: AttrType = AttrType(0x0004);
pub const ATTR_CHANGED_ADDRESS: AttrType = AttrType(0x0005);

// Attributes from RFC 5780.
pub const ATTR_RESPONSE_ORIGIN: AttrType = AttrType(0x802b);
pub const ATTR_OTHER_ADDRESS: AttrType = AttrType(0x802c);

// Attributes from RFC 5766 TURN.
pub const ATTR_XOR_PEER_ADDRESS: AttrType = AttrType(0x0012);
pub const ATTR_XOR_RELAYED_ADDRESS: AttrType = AttrType(0x0016);

// Attributes from RFC 5245 ICE.
pub const ATTR_PRIORITY: AttrType = AttrType(0x0024);
pub const ATTR_USE_CANDIDATE: AttrType = AttrType(0x0025);
pub const ATTR_ICE_CONTROLLED: AttrType = AttrType(0x8029);
pub const ATTR_ICE_CONTROLLING: AttrType = AttrType(0x802a);

/// AttrValue is a decoded attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Address(SocketAddr),
    Unsigned(u32),
    Text(String),
    Bytes(Vec<u8>),
    Empty,
}

impl AttrValue {
    pub fn as_address(&self) -> Option<SocketAddr> {
        match self {
            AttrValue::Address(addr) => Some(*addr),
            _ => None,
        }
    }

    pub fn as_unsigned(&self) -> Option<u32> {
        match self {
            AttrValue::Unsigned(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            AttrValue::Bytes(b) => Some(b),
            _ => None,
        }
    }
}

impl From<SocketAddr> for AttrValue {
    fn from(addr: SocketAddr) -> Self {
        AttrValue::Address(addr)
    }
}

impl From<u32> for AttrValue {
    fn from(v: u32) -> Self {
        AttrValue::Unsigned(v)
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Text(s.to_owned())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Text(s)
    }
}

impl From<Vec<u8>> for AttrValue {
    fn from(b: Vec<u8>) -> Self {
        AttrValue::Bytes(b)
    }
}

impl From<&[u8]> for AttrValue {
    fn from(b: &[u8]) -> Self {
        AttrValue::Bytes(b.to_vec())
    }
}

/// AttrCodec selects how an attribute value is packed to and unpacked from
/// its wire representation.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AttrCodec {
    Address,
    XorAddress,
    Unsigned,
    Text,
    Bytes,
    Empty,
}

impl AttrCodec {
    /// encode packs value. XOR addresses are obfuscated with transaction_id.
    pub fn encode(&self, value: &AttrValue, transaction_id: &TransactionId) -> Result<Vec<u8>> {
        match (self, value) {
            (AttrCodec::Address, AttrValue::Address(addr)) => Ok(pack_address(addr)),
            (AttrCodec::XorAddress, AttrValue::Address(addr)) => {
                Ok(pack_xor_address(addr, transaction_id))
            }
            (AttrCodec::Address | AttrCodec::XorAddress, _) => {
                Err(Error::ErrUnsupportedAddressFamily)
            }
            (AttrCodec::Unsigned, AttrValue::Unsigned(v)) => Ok(v.to_be_bytes().to_vec()),
            (AttrCodec::Text, AttrValue::Text(s)) => Ok(s.as_bytes().to_vec()),
            (AttrCodec::Bytes, AttrValue::Bytes(b)) => Ok(b.clone()),
            (AttrCodec::Empty, AttrValue::Empty) => Ok(vec![]),
            _ => Err(Error::ErrAttributeValueMismatch),
        }
    }

    /// decode unpacks data. XOR addresses are recovered with transaction_id.
    pub fn decode(&self, data: &[u8], transaction_id: &TransactionId) -> Result<AttrValue> {
        Ok(match self {
            AttrCodec::Address => AttrValue::Address(unpack_address(data)?),
            AttrCodec::XorAddress => {
                AttrValue::Address(unpack_xor_address(data, transaction_id)?)
            }
            AttrCodec::Unsigned => {
                let b: [u8; 4] = data.try_into().map_err(|_| Error::ErrAttributeSizeInvalid)?;
                AttrValue::Unsigned(u32::from_be_bytes(b))
            }
            AttrCodec::Text => AttrValue::Text(String::from_utf8(data.to_vec())?),
            AttrCodec::Bytes => AttrValue::Bytes(data.to_vec()),
            AttrCodec::Empty => AttrValue::Empty,
        })
    }
}

/// AttributeDescriptor binds an attribute type code to its name and codec.
#[derive(Debug, PartialEq, Eq)]
pub struct AttributeDescriptor {
    pub typ: AttrType,
    pub name: &'static str,
    pub codec: AttrCodec,
}

const fn descriptor(typ: AttrType, name: &'static str, codec: AttrCodec) -> AttributeDescriptor {
    AttributeDescriptor { typ, name, codec }
}

/// ATTRIBUTES is the fixed table of attributes understood by the codec.
pub static ATTRIBUTES: &[AttributeDescriptor] = &[
    descriptor(ATTR_MAPPED_ADDRESS, "MAPPED-ADDRESS", AttrCodec::Address),
    descriptor(ATTR_CHANGE_REQUEST, "CHANGE-REQUEST", AttrCodec::Unsigned),
    descriptor(ATTR_SOURCE_ADDRESS, "SOURCE-ADDRESS", AttrCodec::Address),
    descriptor(ATTR_CHANGED_ADDRESS, "CHANGED-ADDRESS", AttrCodec::Address),
    descriptor(ATTR_USERNAME, "USERNAME", AttrCodec::Text),
    descriptor(ATTR_MESSAGE_INTEGRITY, "MESSAGE-INTEGRITY", AttrCodec::Bytes),
    descriptor(ATTR_XOR_PEER_ADDRESS, "XOR-PEER-ADDRESS", AttrCodec::XorAddress),
    descriptor(ATTR_REALM, "REALM", AttrCodec::Text),
    descriptor(ATTR_NONCE, "NONCE", AttrCodec::Bytes),
    descriptor(ATTR_XOR_RELAYED_ADDRESS, "XOR-RELAYED-ADDRESS", AttrCodec::XorAddress),
    descriptor(ATTR_XORMAPPED_ADDRESS, "XOR-MAPPED-ADDRESS", AttrCodec::XorAddress),
    descriptor(ATTR_PRIORITY, "PRIORITY", AttrCodec::Unsigned),
    descriptor(ATTR_USE_CANDIDATE, "USE-CANDIDATE", AttrCodec::Empty),
    descriptor(ATTR_SOFTWARE, "SOFTWARE", AttrCodec::Text),
    descriptor(ATTR_FINGERPRINT, "FINGERPRINT", AttrCodec::Unsigned),
    descriptor(ATTR_ICE_CONTROLLED, "ICE-CONTROLLED", AttrCodec::Bytes),
    descriptor(ATTR_ICE_CONTROLLING, "ICE-CONTROLLING", AttrCodec::Bytes),
    descriptor(ATTR_RESPONSE_ORIGIN, "RESPONSE-ORIGIN", AttrCodec::Address),
    descriptor(ATTR_OTHER_ADDRESS, "OTHER-ADDRESS", AttrCodec::Address),
];

/// AttributeRegistry indexes a descriptor table by type code and by name.
/// It is immutable once built.
#[derive(Debug)]
pub struct AttributeRegistry {
    by_type: HashMap<AttrType, &'static AttributeDescriptor>,
    by_name: HashMap<&'static str, &'static AttributeDescriptor>,
}

impl AttributeRegistry {
    /// new builds both indices, failing if a type code or a name appears twice.
    pub fn new(table: &'static [AttributeDescriptor]) -> Result<Self> {
        let mut by_type = HashMap::with_capacity(table.len());
        let mut by_name = HashMap::with_capacity(table.len());
        for descriptor in table {
            if by_type.insert(descriptor.typ, descriptor).is_some() {
                return Err(Error::ErrDuplicateAttributeType(descriptor.typ.0));
            }
            if by_name.insert(descriptor.name, descriptor).is_some() {
                return Err(Error::ErrDuplicateAttributeName(descriptor.name.to_owned()));
            }
        }
        Ok(AttributeRegistry { by_type, by_name })
    }

    pub fn by_type(&self, typ: AttrType) -> Option<&'static AttributeDescriptor> {
        self.by_type.get(&typ).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&'static AttributeDescriptor> {
        self.by_name.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.by_type.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_type.is_empty()
    }
}

lazy_static! {
    static ref REGISTRY: AttributeRegistry = match AttributeRegistry::new(ATTRIBUTES) {
        Ok(registry) => registry,
        Err(err) => panic!("invalid STUN attribute table: {err}"),
    };
}

/// registry returns the process-wide attribute registry.
pub fn registry() -> &'static AttributeRegistry {
    &REGISTRY
}

/// lookup_by_type returns the descriptor for a type code, or None when the
/// code is not understood.
pub fn lookup_by_type(code: u16) -> Option<&'static AttributeDescriptor> {
    REGISTRY.by_type(AttrType(code))
}

/// lookup_by_name returns the descriptor registered under name.
pub fn lookup_by_name(name: &str) -> Option<&'static AttributeDescriptor> {
    REGISTRY.by_name(name)
}
