#![allow(dead_code)]

use std::io;
use std::string::FromUtf8Error;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    // Message framing errors
    #[error("stun: message length is less than 20 bytes")]
    ErrMessageTooShort,
    #[error("stun: message length does not match")]
    ErrMessageLengthMismatch,
    #[error("stun: attribute value is truncated")]
    ErrAttributeTruncated,
    #[error("stun: attribute size is invalid")]
    ErrAttributeSizeInvalid,
    #[error("stun: attribute size overflow")]
    ErrAttributeSizeOverflow,

    // Address codec errors
    #[error("stun: address length is less than 4 bytes")]
    ErrAddressTooShort,
    #[error("stun: address protocol is unsupported")]
    ErrAddressProtocolUnsupported,
    #[error("stun: address has invalid length for IPv4")]
    ErrAddressInvalidIpv4Length,
    #[error("stun: address has invalid length for IPv6")]
    ErrAddressInvalidIpv6Length,
    #[error("value must be an IPv4 or IPv6 socket address")]
    ErrUnsupportedAddressFamily,

    // Attribute registry errors
    #[error("attribute {0} is unknown")]
    ErrUnknownAttribute(String),
    #[error("attribute value does not match its codec")]
    ErrAttributeValueMismatch,
    #[error("duplicate attribute type 0x{0:04x} in registry")]
    ErrDuplicateAttributeType(u16),
    #[error("duplicate attribute name {0} in registry")]
    ErrDuplicateAttributeName(String),

    // Transaction errors
    #[error("transaction is timed out")]
    ErrTransactionTimeOut,
    #[error("transaction is closed")]
    ErrTransactionClosed,
    #[error("transaction is already started")]
    ErrTransactionStarted,
    #[error("transaction exists with same id")]
    ErrTransactionExists,
    #[error("client is closed")]
    ErrClientClosed,

    #[error("failed to parse address")]
    ErrAddressParseFailed,

    #[error("{0}")]
    Io(#[source] IoError),
    #[error("utf-8 error: {0}")]
    Utf8(#[from] FromUtf8Error),
}

impl Error {
    /// is_malformed reports whether the error was raised while decoding bytes
    /// received from the wire.
    pub fn is_malformed(&self) -> bool {
        matches!(
            self,
            Error::ErrMessageTooShort
                | Error::ErrMessageLengthMismatch
                | Error::ErrAttributeTruncated
                | Error::ErrAttributeSizeInvalid
                | Error::ErrAddressTooShort
                | Error::ErrAddressProtocolUnsupported
                | Error::ErrAddressInvalidIpv4Length
                | Error::ErrAddressInvalidIpv6Length
                | Error::Utf8(_)
        )
    }
}

#[derive(Debug, Error)]
#[error("io error: {0}")]
pub struct IoError(#[from] pub io::Error);

// Workaround for wanting PartialEq for io::Error.
impl PartialEq for IoError {
    fn eq(&self, other: &Self) -> bool {
        self.0.kind() == other.0.kind()
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(IoError(e))
    }
}
