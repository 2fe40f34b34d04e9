#![warn(rust_2018_idioms)]
#![allow(dead_code)]

#[macro_use]
extern crate lazy_static;

pub mod addr;
pub mod attributes;
pub mod client;
pub mod fingerprint;
pub mod integrity;
pub mod message;
#[cfg(feature = "runtime")]
pub mod runtime;
pub mod transaction;
pub mod xoraddr;

// IANA assigned ports for "stun" protocol.
pub const DEFAULT_PORT: u16 = 3478;
pub const DEFAULT_TLS_PORT: u16 = 5349;
