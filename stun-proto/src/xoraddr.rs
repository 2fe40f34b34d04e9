
use shared::error::*;
use std::net::SocketAddr;

use crate::addr::*;
use crate::message::{COOKIE, TransactionId};

/// xor_pad is the keystream applied from byte 2 onwards of an address value:
/// the upper half of the magic cookie for the port, then the whole cookie and
/// the transaction id for the address bytes.
fn xor_pad(transaction_id: &TransactionId) -> [u8; 18] {
    let mut pad = [0u8; 18];
    pad[0..2].copy_from_slice(&((COOKIE >> 16) as u16).to_be_bytes());
    pad[2..6].copy_from_slice(&COOKIE.to_be_bytes());
    pad[6..].copy_from_slice(&transaction_id.0);
    pad
}

/// xor_address obfuscates (or recovers) a packed address. The reserved and
/// protocol bytes are left untouched. Applying it twice with the same
/// transaction id yields the original bytes.
pub fn xor_address(data: &[u8], transaction_id: &TransactionId) -> Vec<u8> {
    let pad = xor_pad(transaction_id);
    let mut xdata = data.to_vec();
    for (b, p) in xdata.iter_mut().skip(2).zip(pad.iter()) {
        *b ^= p;
    }
    xdata
}

/// pack_xor_address encodes addr as XOR-MAPPED-ADDRESS.
pub fn pack_xor_address(addr: &SocketAddr, transaction_id: &TransactionId) -> Vec<u8> {
    xor_address(&pack_address(addr), transaction_id)
}

/// unpack_xor_address decodes a XOR-MAPPED-ADDRESS style value.
pub fn unpack_xor_address(data: &[u8], transaction_id: &TransactionId) -> Result<SocketAddr> {
    unpack_address(&xor_address(data, transaction_id))
}
