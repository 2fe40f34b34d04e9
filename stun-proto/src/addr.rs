
use shared::error::*;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr};

pub const IPV4_PROTOCOL: u8 = 1;
pub const IPV6_PROTOCOL: u8 = 2;

pub(crate) const IPV4_LEN: usize = 4;
pub(crate) const IPV6_LEN: usize = 16;
pub(crate) const ADDRESS_HEADER_SIZE: usize = 4;

/// pack_address encodes addr as `[0x00, protocol, port, address]` as
/// defined for MAPPED-ADDRESS in RFC 5389 Section 15.1.
pub fn pack_address(addr: &SocketAddr) -> Vec<u8> {
    let (protocol, ip) = match addr.ip() {
        IpAddr::V4(ip) => (IPV4_PROTOCOL, ip.octets().to_vec()),
        IpAddr::V6(ip) => (IPV6_PROTOCOL, ip.octets().to_vec()),
    };

    let mut b = Vec::with_capacity(ADDRESS_HEADER_SIZE + ip.len());
    b.push(0);
    b.push(protocol);
    b.extend_from_slice(&addr.port().to_be_bytes());
    b.extend_from_slice(&ip);
    b
}

/// unpack_address decodes a MAPPED-ADDRESS style value.
pub fn unpack_address(data: &[u8]) -> Result<SocketAddr> {
    if data.len() < ADDRESS_HEADER_SIZE {
        return Err(Error::ErrAddressTooShort);
    }

    let protocol = data[1];
    let port = u16::from_be_bytes([data[2], data[3]]);
    let address = &data[ADDRESS_HEADER_SIZE..];

    let ip = match protocol {
        IPV4_PROTOCOL => {
            let octets: [u8; IPV4_LEN] = address
                .try_into()
                .map_err(|_| Error::ErrAddressInvalidIpv4Length)?;
            IpAddr::V4(Ipv4Addr::from(octets))
        }
        IPV6_PROTOCOL => {
            let octets: [u8; IPV6_LEN] = address
                .try_into()
                .map_err(|_| Error::ErrAddressInvalidIpv6Length)?;
            IpAddr::V6(Ipv6Addr::from(octets))
        }
        _ => return Err(Error::ErrAddressProtocolUnsupported),
    };

    Ok(SocketAddr::new(ip, port))
}
