use crate::error::{Error, Result};
use std::net::{SocketAddr, ToSocketAddrs};

/// Magic cookie carried by every RFC 5389 message at bytes 4..8.
const MAGIC_COOKIE: [u8; 4] = [0x21, 0x12, 0xa4, 0x42];

// match_range is a MatchFunc that accepts packets with the first byte in [lower..upper]
fn match_range(lower: u8, upper: u8) -> impl Fn(&[u8]) -> bool {
    move |buf: &[u8]| -> bool {
        if buf.is_empty() {
            return false;
        }
        let b = buf[0];
        b >= lower && b <= upper
    }
}

/// match_stun is a MatchFunc that accepts packets with the first byte in [0..3]
/// as defined in RFC7983 and the magic cookie in place.
/// <https://tools.ietf.org/html/rfc7983>
pub fn match_stun(buf: &[u8]) -> bool {
    match_range(0, 3)(buf) && buf.len() >= 8 && buf[4..8] == MAGIC_COOKIE
}

/// lookup host to SocketAddr
pub fn lookup_host<T>(use_ipv4: bool, host: T) -> Result<SocketAddr>
where
    T: ToSocketAddrs,
{
    for remote_addr in host.to_socket_addrs()? {
        if (use_ipv4 && remote_addr.is_ipv4()) || (!use_ipv4 && remote_addr.is_ipv6()) {
            return Ok(remote_addr);
        }
    }

    Err(Error::ErrAddressParseFailed)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_match_stun() {
        let binding = [
            0x00, 0x01, 0x00, 0x00, 0x21, 0x12, 0xa4, 0x42, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12,
        ];
        assert!(match_stun(&binding));
        assert!(!match_stun(&[]));
        assert!(!match_stun(&binding[..6]));

        let mut rtp = binding;
        rtp[0] = 0x80;
        assert!(!match_stun(&rtp), "first byte outside [0..3]");

        let mut no_cookie = binding;
        no_cookie[5] = 0x13;
        assert!(!match_stun(&no_cookie), "cookie mismatch");
    }

    #[test]
    fn test_lookup_host() -> Result<()> {
        let addr = lookup_host(true, "127.0.0.1:3478")?;
        assert_eq!(addr, "127.0.0.1:3478".parse::<SocketAddr>().unwrap());

        let result = lookup_host(false, "127.0.0.1:3478");
        assert_eq!(result, Err(Error::ErrAddressParseFailed));
        Ok(())
    }
}
