#![no_main]
use libfuzzer_sys::fuzz_target;

use stun_proto::message::Message;

fuzz_target!(|data: &[u8]| {
    if let Ok(m) = Message::decode(data) {
        let _ = m.encode();
    }
});
