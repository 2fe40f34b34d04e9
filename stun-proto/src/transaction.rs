
use bytes::BytesMut;
use log::{debug, trace};
use shared::error::*;
use shared::{TaggedBytesMut, TransportContext, TransportProtocol};
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::message::*;

/// RETRY_INTERVAL is the delay before the first retransmission.
pub const RETRY_INTERVAL: Duration = Duration::from_millis(500);
/// RETRY_MAX is the total number of requests sent before giving up.
pub const RETRY_MAX: u32 = 7;
/// MAX_RETRY_DELAY bounds the backoff between two sends.
pub const MAX_RETRY_DELAY: Duration = Duration::from_secs(3600);

//              interval [msec]
// 0: 0 ms      +500
// 1: 500 ms    +1000
// 2: 1500 ms   +2000
// 3: 3500 ms   +4000
// 4: 7500 ms   +8000
// 5: 15500 ms  +16000
// 6: 31500 ms  +32000
// -: 63500 ms  failed

/// TransactionConfig is a set of config params used by Transaction::new
#[derive(Debug, Copy, Clone)]
pub struct TransactionConfig {
    pub retry_interval: Duration,
    pub retry_max: u32,
    pub transport_protocol: TransportProtocol,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        TransactionConfig {
            retry_interval: RETRY_INTERVAL,
            retry_max: RETRY_MAX,
            transport_protocol: TransportProtocol::UDP,
        }
    }
}

/// TransactionState tracks a transaction from creation to resolution.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TransactionState {
    Idle,
    /// Request sent, carrying the number of tries so far.
    Sent(u32),
    Resolved,
}

/// Event is the outcome of a transaction, reported exactly once.
#[derive(Debug)]
pub struct Event {
    pub id: TransactionId,
    pub result: Result<Message>,
}

/// Transaction drives one request through retransmission with exponential
/// backoff until a response is delivered or the retry budget runs out.
///
/// It performs no I/O: datagrams to send are drained with `poll_transmit`,
/// the next retry deadline is exposed by `poll_timeout`, and the outcome is
/// drained with `poll_event`.
pub struct Transaction {
    request: Message,
    raw: BytesMut,
    local_addr: SocketAddr,
    peer_addr: SocketAddr,
    transport_protocol: TransportProtocol,
    retry_interval: Duration,
    retry_max: u32,
    tries: u32,
    timeout_delay: Duration,
    timeout: Option<Instant>,
    state: TransactionState,
    transmits: VecDeque<TaggedBytesMut>,
    events: VecDeque<Event>,
}

impl Transaction {
    /// new creates an idle transaction sending request to peer_addr. The
    /// request is serialized once here.
    pub fn new(
        request: Message,
        local_addr: SocketAddr,
        peer_addr: SocketAddr,
        config: TransactionConfig,
    ) -> Result<Self> {
        let raw = request.encode()?;
        Ok(Transaction {
            request,
            raw,
            local_addr,
            peer_addr,
            transport_protocol: config.transport_protocol,
            retry_interval: config.retry_interval,
            retry_max: config.retry_max,
            tries: 0,
            timeout_delay: config.retry_interval,
            timeout: None,
            state: TransactionState::Idle,
            transmits: VecDeque::new(),
            events: VecDeque::new(),
        })
    }

    pub fn request(&self) -> &Message {
        &self.request
    }

    pub fn transaction_id(&self) -> TransactionId {
        self.request.transaction_id
    }

    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    pub fn state(&self) -> TransactionState {
        self.state
    }

    /// tries returns the number of requests sent so far.
    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn is_resolved(&self) -> bool {
        self.state == TransactionState::Resolved
    }

    /// start sends the request immediately and arms the retry timer.
    pub fn start(&mut self, now: Instant) -> Result<()> {
        if self.state != TransactionState::Idle {
            return Err(Error::ErrTransactionStarted);
        }
        self.retry(now);
        Ok(())
    }

    /// message_received resolves the transaction with a response routed to
    /// it by transaction id. The pending retry is cancelled. Duplicates
    /// arriving after resolution are ignored.
    pub fn message_received(&mut self, message: Message, addr: SocketAddr) {
        if self.is_resolved() {
            trace!("ignoring duplicate {message} from {addr}");
            return;
        }

        debug!("client < {message} from {addr}");
        self.resolve(Ok(message));
    }

    /// close cancels the pending retry. An unresolved transaction resolves
    /// with ErrTransactionClosed.
    pub fn close(&mut self) {
        if !self.is_resolved() {
            self.resolve(Err(Error::ErrTransactionClosed));
        }
    }

    pub fn poll_timeout(&self) -> Option<Instant> {
        self.timeout
    }

    pub fn handle_timeout(&mut self, now: Instant) {
        match self.timeout {
            Some(timeout) if timeout <= now => self.retry(now),
            _ => {}
        }
    }

    pub fn poll_transmit(&mut self) -> Option<TaggedBytesMut> {
        self.transmits.pop_front()
    }

    pub fn poll_event(&mut self) -> Option<Event> {
        self.events.pop_front()
    }

    fn retry(&mut self, now: Instant) {
        if self.tries >= self.retry_max {
            debug!("transaction {} timeout", self.request.transaction_id);
            self.resolve(Err(Error::ErrTransactionTimeOut));
            return;
        }

        if self.tries == 0 {
            debug!("client > {} to {}", self.request, self.peer_addr);
            self.timeout_delay = self.retry_interval.min(MAX_RETRY_DELAY);
        } else {
            trace!(
                "retransmitting transaction {} to {} (tries={})",
                self.request.transaction_id, self.peer_addr, self.tries
            );
            self.timeout_delay = self.timeout_delay.saturating_mul(2).min(MAX_RETRY_DELAY);
        }

        self.transmits.push_back(TaggedBytesMut {
            now,
            transport: TransportContext::new(
                self.local_addr,
                self.peer_addr,
                self.transport_protocol,
            ),
            message: self.raw.clone(),
        });

        self.timeout = Some(now + self.timeout_delay);
        self.tries += 1;
        self.state = TransactionState::Sent(self.tries);
    }

    fn resolve(&mut self, result: Result<Message>) {
        self.timeout = None;
        self.state = TransactionState::Resolved;
        self.events.push_back(Event {
            id: self.request.transaction_id,
            result,
        });
    }
}
