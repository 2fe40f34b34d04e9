#[cfg(test)]
mod client_test;

use log::{debug, warn};
use shared::error::*;
use shared::util::match_stun;
use shared::{TaggedBytesMut, TransportProtocol};
use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use crate::message::*;
use crate::transaction::*;

#[derive(Default)]
pub struct ClientBuilder {
    config: TransactionConfig,
}

impl ClientBuilder {
    pub fn new() -> Self {
        ClientBuilder {
            config: TransactionConfig::default(),
        }
    }

    /// with_retry_interval sets the delay before the first retransmission.
    pub fn with_retry_interval(mut self, retry_interval: Duration) -> Self {
        self.config.retry_interval = retry_interval;
        self
    }

    /// with_retry_max sets how many requests are sent before a transaction
    /// times out.
    pub fn with_retry_max(mut self, retry_max: u32) -> Self {
        self.config.retry_max = retry_max;
        self
    }

    pub fn with_transport_protocol(mut self, transport_protocol: TransportProtocol) -> Self {
        self.config.transport_protocol = transport_protocol;
        self
    }

    pub fn build(self, local: SocketAddr, remote: SocketAddr) -> Result<Client> {
        Ok(Client::new(local, remote, self.config))
    }
}

/// Client runs transactions against one STUN server and routes inbound
/// messages to them by transaction id.
pub struct Client {
    local: SocketAddr,
    remote: SocketAddr,
    config: TransactionConfig,
    transactions: HashMap<TransactionId, Transaction>,
    reads: VecDeque<Message>,
    transmits: VecDeque<TaggedBytesMut>,
    events: VecDeque<Event>,
    closed: bool,
}

impl Client {
    fn new(local: SocketAddr, remote: SocketAddr, config: TransactionConfig) -> Self {
        Self {
            local,
            remote,
            config,
            transactions: HashMap::new(),
            reads: VecDeque::new(),
            transmits: VecDeque::new(),
            events: VecDeque::new(),
            closed: false,
        }
    }

    /// pending returns the number of transactions still in flight.
    pub fn pending(&self) -> usize {
        self.transactions.len()
    }

    fn collect(&mut self, id: TransactionId) {
        let resolved = self
            .transactions
            .get(&id)
            .is_some_and(Transaction::is_resolved);
        if !resolved {
            return;
        }
        if let Some(mut tr) = self.transactions.remove(&id) {
            self.drain(&mut tr);
        }
    }

    fn drain(&mut self, tr: &mut Transaction) {
        while let Some(transmit) = tr.poll_transmit() {
            self.transmits.push_back(transmit);
        }
        while let Some(event) = tr.poll_event() {
            self.events.push_back(event);
        }
    }
}

impl sansio::Protocol<TaggedBytesMut, Message, ()> for Client {
    /// Messages that match no transaction in flight, e.g. requests from
    /// the peer or late responses.
    type Rout = Message;
    type Wout = TaggedBytesMut;
    type Eout = Event;
    type Error = Error;
    type Time = Instant;

    fn handle_read(&mut self, msg: TaggedBytesMut) -> Result<()> {
        if !match_stun(&msg.message) {
            warn!("dropping non-STUN datagram from {}", msg.transport.peer_addr);
            return Ok(());
        }

        let message = Message::decode(&msg.message)?;
        let id = message.transaction_id;
        match self.transactions.get_mut(&id) {
            Some(tr) => {
                tr.message_received(message, msg.transport.peer_addr);
                self.collect(id);
            }
            None => {
                debug!(
                    "no transaction for {} from {}",
                    message, msg.transport.peer_addr
                );
                self.reads.push_back(message);
            }
        }
        Ok(())
    }

    fn poll_read(&mut self) -> Option<Self::Rout> {
        self.reads.pop_front()
    }

    fn handle_write(&mut self, m: Message) -> Result<()> {
        if self.closed {
            return Err(Error::ErrClientClosed);
        }
        if self.transactions.contains_key(&m.transaction_id) {
            return Err(Error::ErrTransactionExists);
        }

        let id = m.transaction_id;
        let mut tr = Transaction::new(m, self.local, self.remote, self.config)?;
        tr.start(Instant::now())?;
        self.transactions.insert(id, tr);
        self.collect(id);

        Ok(())
    }

    /// Returns packets to transmit
    ///
    /// It should be polled for transmit after:
    /// - the application performed some I/O
    /// - a call was made to `handle_read`
    /// - a call was made to `handle_write`
    /// - a call was made to `handle_timeout`
    fn poll_write(&mut self) -> Option<Self::Wout> {
        for tr in self.transactions.values_mut() {
            while let Some(transmit) = tr.poll_transmit() {
                self.transmits.push_back(transmit);
            }
        }
        self.transmits.pop_front()
    }

    fn poll_event(&mut self) -> Option<Self::Eout> {
        self.events.pop_front()
    }

    fn handle_timeout(&mut self, now: Instant) -> Result<()> {
        let mut ids = vec![];
        for (id, tr) in self.transactions.iter_mut() {
            tr.handle_timeout(now);
            if tr.is_resolved() {
                ids.push(*id);
            }
        }

        for id in ids {
            self.collect(id);
        }
        Ok(())
    }

    fn poll_timeout(&mut self) -> Option<Self::Time> {
        self.transactions
            .values()
            .filter_map(Transaction::poll_timeout)
            .min()
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::ErrClientClosed);
        }
        self.closed = true;

        let ids: Vec<TransactionId> = self.transactions.keys().copied().collect();
        for id in ids {
            if let Some(mut tr) = self.transactions.remove(&id) {
                tr.close();
                self.drain(&mut tr);
            }
        }
        Ok(())
    }
}
