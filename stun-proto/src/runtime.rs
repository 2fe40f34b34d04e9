
use log::warn;
use shared::error::*;
use std::future::Future;
use std::net::SocketAddr;
use tokio::sync::mpsc;
use tokio::time::Instant;

use crate::message::*;
use crate::transaction::*;

/// Transport is the outbound half of a datagram socket. send resolves once
/// the whole datagram has been handed to the socket.
pub trait Transport {
    fn send(&self, data: &[u8], addr: SocketAddr) -> impl Future<Output = Result<()>> + Send;
}

impl Transport for tokio::net::UdpSocket {
    async fn send(&self, data: &[u8], addr: SocketAddr) -> Result<()> {
        self.send_to(data, addr).await?;
        Ok(())
    }
}

impl Transaction {
    /// run sends the request right away and then waits until a response
    /// arrives on inbound or the retry budget is exhausted.
    ///
    /// inbound is fed by whoever owns the socket with the messages carrying
    /// this transaction's id. Dropping its sender tears the transaction down.
    pub async fn run<T: Transport>(
        mut self,
        transport: &T,
        inbound: &mut mpsc::Receiver<(Message, SocketAddr)>,
    ) -> Result<Message> {
        self.start(Instant::now().into_std())?;

        loop {
            while let Some(transmit) = self.poll_transmit() {
                transport
                    .send(&transmit.message, transmit.transport.peer_addr)
                    .await?;
            }
            if let Some(event) = self.poll_event() {
                return event.result;
            }

            let Some(deadline) = self.poll_timeout() else {
                return Err(Error::ErrTransactionClosed);
            };

            tokio::select! {
                _ = tokio::time::sleep_until(Instant::from_std(deadline)) => {
                    self.handle_timeout(Instant::now().into_std());
                }
                received = inbound.recv() => {
                    match received {
                        Some((message, addr)) if message.transaction_id == self.transaction_id() => {
                            self.message_received(message, addr);
                        }
                        Some((message, addr)) => {
                            warn!("ignoring {message} from {addr}: transaction id mismatch");
                        }
                        None => self.close(),
                    }
                }
            }
        }
    }
}
