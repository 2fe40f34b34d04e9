use stun_proto::message::*;
use stun_proto::transaction::*;

use clap::Parser;
use log::{info, warn};
use shared::error::Error;
use shared::util::lookup_host;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::UdpSocket;
use tokio::sync::mpsc;

#[derive(Parser)]
#[command(name = "STUN Client")]
#[command(author = "Rusty Rain <yliu@webrtc.rs>")]
#[command(version = "0.1.0")]
#[command(about = "An example of STUN Client", long_about = None)]
struct Cli {
    #[arg(long, default_value_t = format!("stun.l.google.com:19302"))]
    server: String,
    /// Short-term credential used to sign the request with MESSAGE-INTEGRITY
    #[arg(long)]
    key: Option<String>,
    /// Delay before the first retransmission, in milliseconds
    #[arg(long, default_value_t = 500)]
    retry_interval: u64,
    #[arg(long, default_value_t = 7)]
    retry_max: u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    env_logger::init();
    let cli = Cli::parse();

    let conn = Arc::new(UdpSocket::bind("0.0.0.0:0").await?);
    let local_addr = conn.local_addr()?;
    let server = lookup_host(true, cli.server.as_str())?;
    println!("Local address: {local_addr}");
    println!("Connecting to: {server}");

    let mut request = Message::new(METHOD_BINDING, CLASS_REQUEST, TransactionId::new());
    request.set("SOFTWARE", "stun-proto")?;
    if let Some(key) = &cli.key {
        request.add_message_integrity(key.as_bytes())?;
    }
    request.add_fingerprint()?;

    let config = TransactionConfig {
        retry_interval: Duration::from_millis(cli.retry_interval),
        retry_max: cli.retry_max,
        ..Default::default()
    };
    let id = request.transaction_id;
    let tr = Transaction::new(request, local_addr, server, config)?;

    let (tx, mut rx) = mpsc::channel(8);
    let reader = Arc::clone(&conn);
    tokio::spawn(async move {
        let mut buf = vec![0u8; 1500];
        while let Ok((n, from)) = reader.recv_from(&mut buf).await {
            match Message::decode(&buf[..n]) {
                Ok(m) if m.transaction_id == id => {
                    if tx.send((m, from)).await.is_err() {
                        break;
                    }
                }
                Ok(m) => info!("dropping {m} from {from}"),
                Err(err) => warn!("failed to decode datagram from {from}: {err}"),
            }
        }
    });

    let result = tr.run(&*conn, &mut rx).await;
    let response = result?;
    match response.get("XOR-MAPPED-ADDRESS").and_then(|v| v.as_address()) {
        Some(addr) => println!("Got response: {addr}"),
        None => println!("Got response without XOR-MAPPED-ADDRESS: {response}"),
    }

    Ok(())
}
