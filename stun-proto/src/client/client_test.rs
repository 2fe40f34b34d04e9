use super::*;
use bytes::BytesMut;
use sansio::Protocol;
use shared::TransportContext;

fn local_addr() -> SocketAddr {
    "192.168.1.2:50000".parse().unwrap()
}

fn server_addr() -> SocketAddr {
    "203.0.113.1:3478".parse().unwrap()
}

fn create_test_client() -> Result<Client> {
    ClientBuilder::new().build(local_addr(), server_addr())
}

fn inbound(m: &Message) -> Result<TaggedBytesMut> {
    Ok(TaggedBytesMut {
        now: Instant::now(),
        transport: TransportContext::new(local_addr(), server_addr(), TransportProtocol::UDP),
        message: m.encode()?,
    })
}

#[test]
fn test_client_binding_request() -> Result<()> {
    let mut client = create_test_client()?;

    let request = Message::new(METHOD_BINDING, CLASS_REQUEST, TransactionId::new());
    client.handle_write(request.clone())?;
    assert_eq!(client.pending(), 1);

    let transmit = client.poll_write().expect("request should be sent");
    assert_eq!(transmit.message, request.encode()?);
    assert_eq!(transmit.transport.peer_addr, server_addr());
    assert!(client.poll_write().is_none());

    let mut response = Message::new(METHOD_BINDING, CLASS_RESPONSE, request.transaction_id);
    response.set("XOR-MAPPED-ADDRESS", "198.51.100.7:61000".parse::<SocketAddr>().unwrap())?;
    client.handle_read(inbound(&response)?)?;

    let event = client.poll_event().expect("transaction should resolve");
    assert_eq!(event.id, request.transaction_id);
    let m = event.result?;
    assert_eq!(
        m.get("XOR-MAPPED-ADDRESS").and_then(|v| v.as_address()),
        Some("198.51.100.7:61000".parse().unwrap())
    );

    assert_eq!(client.pending(), 0, "should be no transaction left");
    assert_eq!(client.poll_timeout(), None);
    assert!(client.poll_read().is_none());
    client.close()
}

#[test]
fn test_client_routes_by_transaction_id() -> Result<()> {
    let mut client = create_test_client()?;

    let first = Message::new(METHOD_BINDING, CLASS_REQUEST, TransactionId::new());
    let second = Message::new(METHOD_BINDING, CLASS_REQUEST, TransactionId::new());
    client.handle_write(first.clone())?;
    client.handle_write(second.clone())?;
    while client.poll_write().is_some() {}

    let response = Message::new(METHOD_BINDING, CLASS_RESPONSE, second.transaction_id);
    client.handle_read(inbound(&response)?)?;

    let event = client.poll_event().unwrap();
    assert_eq!(event.id, second.transaction_id);
    assert!(event.result.is_ok());
    assert!(client.poll_event().is_none());
    assert_eq!(client.pending(), 1);
    Ok(())
}

#[test]
fn test_client_unsolicited_message() -> Result<()> {
    let mut client = create_test_client()?;

    let indication = Message::new(METHOD_BINDING, CLASS_INDICATION, TransactionId::new());
    client.handle_read(inbound(&indication)?)?;

    let m = client.poll_read().expect("unmatched message is passed up");
    assert_eq!(m.transaction_id, indication.transaction_id);
    assert!(client.poll_event().is_none());
    Ok(())
}

#[test]
fn test_client_duplicate_transaction() -> Result<()> {
    let mut client = create_test_client()?;
    let request = Message::new(METHOD_BINDING, CLASS_REQUEST, TransactionId::new());
    client.handle_write(request.clone())?;
    assert_eq!(
        client.handle_write(request),
        Err(Error::ErrTransactionExists)
    );
    Ok(())
}

#[test]
fn test_client_timeout() -> Result<()> {
    let mut client = ClientBuilder::new()
        .with_retry_interval(Duration::from_millis(10))
        .with_retry_max(3)
        .build(local_addr(), server_addr())?;

    let request = Message::new(METHOD_BINDING, CLASS_REQUEST, TransactionId::new());
    client.handle_write(request.clone())?;

    let mut sends = 0;
    loop {
        while client.poll_write().is_some() {
            sends += 1;
        }
        match client.poll_timeout() {
            Some(deadline) => client.handle_timeout(deadline)?,
            None => break,
        }
    }

    assert_eq!(sends, 3);
    let event = client.poll_event().unwrap();
    assert_eq!(event.id, request.transaction_id);
    assert_eq!(event.result, Err(Error::ErrTransactionTimeOut));
    assert_eq!(client.pending(), 0);
    Ok(())
}

#[test]
fn test_client_malformed_datagram() -> Result<()> {
    let mut client = create_test_client()?;

    let request = Message::new(METHOD_BINDING, CLASS_REQUEST, TransactionId::new());
    let mut datagram = inbound(&request)?;
    datagram.message.extend_from_slice(&[0, 0, 0, 0]);
    assert_eq!(
        client.handle_read(datagram),
        Err(Error::ErrMessageLengthMismatch)
    );

    let rtp = TaggedBytesMut {
        now: Instant::now(),
        transport: TransportContext::default(),
        message: BytesMut::from(&[0x80u8, 0x60, 0x00, 0x01][..]),
    };
    client.handle_read(rtp)?;
    assert!(client.poll_read().is_none());
    Ok(())
}

#[test]
fn test_client_close() -> Result<()> {
    let mut client = create_test_client()?;
    let request = Message::new(METHOD_BINDING, CLASS_REQUEST, TransactionId::new());
    client.handle_write(request.clone())?;

    client.close()?;
    let event = client.poll_event().unwrap();
    assert_eq!(event.id, request.transaction_id);
    assert_eq!(event.result, Err(Error::ErrTransactionClosed));
    assert_eq!(client.poll_timeout(), None);

    assert_eq!(client.close(), Err(Error::ErrClientClosed));
    assert_eq!(
        client.handle_write(Message::new(METHOD_BINDING, CLASS_REQUEST, TransactionId::new())),
        Err(Error::ErrClientClosed)
    );
    Ok(())
}
