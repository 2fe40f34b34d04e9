use super::*;

static DUPLICATE_TYPE: &[AttributeDescriptor] = &[
    descriptor(ATTR_USERNAME, "USERNAME", AttrCodec::Text),
    descriptor(ATTR_USERNAME, "USERNAME-AGAIN", AttrCodec::Text),
];

static DUPLICATE_NAME: &[AttributeDescriptor] = &[
    descriptor(ATTR_USERNAME, "USERNAME", AttrCodec::Text),
    descriptor(ATTR_REALM, "USERNAME", AttrCodec::Text),
];

#[test]
fn test_registry_table() {
    assert_eq!(registry().len(), 19);

    for d in ATTRIBUTES {
        let by_type = lookup_by_type(d.typ.0).expect("registered by type");
        let by_name = lookup_by_name(d.name).expect("registered by name");
        assert_eq!(by_type, d);
        assert_eq!(by_name, d);
    }
}

#[test]
fn test_registry_lookup() {
    let d = lookup_by_type(0x0020).unwrap();
    assert_eq!(d.name, "XOR-MAPPED-ADDRESS");
    assert_eq!(d.codec, AttrCodec::XorAddress);

    let d = lookup_by_name("FINGERPRINT").unwrap();
    assert_eq!(d.typ, AttrType(0x8028));
    assert_eq!(d.codec, AttrCodec::Unsigned);

    let d = lookup_by_name("USE-CANDIDATE").unwrap();
    assert_eq!(d.codec, AttrCodec::Empty);

    assert!(lookup_by_type(0x0002).is_none());
    assert!(lookup_by_type(0xffff).is_none());
    assert!(lookup_by_name("ALTERNATE-SERVER").is_none());
}

#[test]
fn test_registry_duplicates() {
    let result = AttributeRegistry::new(DUPLICATE_TYPE);
    assert_eq!(
        result.err(),
        Some(Error::ErrDuplicateAttributeType(0x0006)),
        "duplicate code should be rejected"
    );

    let result = AttributeRegistry::new(DUPLICATE_NAME);
    assert_eq!(
        result.err(),
        Some(Error::ErrDuplicateAttributeName("USERNAME".to_owned())),
        "duplicate name should be rejected"
    );
}

#[test]
fn test_attr_type_display() {
    assert_eq!(ATTR_MESSAGE_INTEGRITY.to_string(), "MESSAGE-INTEGRITY");
    assert_eq!(AttrType(0x0002).to_string(), "0x0002");
    assert!(ATTR_USERNAME.required());
    assert!(ATTR_SOFTWARE.optional());
}

#[test]
fn test_codec_encode() -> Result<()> {
    let tid = TransactionId([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);

    let v = AttrCodec::Unsigned.encode(&AttrValue::Unsigned(0x6e0001ff), &tid)?;
    assert_eq!(v, vec![0x6e, 0x00, 0x01, 0xff]);

    let v = AttrCodec::Text.encode(&AttrValue::from("a:b"), &tid)?;
    assert_eq!(v, b"a:b".to_vec());

    let v = AttrCodec::Empty.encode(&AttrValue::Empty, &tid)?;
    assert!(v.is_empty());

    let addr: SocketAddr = "1.2.3.4:3478".parse().unwrap();
    let v = AttrCodec::Address.encode(&AttrValue::Address(addr), &tid)?;
    assert_eq!(v, vec![0x00, 0x01, 0x0d, 0x96, 1, 2, 3, 4]);

    let v = AttrCodec::XorAddress.encode(&AttrValue::Address(addr), &tid)?;
    assert_eq!(v, vec![0x00, 0x01, 0x2c, 0x84, 0x20, 0x10, 0xa7, 0x46]);

    Ok(())
}

#[test]
fn test_codec_value_mismatch() {
    let tid = TransactionId::default();

    assert_eq!(
        AttrCodec::Address.encode(&AttrValue::Unsigned(1), &tid),
        Err(Error::ErrUnsupportedAddressFamily)
    );
    assert_eq!(
        AttrCodec::XorAddress.encode(&AttrValue::Text("1.2.3.4".to_owned()), &tid),
        Err(Error::ErrUnsupportedAddressFamily)
    );
    assert_eq!(
        AttrCodec::Unsigned.encode(&AttrValue::Bytes(vec![0; 4]), &tid),
        Err(Error::ErrAttributeValueMismatch)
    );
    assert_eq!(
        AttrCodec::Empty.encode(&AttrValue::Unsigned(0), &tid),
        Err(Error::ErrAttributeValueMismatch)
    );
}

#[test]
fn test_codec_decode() -> Result<()> {
    let tid = TransactionId([1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);

    assert_eq!(
        AttrCodec::Unsigned.decode(&[0, 0, 0, 42], &tid)?,
        AttrValue::Unsigned(42)
    );
    assert_eq!(
        AttrCodec::Unsigned.decode(&[0, 0, 42], &tid),
        Err(Error::ErrAttributeSizeInvalid)
    );
    assert_eq!(
        AttrCodec::Text.decode(b"test", &tid)?,
        AttrValue::Text("test".to_owned())
    );
    assert!(AttrCodec::Text.decode(&[0xff, 0xfe], &tid).is_err());
    assert_eq!(
        AttrCodec::Bytes.decode(&[1, 2, 3], &tid)?,
        AttrValue::Bytes(vec![1, 2, 3])
    );
    assert_eq!(AttrCodec::Empty.decode(&[1, 2], &tid)?, AttrValue::Empty);
    assert_eq!(
        AttrCodec::XorAddress.decode(&[0x00, 0x01, 0x2c, 0x84, 0x20, 0x10, 0xa7, 0x46], &tid)?,
        AttrValue::Address("1.2.3.4:3478".parse().unwrap())
    );

    Ok(())
}

#[test]
fn test_attr_value_accessors() {
    let addr: SocketAddr = "[::1]:5000".parse().unwrap();
    assert_eq!(AttrValue::from(addr).as_address(), Some(addr));
    assert_eq!(AttrValue::from(7u32).as_unsigned(), Some(7));
    assert_eq!(AttrValue::from("realm").as_text(), Some("realm"));
    assert_eq!(AttrValue::from(vec![1u8, 2]).as_bytes(), Some(&[1u8, 2][..]));
    assert_eq!(AttrValue::Empty.as_address(), None);
    assert_eq!(AttrValue::Unsigned(1).as_text(), None);
}
