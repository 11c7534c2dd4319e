use tlv_codec::{
    decode, decode_with_config, encode, Config, DecodeError, ElementType, EncodeError, Reader,
    Structure, Tag, TagControl, TaggedList, Value, Writer,
};

// =============================================================================
// Scalars
// =============================================================================

#[test]
fn test_signed_scalar() {
    let bytes = encode(Tag::Anonymous, &Value::Signed(0x7c)).unwrap();
    assert_eq!(&bytes[..], &[0x00, 0x7C]);
    assert_eq!(decode(bytes).unwrap(), (Tag::Anonymous, Value::Signed(0x7c)));
}

#[test]
fn test_unsigned_scalar() {
    let bytes = encode(Tag::Anonymous, &Value::Unsigned(0xde)).unwrap();
    assert_eq!(&bytes[..], &[0x04, 0xDE]);
    let (_, value) = decode(bytes).unwrap();
    assert_eq!(value, Value::Unsigned(0xde));
    assert_eq!(value.as_signed(), None);
}

#[test]
fn test_integer_width_boundaries() {
    let len = |v: Value| encode(Tag::Anonymous, &v).unwrap().len();
    assert_eq!(len(Value::Signed(127)), 2);
    assert_eq!(len(Value::Signed(128)), 3);
    assert_eq!(len(Value::Signed(-128)), 2);
    assert_eq!(len(Value::Signed(-129)), 3);
    assert_eq!(len(Value::Unsigned(255)), 2);
    assert_eq!(len(Value::Unsigned(256)), 3);
    assert_eq!(len(Value::Signed(0xDEAD_BEEF)), 9);
    assert_eq!(len(Value::Unsigned(0xDEAD_BEEF)), 5);
    assert_eq!(len(Value::Unsigned(u64::MAX)), 9);
}

#[test]
fn test_checked_conversions() {
    assert!(matches!(
        Value::checked_unsigned(-1),
        Err(EncodeError::Range { value: -1, signed: false })
    ));
    assert!(Value::checked_unsigned(1 << 64).is_err());
    assert!(Value::checked_signed(1 << 63).is_err());
    assert_eq!(
        Value::checked_signed(-(1 << 63)).unwrap(),
        Value::Signed(i64::MIN)
    );
}

#[test]
fn test_scalar_kinds_round_trip() {
    let values = vec![
        Value::Bool(true),
        Value::Bool(false),
        Value::Null,
        Value::Float(1.5),
        Value::Double(-0.25),
        Value::from("grüezi"),
        Value::from(&b"\x00\xff"[..]),
        Value::Text(String::new()),
    ];
    for value in values {
        let bytes = encode(Tag::Anonymous, &value).unwrap();
        assert_eq!(decode(bytes).unwrap().1, value);
    }
}

// =============================================================================
// Containers
// =============================================================================

#[test]
fn test_tagged_list_wire_format() {
    let mut list = TaggedList::new();
    list.push(Tag::Anonymous, 1i64);
    list.push(Tag::Anonymous, 2i64);
    list.push(1u8, 3i64);

    let bytes = encode(Tag::Anonymous, &Value::List(list.clone())).unwrap();
    assert_eq!(
        &bytes[..],
        &[0x17, 0x00, 0x01, 0x00, 0x02, 0x20, 0x01, 0x03, 0x18]
    );

    let (_, value) = decode(bytes).unwrap();
    let decoded = value.as_list().unwrap();
    assert_eq!(decoded, &list);
    assert_eq!(decoded.get(2), Some(&(Tag::Context(1), Value::Signed(3))));
    assert_eq!(decoded.by_tag(Tag::Anonymous), Some(&Value::Signed(1)));
}

#[test]
fn test_nested_list_array_structure() {
    let bytes = vec![
        0x37, 0x01, // list, context 1
        0x16, // array
        0x15, // structure
        0x26, 0x00, 0xBF, 0xA2, 0x55, 0x16, // 0: u32 374710975
        0x24, 0x02, 0x01, // 2: u8 1
        0x18, 0x18, 0x18,
    ];

    let structure: Structure = vec![
        (0u8, Value::Unsigned(374710975)),
        (2u8, Value::Unsigned(1)),
    ]
    .into_iter()
    .collect();
    let mut list = TaggedList::new();
    list.push(Tag::Anonymous, Value::Array(vec![Value::Structure(structure)]));
    let expected = (Tag::Context(1), Value::List(list));

    assert_eq!(decode(bytes.clone()).unwrap(), expected);
    assert_eq!(&encode(expected.0, &expected.1).unwrap()[..], &bytes[..]);
}

#[test]
fn test_structure_equality_ignores_order() {
    let a: Structure = vec![(1u8, Value::Bool(true)), (2u8, Value::Null)]
        .into_iter()
        .collect();
    let b: Structure = vec![(2u8, Value::Null), (1u8, Value::Bool(true))]
        .into_iter()
        .collect();
    assert_eq!(a, b);
    // wire order is kept
    let bytes = encode(Tag::Anonymous, &Value::Structure(b)).unwrap();
    assert_eq!(&bytes[..], &[0x15, 0x34, 0x02, 0x29, 0x01, 0x18]);
}

#[test]
fn test_empty_containers() {
    for value in [
        Value::Structure(Structure::new()),
        Value::Array(Vec::new()),
        Value::List(TaggedList::new()),
    ] {
        let bytes = encode(Tag::Anonymous, &value).unwrap();
        assert_eq!(bytes.len(), 2);
        assert_eq!(decode(bytes).unwrap().1, value);
    }
}

// =============================================================================
// Malformed input
// =============================================================================

#[test]
fn test_missing_end_of_container() {
    let result = decode(vec![0x15, 0x24, 0x01, 0x03]);
    assert!(matches!(
        result,
        Err(DecodeError::UnterminatedContainer { open: 1 })
    ));

    let mut writer = Writer::new();
    writer.open_structure(Tag::Anonymous).unwrap();
    writer.put(1u8, &Value::Unsigned(3)).unwrap();
    assert!(matches!(
        writer.encoding(),
        Err(EncodeError::UnterminatedContainer { open: 1 })
    ));
}

#[test]
fn test_truncated_payload() {
    assert!(matches!(
        decode(vec![0x06, 0x01, 0x02]),
        Err(DecodeError::Truncated { needed: 4, remaining: 2 })
    ));
    assert!(matches!(
        decode(vec![0x24]),
        Err(DecodeError::Truncated { .. })
    ));
}

#[test]
fn test_unknown_element_type() {
    assert!(matches!(
        decode(vec![0x1F]),
        Err(DecodeError::UnknownElementType(0x1F))
    ));
}

#[test]
fn test_profile_tags_are_rejected() {
    assert!(matches!(
        decode(vec![0x44, 0x01, 0x00, 0x07]),
        Err(DecodeError::UnsupportedTag(TagControl::CommonProfile2))
    ));
    assert!(matches!(
        Tag::try_from(300u16),
        Err(EncodeError::UnsupportedTag(300))
    ));
    assert!(matches!(
        Tag::try_from(-1i32),
        Err(EncodeError::UnsupportedTag(-1))
    ));
    assert_eq!(Tag::try_from(255u32).unwrap(), Tag::Context(255));
}

#[test]
fn test_structure_tag_rules_on_decode() {
    // repeated context tag
    assert!(matches!(
        decode(vec![0x15, 0x34, 0x01, 0x34, 0x01, 0x18]),
        Err(DecodeError::MalformedTag { tag: Tag::Context(1), .. })
    ));
    // second anonymous child
    assert!(matches!(
        decode(vec![0x15, 0x14, 0x14, 0x18]),
        Err(DecodeError::MalformedTag { tag: Tag::Anonymous, .. })
    ));
    // tagged array element
    assert!(matches!(
        decode(vec![0x16, 0x34, 0x00, 0x18]),
        Err(DecodeError::MalformedTag { tag: Tag::Context(0), .. })
    ));
}

#[test]
fn test_stray_end_of_container() {
    assert!(matches!(
        decode(vec![0x18]),
        Err(DecodeError::UnexpectedEndOfContainer)
    ));
}

#[test]
fn test_invalid_utf8() {
    assert!(matches!(
        decode(vec![0x0C, 0x01, 0xFF]),
        Err(DecodeError::InvalidUtf8(_))
    ));
}

#[test]
fn test_trailing_bytes() {
    assert!(matches!(
        decode(vec![0x08, 0x09]),
        Err(DecodeError::TrailingBytes(1))
    ));
}

#[test]
fn test_depth_limit() {
    let mut nested = Value::Null;
    for _ in 0..5 {
        nested = Value::Array(vec![nested]);
    }
    let bytes = encode(Tag::Anonymous, &nested).unwrap();

    assert!(decode_with_config(bytes.clone(), Config::default().max_depth(5)).is_ok());
    assert!(matches!(
        decode_with_config(bytes, Config::default().max_depth(4)),
        Err(DecodeError::DepthExceeded { max: 4 })
    ));

    let mut writer = Writer::with_config(Config::default().max_depth(4));
    assert!(matches!(
        writer.put(Tag::Anonymous, &nested),
        Err(EncodeError::DepthExceeded { max: 4 })
    ));
}

// =============================================================================
// Streaming
// =============================================================================

#[test]
fn test_writer_streaming_matches_put() {
    let mut writer = Writer::new();
    writer.open_list(Tag::Anonymous).unwrap();
    writer.put(Tag::Anonymous, &Value::Signed(1)).unwrap();
    writer.put(Tag::Anonymous, &Value::Signed(2)).unwrap();
    writer.put(1u8, &Value::Signed(3)).unwrap();
    writer.close().unwrap();
    let streamed = writer.finish().unwrap();

    let list: TaggedList = vec![
        (Tag::Anonymous, Value::Signed(1)),
        (Tag::Anonymous, Value::Signed(2)),
        (Tag::Context(1), Value::Signed(3)),
    ]
    .into_iter()
    .collect();
    assert_eq!(streamed, encode(Tag::Anonymous, &Value::List(list)).unwrap());
}

#[test]
fn test_reader_skips_unread_payloads() {
    let structure: Structure = vec![
        (0u8, Value::from("skipped")),
        (1u8, Value::Array(vec![Value::Unsigned(9)])),
        (2u8, Value::Bool(true)),
    ]
    .into_iter()
    .collect();
    let bytes = encode(Tag::Anonymous, &Value::Structure(structure)).unwrap();

    let mut reader = Reader::new(bytes);
    assert_eq!(reader.next().unwrap().unwrap().element_type, ElementType::Structure);
    assert_eq!(reader.next().unwrap().unwrap().tag, Tag::Context(0));
    let array = reader.next().unwrap().unwrap();
    assert_eq!(array.tag, Tag::Context(1));
    assert_eq!(
        reader.get().unwrap(),
        (Tag::Context(1), Value::Array(vec![Value::Unsigned(9)]))
    );
    assert_eq!(reader.get().unwrap(), (Tag::Context(2), Value::Bool(true)));
    assert_eq!(
        reader.next().unwrap().unwrap().element_type,
        ElementType::EndOfContainer
    );
    assert!(reader.next().unwrap().is_none());
    assert_eq!(reader.remaining(), 0);
}
