use na_bson::{BinarySubtype, BsonType, BsonValue, Document, Error, Iter, Oid};

fn sample() -> Document {
    let mut scope = Document::new();
    scope.append_int32("n", 7).unwrap();

    let mut doc = Document::new();
    doc.append_double("double", 3.25).unwrap();
    doc.append_utf8("utf8", "hello").unwrap();
    doc.append_binary("bin", BinarySubtype::Uuid, &[0xAB; 16])
        .unwrap();
    doc.append_binary("bin_old", BinarySubtype::BinaryOld, &[1, 2])
        .unwrap();
    doc.append_undefined("undefined").unwrap();
    doc.append_oid("oid", &Oid::from_bytes([3; 12])).unwrap();
    doc.append_bool("bool", true).unwrap();
    doc.append_date_time("when", -473_385_600_000).unwrap();
    doc.append_null("null").unwrap();
    doc.append_regex("re", "^a", "ix").unwrap();
    doc.append_dbpointer("ptr", "db.c", &Oid::from_bytes([4; 12]))
        .unwrap();
    doc.append_code("js", "return 1;").unwrap();
    doc.append_symbol("sym", "name").unwrap();
    doc.append_code_with_scope("jsc", "f()", &scope).unwrap();
    doc.append_int32("i32", -5).unwrap();
    doc.append_timestamp("ts", 9, 2).unwrap();
    doc.append_int64("i64", 1 << 40).unwrap();
    doc.append_maxkey("max").unwrap();
    doc.append_minkey("min").unwrap();
    doc
}

#[test]
fn round_trip_every_type() {
    let doc = sample();
    let mut iter = doc.iter();

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.key(), "double");
    assert_eq!(field.as_double(), Some(3.25));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_utf8(), Some("hello"));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_binary(), Some((BinarySubtype::Uuid, &[0xAB; 16][..])));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(
        field.as_binary(),
        Some((BinarySubtype::BinaryOld, &[1u8, 2][..]))
    );

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.bson_type(), BsonType::Undefined);

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_oid(), Some(Oid::from_bytes([3; 12])));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_bool(), Some(true));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_date_time(), Some(-473_385_600_000));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.bson_type(), BsonType::Null);

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_regex(), Some((&b"^a"[..], &b"ix"[..])));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(
        field.as_dbpointer(),
        Some((&b"db.c"[..], Oid::from_bytes([4; 12])))
    );

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_code(), Some(&b"return 1;"[..]));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_symbol(), Some(&b"name"[..]));

    let field = iter.next().unwrap().unwrap();
    let (code, scope) = field.as_code_with_scope().unwrap();
    assert_eq!(code, b"f()");
    let mut scope_iter = Iter::new(scope).unwrap();
    let n = scope_iter.next().unwrap().unwrap();
    assert_eq!(n.key(), "n");
    assert_eq!(n.as_int32(), Some(7));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_int32(), Some(-5));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_timestamp(), Some((9, 2)));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.as_int64(), Some(1 << 40));

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.bson_type(), BsonType::MaxKey);

    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.bson_type(), BsonType::MinKey);

    assert!(iter.next().is_none());
    assert_eq!(iter.error_offset(), None);
}

#[test]
fn type_predicates_partition_the_table() {
    assert!(BsonType::Document.is_container());
    assert!(BsonType::Array.is_container());
    assert!(!BsonType::Binary.is_container());

    assert!(BsonType::Utf8.is_string());
    assert!(BsonType::Code.is_string());
    assert!(BsonType::Symbol.is_string());
    assert!(!BsonType::CodeWithScope.is_string());

    assert!(BsonType::Undefined.is_empty_payload());
    assert!(BsonType::Null.is_empty_payload());
    assert!(BsonType::MaxKey.is_empty_payload());
    assert!(BsonType::MinKey.is_empty_payload());
    assert!(!BsonType::Bool.is_empty_payload());
}

#[test]
fn checked_accessors_refuse_other_types() {
    let mut doc = Document::new();
    doc.append_int32("a", 1).unwrap();
    let field = doc.get("a").unwrap();

    assert_eq!(field.as_int32(), Some(1));
    assert_eq!(field.as_int64(), None);
    assert_eq!(field.as_double(), None);
    assert_eq!(field.as_utf8(), None);
    assert_eq!(field.as_binary(), None);
    assert_eq!(field.as_document(), None);
    assert!(matches!(
        field.recurse(),
        Err(Error::UnexpectedType(BsonType::Document, BsonType::Int32))
    ));
}

#[test]
fn value_matches_accessors() {
    let doc = sample();
    for field in doc.iter().map(|item| item.unwrap()) {
        match field.value() {
            BsonValue::Int32(value) => assert_eq!(Some(value), field.as_int32()),
            BsonValue::Utf8(bytes) => assert_eq!(Some(bytes), field.as_utf8_bytes()),
            BsonValue::Timestamp { time, increment } => {
                assert_eq!(Some((time, increment)), field.as_timestamp())
            }
            other => assert_eq!(other.bson_type(), field.bson_type()),
        }
    }
}

#[test]
fn corruption_invalidates_once() {
    let mut doc = Document::new();
    doc.append_int32("a", 1).unwrap();
    doc.append_int32("b", 2).unwrap();
    let mut bytes = doc.into_vec();
    // Unknown type byte for the first element.
    bytes[4] = 0x55;

    let mut iter = Iter::new(&bytes).unwrap();
    let first = iter.next().unwrap();
    assert!(matches!(first, Err(Error::Corrupt(4))));
    assert_eq!(iter.error_offset(), Some(4));

    // The error is yielded once; afterwards the iterator is exhausted.
    assert!(iter.next().is_none());
    assert!(iter.next().is_none());
    assert_eq!(iter.error_offset(), Some(4));
}

#[test]
fn iter_new_rejects_bad_framing() {
    assert!(matches!(Iter::new(&[]), Err(Error::Corrupt(0))));
    assert!(matches!(Iter::new(&[5, 0, 0, 0]), Err(Error::Corrupt(0))));
    // Header larger than the buffer.
    assert!(matches!(
        Iter::new(&[6, 0, 0, 0, 0]),
        Err(Error::Corrupt(0))
    ));
    // Trailing byte not NUL.
    assert!(matches!(
        Iter::new(&[5, 0, 0, 0, 1]),
        Err(Error::Corrupt(4))
    ));
}

#[test]
fn truncated_string_is_corrupt() {
    let mut doc = Document::new();
    doc.append_utf8("s", "hello").unwrap();
    let mut bytes = doc.into_vec();
    // Claim more string bytes than the element holds.
    bytes[7..11].copy_from_slice(&100i32.to_le_bytes());

    let mut iter = Iter::new(&bytes).unwrap();
    assert!(matches!(iter.next().unwrap(), Err(Error::Corrupt(_))));
}

#[test]
fn string_without_terminator_is_corrupt() {
    let mut doc = Document::new();
    doc.append_utf8("s", "x").unwrap();
    let mut bytes = doc.into_vec();
    // Overwrite the value's own NUL, leaving the frame intact.
    bytes[12] = b'y';

    let mut iter = Iter::new(&bytes).unwrap();
    assert!(matches!(iter.next().unwrap(), Err(Error::Corrupt(12))));
}

#[test]
fn legacy_binary_inner_mismatch_is_corrupt() {
    let mut doc = Document::new();
    doc.append_binary("b", BinarySubtype::BinaryOld, &[1, 2, 3])
        .unwrap();
    let mut bytes = doc.into_vec();
    // Inner prefix must equal outer - 4.
    bytes[12..16].copy_from_slice(&9i32.to_le_bytes());

    let mut iter = Iter::new(&bytes).unwrap();
    assert!(matches!(iter.next().unwrap(), Err(Error::Corrupt(12))));
}

/// Chopping a valid document at any point must yield either a clean error
/// or a shorter valid walk, never a panic or an out-of-bounds read.
#[test]
fn truncation_never_panics() {
    let bytes = sample().into_vec();

    for cut in 0..bytes.len() {
        let mut shorter = bytes[..cut].to_vec();
        if shorter.len() >= 4 {
            let header = (shorter.len() as u32).to_le_bytes();
            shorter[..4].copy_from_slice(&header);
        }
        let Ok(iter) = Iter::new(&shorter) else {
            continue;
        };
        for item in iter {
            if item.is_err() {
                break;
            }
        }
    }
}

#[test]
fn get_finds_first_match() {
    let mut doc = Document::new();
    doc.append_int32("a", 1).unwrap();
    doc.append_int32("dup", 2).unwrap();
    doc.append_int32("dup", 3).unwrap();

    assert_eq!(doc.get("dup").unwrap().as_int32(), Some(2));
    assert!(doc.get("missing").is_none());
}

#[test]
fn key_sentinel_for_invalid_utf8() {
    let mut doc = Document::new();
    doc.append_int32("ab", 1).unwrap();
    let mut bytes = doc.into_vec();
    bytes[5] = 0xFF;
    bytes[6] = 0xFE;

    let mut iter = Iter::new(&bytes).unwrap();
    let field = iter.next().unwrap().unwrap();
    assert_eq!(field.key_bytes(), &[0xFF, 0xFE]);
    assert_eq!(field.key(), "");
}
