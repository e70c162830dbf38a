use super::*;

fn sample_spec() -> RecordSpec {
    RecordSpec::new(vec![
        FieldSpec { name: "a", kind: FieldKind::U8 },
        FieldSpec { name: "b", kind: FieldKind::I16 },
        FieldSpec { name: "c", kind: FieldKind::U32 },
        FieldSpec { name: "d", kind: FieldKind::F32 },
    ])
}

#[test]
fn size_is_sum_of_field_widths() {
    assert_eq!(sample_spec().size(), 1 + 2 + 4 + 4);
}

#[test]
fn unpack_reads_little_endian_fields_at_offset() {
    let spec = sample_spec();
    let mut buf = vec![0xff, 0xff]; // leading padding before the record
    buf.push(0x7b); // a = 123
    buf.extend_from_slice(&(-500i16).to_le_bytes()); // b
    buf.extend_from_slice(&42_000u32.to_le_bytes()); // c
    buf.extend_from_slice(&1.5f32.to_le_bytes()); // d

    let fields = spec.unpack(&buf, 2).unwrap();
    assert_eq!(fields[&"a"], Value::U8(123));
    assert_eq!(fields[&"b"], Value::I16(-500));
    assert_eq!(fields[&"c"], Value::U32(42_000));
    assert_eq!(fields[&"d"], Value::F32(1.5));
}

#[test]
fn unpack_short_read_reports_offset_and_need() {
    let spec = sample_spec();
    let buf = vec![0u8; 5];
    let err = spec.unpack(&buf, 0).unwrap_err();
    match err {
        PayloadError::ShortRead { offset, needed, available } => {
            assert_eq!(offset, 0);
            assert_eq!(needed, 11);
            assert_eq!(available, 5);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn pack_then_unpack_round_trips() {
    let spec = sample_spec();
    let mut fields = BTreeMap::new();
    fields.insert("a", Value::U8(9));
    fields.insert("b", Value::I16(-1));
    fields.insert("c", Value::U32(7));
    fields.insert("d", Value::F32(3.25));

    let packed = spec.pack(&fields);
    assert_eq!(packed.len(), spec.size());

    let unpacked = spec.unpack(&packed, 0).unwrap();
    assert_eq!(unpacked, fields);
}

#[test]
#[should_panic(expected = "missing field")]
fn pack_panics_on_missing_field() {
    let spec = sample_spec();
    let mut fields = BTreeMap::new();
    fields.insert("a", Value::U8(1));
    spec.pack(&fields);
}
