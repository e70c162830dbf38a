use super::*;
use crate::payload::{Payload, PayloadHeader};

fn minimal_payload_bytes() -> Vec<u8> {
    Payload {
        header: PayloadHeader {
            version: 1,
            cursor_offset_x: 0,
            cursor_offset_y: 0,
            cursor_target_area: 0,
            dragbox_size_x: 1,
            dragbox_size_y: 1,
            primary_area_index: 0,
            area_count: 0,
        },
        areas: Vec::new(),
        buildings: Vec::new(),
    }
    .encode()
}

fn sample_blueprint() -> Blueprint {
    Blueprint {
        reserved0: 0,
        reserved1: 0,
        layout: 10,
        icons: [1, 2, 3, 4, 5],
        ticks: 637_000_000_000_000_000,
        game_version: "0.10.28.21014".to_string(),
        short_desc: "test blueprint".to_string(),
        long_desc: "a longer, \"quoted\" description with 100% detail".to_string(),
        payload: minimal_payload_bytes(),
    }
}

#[test]
fn serialize_then_parse_round_trips() {
    let bp = sample_blueprint();
    let text = bp.serialize().unwrap();
    assert!(text.starts_with("BLUEPRINT:"));

    let parsed = Blueprint::parse(&text, true).unwrap();
    assert_eq!(parsed, bp);
}

#[test]
fn parse_rejects_missing_prefix() {
    let err = Blueprint::parse("NOTABLUEPRINT:0,0\"x\"Y", true).unwrap_err();
    assert_eq!(err, EnvelopeError::Malformed(MalformedReason::MissingPrefix));
}

#[test]
fn parse_rejects_wrong_field_count() {
    let err = Blueprint::parse("BLUEPRINT:0,1,2\"x\"Y", true).unwrap_err();
    match err {
        EnvelopeError::Malformed(MalformedReason::WrongFieldCount { found }) => assert_eq!(found, 3),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn parse_rejects_non_zero_reserved_field() {
    let bp = sample_blueprint();
    let text = bp.serialize().unwrap();
    let tampered = text.replacen("BLUEPRINT:0,", "BLUEPRINT:7,", 1);

    let err = Blueprint::parse(&tampered, false).unwrap_err();
    match err {
        EnvelopeError::Malformed(MalformedReason::ReservedFieldNonZero { index, value }) => {
            assert_eq!(index, 0);
            assert_eq!(value, 7);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn tampered_hash_fails_validation_but_parses_when_ignored() {
    let bp = sample_blueprint();
    let text = bp.serialize().unwrap();
    let mut tampered = text.clone();
    tampered.pop();
    tampered.push(if text.ends_with('0') { '1' } else { '0' });

    let err = Blueprint::parse(&tampered, true).unwrap_err();
    assert_eq!(err, EnvelopeError::InvalidHash);

    let parsed = Blueprint::parse(&tampered, false).unwrap();
    assert_eq!(parsed.layout, bp.layout);
}

#[test]
fn description_round_trips_through_percent_encoding() {
    let mut bp = sample_blueprint();
    bp.short_desc = "commas, quotes \" and percents % oh my".to_string();
    let text = bp.serialize().unwrap();
    let parsed = Blueprint::parse(&text, true).unwrap();
    assert_eq!(parsed.short_desc, bp.short_desc);
}

#[test]
fn replace_item_updates_stored_payload_bytes() {
    let mut payload = Payload::decode(&minimal_payload_bytes()).unwrap();
    payload.buildings.push(crate::payload::Building {
        index: 0,
        area_index: 0,
        local_offset_x: 0.0,
        local_offset_y: 0.0,
        local_offset_z: 0.0,
        local_offset_x2: 0.0,
        local_offset_y2: 0.0,
        local_offset_z2: 0.0,
        yaw: 0.0,
        yaw2: 0.0,
        item_id: 2001,
        model_index: 0,
        output_object_index: u32::MAX,
        input_object_index: u32::MAX,
        output_to_slot: -1,
        input_from_slot: -1,
        output_from_slot: -1,
        input_to_slot: -1,
        output_offset: 0,
        input_offset: 0,
        recipe_id: 0,
        filter_id: 0,
        parameters: Vec::new(),
    });

    let mut bp = sample_blueprint();
    bp.payload = payload.encode();

    let changed = bp.replace_item(2001, 2002).unwrap();
    assert_eq!(changed, 1);

    let decoded = bp.decode_payload().unwrap();
    assert_eq!(decoded.buildings[0].item_id, 2002);
}

#[test]
fn to_dict_includes_decoded_payload_and_metadata() {
    let bp = sample_blueprint();
    let value = bp.to_dict();
    assert_eq!(value["layout"], serde_json::json!(10));
    assert_eq!(value["game_version"], serde_json::json!("0.10.28.21014"));
    assert!(value["payload"]["header"]["area_count"] == serde_json::json!(0));
}

#[test]
fn timestamp_round_trips_through_ticks() {
    let bp = sample_blueprint();
    let datetime = bp.timestamp();
    let mut mutated = bp.clone();
    mutated.set_timestamp(datetime);
    assert_eq!(mutated.ticks, (bp.ticks / 10_000_000) * 10_000_000);
}
