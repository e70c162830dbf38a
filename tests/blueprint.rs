//! End-to-end scenarios exercising the envelope, payload, and hash engine
//! together, mirroring the six concrete scenarios from the blueprint
//! codec's testable-properties section.
use dspbptk::payload::station::{INTERSTELLAR_LOGISTICS_STATION, PLANETARY_LOGISTICS_STATION};
use dspbptk::payload::{Area, Building, Payload, PayloadHeader};
use dspbptk::{Blueprint, EnvelopeError, HashEngine, MalformedReason, Variant};

fn minimal_header(area_count: u8) -> PayloadHeader {
    PayloadHeader {
        version: 1,
        cursor_offset_x: 0,
        cursor_offset_y: 0,
        cursor_target_area: 0,
        dragbox_size_x: 1,
        dragbox_size_y: 1,
        primary_area_index: 0,
        area_count,
    }
}

fn station_building(item_id: u16) -> Building {
    Building {
        index: 0,
        area_index: 0,
        local_offset_x: 10.0,
        local_offset_y: 10.0,
        local_offset_z: 0.0,
        local_offset_x2: 0.0,
        local_offset_y2: 0.0,
        local_offset_z2: 0.0,
        yaw: 0.0,
        yaw2: 0.0,
        item_id,
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
        parameters: vec![0u32; 328],
    }
}

fn belt_building(item_id: u16) -> Building {
    Building { parameters: Vec::new(), ..station_building(item_id) }
}

fn blueprint_with_payload(payload: &Payload) -> Blueprint {
    let text = format!(
        "BLUEPRINT:0,1,0,0,0,0,0,0,637000000000000000,0.10.28.21014,hello,{}\"{}\"PLACEHOLDER",
        "world",
        base64_gzip(&payload.encode())
    );
    // Build through the real parser so the fingerprint is consistent;
    // parse with validation disabled, then re-serialize to get a valid hash.
    let draft = Blueprint::parse(&text, false).expect("draft parses structurally");
    let fixed = draft.serialize().expect("serialize computes a correct fingerprint");
    Blueprint::parse(&fixed, true).expect("re-parse with the corrected fingerprint validates")
}

fn base64_gzip(payload_bytes: &[u8]) -> String {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload_bytes).unwrap();
    let compressed = encoder.finish().unwrap();
    STANDARD.encode(compressed)
}

#[test]
fn scenario_1_minimal_blueprint_has_zero_areas_and_buildings() {
    let payload = Payload { header: minimal_header(0), areas: Vec::new(), buildings: Vec::new() };
    let bp = blueprint_with_payload(&payload);
    let decoded = bp.decode_payload().unwrap();

    assert_eq!(decoded.header.area_count, 0);
    assert!(decoded.areas.is_empty());
    assert!(decoded.buildings.is_empty());
}

#[test]
fn scenario_2_planetary_station_parameter_tail_surfaces_storage_and_slots() {
    let mut payload = Payload { header: minimal_header(0), areas: Vec::new(), buildings: Vec::new() };
    payload.buildings.push(station_building(PLANETARY_LOGISTICS_STATION));

    let bp = blueprint_with_payload(&payload);
    let decoded = bp.decode_payload().unwrap();

    let view = decoded.buildings[0].station_view().expect("2103 is a station item id");
    assert_eq!(view.storage.len(), 3);
    assert_eq!(view.slots.len(), 12);

    let mut payload2 = payload;
    payload2.buildings[0] = station_building(INTERSTELLAR_LOGISTICS_STATION);
    let view2 = Payload::decode(&payload2.encode()).unwrap().buildings[0]
        .station_view()
        .expect("2104 is a station item id");
    assert_eq!(view2.storage.len(), 5);
    assert_eq!(view2.slots.len(), 12);
}

#[test]
fn scenario_3_replace_item_changes_only_matching_buildings() {
    let mut payload = Payload { header: minimal_header(1), areas: Vec::new(), buildings: Vec::new() };
    payload.areas.push(Area {
        index: 0,
        parent_index: -1,
        tropic_anchor: 0,
        area_segments: 200,
        anchor_local_offset_x: 0,
        anchor_local_offset_y: 0,
        width: 50,
        height: 50,
    });
    payload.buildings.push(belt_building(2001));
    payload.buildings.push(belt_building(2001));
    payload.buildings.push(belt_building(2002));

    let mut bp = blueprint_with_payload(&payload);
    let changed = bp.replace_item(2001, 2002).unwrap();
    assert_eq!(changed, 2);

    let decoded = bp.decode_payload().unwrap();
    assert_eq!(decoded.buildings.iter().filter(|b| b.item_id == 2001).count(), 0);
    assert_eq!(decoded.buildings.iter().filter(|b| b.item_id == 2002).count(), 3);
    assert_eq!(decoded.areas, payload.areas);
}

#[test]
fn scenario_4_tampered_fingerprint_fails_only_when_validating() {
    let payload = Payload { header: minimal_header(0), areas: Vec::new(), buildings: Vec::new() };
    let bp = blueprint_with_payload(&payload);
    let valid_text = bp.serialize().unwrap();

    let mut tampered = valid_text.clone();
    let last = tampered.pop().unwrap();
    tampered.push(if last == '0' { '1' } else { '0' });

    let err = Blueprint::parse(&tampered, true).unwrap_err();
    assert_eq!(err, EnvelopeError::InvalidHash);
    assert!(Blueprint::parse(&tampered, false).is_ok());
}

#[test]
fn scenario_5_md5f_vector_matches_spec_constant() {
    let digest = {
        let mut engine = HashEngine::new(Variant::Md5F);
        engine.update(b"Why are you doing this, Youthcat Studio?");
        engine.hexdigest()
    };
    assert_eq!(digest, "13424e12890a3f50a1f8567c464fff8c");
}

#[test]
fn scenario_6_short_description_round_trips_through_percent_encoding() {
    let payload = Payload { header: minimal_header(0), areas: Vec::new(), buildings: Vec::new() };
    let mut bp = blueprint_with_payload(&payload);
    bp.short_desc = "name, \"quoted\" 100% sure".to_string();

    let text = bp.serialize().unwrap();
    let reparsed = Blueprint::parse(&text, true).unwrap();
    assert_eq!(reparsed.short_desc, bp.short_desc);
}

#[test]
fn malformed_prefix_is_reported_precisely() {
    let err = Blueprint::parse("NOT_A_BLUEPRINT", true).unwrap_err();
    assert_eq!(err, EnvelopeError::Malformed(MalformedReason::MissingPrefix));
}
