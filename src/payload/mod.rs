//! The binary payload inside a blueprint envelope: a fixed header, an area
//! table, and a building table whose records carry a variable-length
//! parameter tail.
//!
//! Grounded on `original_source/BlueprintData.py` (`BlueprintData`,
//! `BlueprintArea`, `BlueprintBuilding`). Two of spec.md's claimed byte
//! widths do not match that source's own `NamedStruct` field lists (its
//! Area record is 14 bytes, not 12; its Building prefix is 61 bytes, not
//! 55) — this implementation follows the field lists, which are
//! internally consistent, and documents the discrepancy in `DESIGN.md`.

pub mod station;

use crate::codec::{FieldKind, FieldSpec, RecordSpec, Value};
use crate::error::PayloadError;
use serde::Serialize;
use station::StationView;
use std::sync::OnceLock;

fn header_spec() -> &'static RecordSpec {
    static SPEC: OnceLock<RecordSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        RecordSpec::new(vec![
            FieldSpec { name: "version", kind: FieldKind::U32 },
            FieldSpec { name: "cursor_offset_x", kind: FieldKind::U32 },
            FieldSpec { name: "cursor_offset_y", kind: FieldKind::U32 },
            FieldSpec { name: "cursor_target_area", kind: FieldKind::U32 },
            FieldSpec { name: "dragbox_size_x", kind: FieldKind::U32 },
            FieldSpec { name: "dragbox_size_y", kind: FieldKind::U32 },
            FieldSpec { name: "primary_area_index", kind: FieldKind::U32 },
            FieldSpec { name: "area_count", kind: FieldKind::U8 },
        ])
    })
}

fn area_spec() -> &'static RecordSpec {
    static SPEC: OnceLock<RecordSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        RecordSpec::new(vec![
            FieldSpec { name: "index", kind: FieldKind::I8 },
            FieldSpec { name: "parent_index", kind: FieldKind::I8 },
            FieldSpec { name: "tropic_anchor", kind: FieldKind::U16 },
            FieldSpec { name: "area_segments", kind: FieldKind::U16 },
            FieldSpec { name: "anchor_local_offset_x", kind: FieldKind::U16 },
            FieldSpec { name: "anchor_local_offset_y", kind: FieldKind::U16 },
            FieldSpec { name: "width", kind: FieldKind::U16 },
            FieldSpec { name: "height", kind: FieldKind::U16 },
        ])
    })
}

fn building_header_spec() -> &'static RecordSpec {
    static SPEC: OnceLock<RecordSpec> = OnceLock::new();
    SPEC.get_or_init(|| RecordSpec::new(vec![FieldSpec { name: "building_count", kind: FieldKind::U32 }]))
}

fn building_spec() -> &'static RecordSpec {
    static SPEC: OnceLock<RecordSpec> = OnceLock::new();
    SPEC.get_or_init(|| {
        RecordSpec::new(vec![
            FieldSpec { name: "index", kind: FieldKind::U32 },
            FieldSpec { name: "area_index", kind: FieldKind::I8 },
            FieldSpec { name: "local_offset_x", kind: FieldKind::F32 },
            FieldSpec { name: "local_offset_y", kind: FieldKind::F32 },
            FieldSpec { name: "local_offset_z", kind: FieldKind::F32 },
            FieldSpec { name: "local_offset_x2", kind: FieldKind::F32 },
            FieldSpec { name: "local_offset_y2", kind: FieldKind::F32 },
            FieldSpec { name: "local_offset_z2", kind: FieldKind::F32 },
            FieldSpec { name: "yaw", kind: FieldKind::F32 },
            FieldSpec { name: "yaw2", kind: FieldKind::F32 },
            FieldSpec { name: "item_id", kind: FieldKind::U16 },
            FieldSpec { name: "model_index", kind: FieldKind::U16 },
            FieldSpec { name: "output_object_index", kind: FieldKind::U32 },
            FieldSpec { name: "input_object_index", kind: FieldKind::U32 },
            FieldSpec { name: "output_to_slot", kind: FieldKind::I8 },
            FieldSpec { name: "input_from_slot", kind: FieldKind::I8 },
            FieldSpec { name: "output_from_slot", kind: FieldKind::I8 },
            FieldSpec { name: "input_to_slot", kind: FieldKind::I8 },
            FieldSpec { name: "output_offset", kind: FieldKind::I8 },
            FieldSpec { name: "input_offset", kind: FieldKind::I8 },
            FieldSpec { name: "recipe_id", kind: FieldKind::U16 },
            FieldSpec { name: "filter_id", kind: FieldKind::U16 },
            FieldSpec { name: "parameter_count", kind: FieldKind::U16 },
        ])
    })
}

/// The fixed header preceding the area table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayloadHeader {
    pub version: u32,
    pub cursor_offset_x: u32,
    pub cursor_offset_y: u32,
    pub cursor_target_area: u32,
    pub dragbox_size_x: u32,
    pub dragbox_size_y: u32,
    pub primary_area_index: u32,
    pub area_count: u8,
}

/// A single construction area. Fields are opaque to the codec; only their
/// positions and widths are meaningful here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Area {
    pub index: i8,
    pub parent_index: i8,
    pub tropic_anchor: u16,
    pub area_segments: u16,
    pub anchor_local_offset_x: u16,
    pub anchor_local_offset_y: u16,
    pub width: u16,
    pub height: u16,
}

/// A placed building: position, orientation, wiring endpoints, and a
/// variable-length parameter tail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Building {
    pub index: u32,
    pub area_index: i8,
    pub local_offset_x: f32,
    pub local_offset_y: f32,
    pub local_offset_z: f32,
    pub local_offset_x2: f32,
    pub local_offset_y2: f32,
    pub local_offset_z2: f32,
    pub yaw: f32,
    pub yaw2: f32,
    pub item_id: u16,
    pub model_index: u16,
    pub output_object_index: u32,
    pub input_object_index: u32,
    pub output_to_slot: i8,
    pub input_from_slot: i8,
    pub output_from_slot: i8,
    pub input_to_slot: i8,
    pub output_offset: i8,
    pub input_offset: i8,
    pub recipe_id: u16,
    pub filter_id: u16,
    /// Raw parameter cells, preserved verbatim across re-serialization
    /// unless the caller replaces this vector.
    pub parameters: Vec<u32>,
}

impl Building {
    /// Byte length of this building's full record (fixed prefix + tail).
    pub fn size(&self) -> usize {
        building_spec().size() + 4 * self.parameters.len()
    }

    /// Interpret [`Building::parameters`] as a logistics station layout, if
    /// `item_id` names one. Returns `None` for every other item.
    pub fn station_view(&self) -> Option<StationView> {
        let storage_len = StationView::storage_len_for(self.item_id)?;
        Some(StationView::parse(&self.parameters, storage_len))
    }

    /// Resolve this building's item name through `catalog`, falling back to
    /// `[<numeric_id>]` when the catalog is absent or has no entry — the
    /// "recoverable `UnknownItem`" behavior from spec.md §7.
    pub fn item_name(&self, catalog: Option<&dyn ItemCatalog>) -> String {
        match catalog.and_then(|c| c.name(self.item_id)) {
            Some(name) => name.to_string(),
            None => {
                tracing::debug!(item_id = self.item_id, "no catalog entry for item id");
                format!("[{}]", self.item_id)
            }
        }
    }
}

/// Resolves a numeric item id to its display name. Implemented by callers;
/// the core crate ships no catalog data (spec.md marks the item catalog an
/// external collaborator).
pub trait ItemCatalog {
    fn name(&self, item_id: u16) -> Option<&str>;
}

/// The fully decoded binary payload: header, areas, and buildings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub header: PayloadHeader,
    pub areas: Vec<Area>,
    pub buildings: Vec<Building>,
}

impl Payload {
    /// Decode a payload from its raw decompressed bytes.
    ///
    /// Decodes strictly in order: fixed header, `area_count` areas, a
    /// 4-byte building header, then that many buildings.
    pub fn decode(data: &[u8]) -> Result<Self, PayloadError> {
        let header_fields = header_spec().unpack(data, 0)?;
        let header = PayloadHeader {
            version: header_fields[&"version"].as_u32(),
            cursor_offset_x: header_fields[&"cursor_offset_x"].as_u32(),
            cursor_offset_y: header_fields[&"cursor_offset_y"].as_u32(),
            cursor_target_area: header_fields[&"cursor_target_area"].as_u32(),
            dragbox_size_x: header_fields[&"dragbox_size_x"].as_u32(),
            dragbox_size_y: header_fields[&"dragbox_size_y"].as_u32(),
            primary_area_index: header_fields[&"primary_area_index"].as_u32(),
            area_count: header_fields[&"area_count"].as_i64() as u8,
        };

        let mut offset = header_spec().size();
        let mut areas = Vec::with_capacity(header.area_count as usize);
        for _ in 0..header.area_count {
            let fields = area_spec().unpack(data, offset)?;
            areas.push(Area {
                index: fields[&"index"].as_i64() as i8,
                parent_index: fields[&"parent_index"].as_i64() as i8,
                tropic_anchor: fields[&"tropic_anchor"].as_u32() as u16,
                area_segments: fields[&"area_segments"].as_u32() as u16,
                anchor_local_offset_x: fields[&"anchor_local_offset_x"].as_u32() as u16,
                anchor_local_offset_y: fields[&"anchor_local_offset_y"].as_u32() as u16,
                width: fields[&"width"].as_u32() as u16,
                height: fields[&"height"].as_u32() as u16,
            });
            offset += area_spec().size();
        }

        let building_header = building_header_spec().unpack(data, offset)?;
        let building_count = building_header[&"building_count"].as_u32();
        offset += building_header_spec().size();

        let mut buildings = Vec::with_capacity(building_count as usize);
        for _ in 0..building_count {
            let fields = building_spec().unpack(data, offset)?;
            offset += building_spec().size();

            let parameter_count = fields[&"parameter_count"].as_u32() as usize;
            let tail_len = 4 * parameter_count;
            if offset + tail_len > data.len() {
                return Err(PayloadError::ShortRead {
                    offset,
                    needed: tail_len,
                    available: data.len().saturating_sub(offset),
                });
            }
            let mut parameters = Vec::with_capacity(parameter_count);
            for i in 0..parameter_count {
                let cell = &data[offset + 4 * i..offset + 4 * (i + 1)];
                parameters.push(u32::from_le_bytes(cell.try_into().unwrap()));
            }
            offset += tail_len;

            buildings.push(Building {
                index: fields[&"index"].as_u32(),
                area_index: fields[&"area_index"].as_i64() as i8,
                local_offset_x: fields[&"local_offset_x"].as_f32(),
                local_offset_y: fields[&"local_offset_y"].as_f32(),
                local_offset_z: fields[&"local_offset_z"].as_f32(),
                local_offset_x2: fields[&"local_offset_x2"].as_f32(),
                local_offset_y2: fields[&"local_offset_y2"].as_f32(),
                local_offset_z2: fields[&"local_offset_z2"].as_f32(),
                yaw: fields[&"yaw"].as_f32(),
                yaw2: fields[&"yaw2"].as_f32(),
                item_id: fields[&"item_id"].as_u32() as u16,
                model_index: fields[&"model_index"].as_u32() as u16,
                output_object_index: fields[&"output_object_index"].as_u32(),
                input_object_index: fields[&"input_object_index"].as_u32(),
                output_to_slot: fields[&"output_to_slot"].as_i64() as i8,
                input_from_slot: fields[&"input_from_slot"].as_i64() as i8,
                output_from_slot: fields[&"output_from_slot"].as_i64() as i8,
                input_to_slot: fields[&"input_to_slot"].as_i64() as i8,
                output_offset: fields[&"output_offset"].as_i64() as i8,
                input_offset: fields[&"input_offset"].as_i64() as i8,
                recipe_id: fields[&"recipe_id"].as_u32() as u16,
                filter_id: fields[&"filter_id"].as_u32() as u16,
                parameters,
            });
        }

        if offset != data.len() {
            return Err(PayloadError::InconsistentCount {
                what: "payload length",
                declared: offset as u64,
                trailing: data.len() - offset,
            });
        }

        Ok(Self { header, areas, buildings })
    }

    /// Encode this payload back into raw bytes.
    ///
    /// The emitted `building_count` is recomputed from `buildings.len()`,
    /// never the originally parsed value — mirroring
    /// `BlueprintData.serialize` in the original source.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();

        let mut header_fields = std::collections::BTreeMap::new();
        header_fields.insert("version", Value::U32(self.header.version));
        header_fields.insert("cursor_offset_x", Value::U32(self.header.cursor_offset_x));
        header_fields.insert("cursor_offset_y", Value::U32(self.header.cursor_offset_y));
        header_fields.insert("cursor_target_area", Value::U32(self.header.cursor_target_area));
        header_fields.insert("dragbox_size_x", Value::U32(self.header.dragbox_size_x));
        header_fields.insert("dragbox_size_y", Value::U32(self.header.dragbox_size_y));
        header_fields.insert("primary_area_index", Value::U32(self.header.primary_area_index));
        header_fields.insert("area_count", Value::U8(self.areas.len() as u8));
        out.extend(header_spec().pack(&header_fields));

        for area in &self.areas {
            let mut fields = std::collections::BTreeMap::new();
            fields.insert("index", Value::I8(area.index));
            fields.insert("parent_index", Value::I8(area.parent_index));
            fields.insert("tropic_anchor", Value::U16(area.tropic_anchor));
            fields.insert("area_segments", Value::U16(area.area_segments));
            fields.insert("anchor_local_offset_x", Value::U16(area.anchor_local_offset_x));
            fields.insert("anchor_local_offset_y", Value::U16(area.anchor_local_offset_y));
            fields.insert("width", Value::U16(area.width));
            fields.insert("height", Value::U16(area.height));
            out.extend(area_spec().pack(&fields));
        }

        let mut building_header_fields = std::collections::BTreeMap::new();
        building_header_fields.insert("building_count", Value::U32(self.buildings.len() as u32));
        out.extend(building_header_spec().pack(&building_header_fields));

        for building in &self.buildings {
            let mut fields = std::collections::BTreeMap::new();
            fields.insert("index", Value::U32(building.index));
            fields.insert("area_index", Value::I8(building.area_index));
            fields.insert("local_offset_x", Value::F32(building.local_offset_x));
            fields.insert("local_offset_y", Value::F32(building.local_offset_y));
            fields.insert("local_offset_z", Value::F32(building.local_offset_z));
            fields.insert("local_offset_x2", Value::F32(building.local_offset_x2));
            fields.insert("local_offset_y2", Value::F32(building.local_offset_y2));
            fields.insert("local_offset_z2", Value::F32(building.local_offset_z2));
            fields.insert("yaw", Value::F32(building.yaw));
            fields.insert("yaw2", Value::F32(building.yaw2));
            fields.insert("item_id", Value::U16(building.item_id));
            fields.insert("model_index", Value::U16(building.model_index));
            fields.insert("output_object_index", Value::U32(building.output_object_index));
            fields.insert("input_object_index", Value::U32(building.input_object_index));
            fields.insert("output_to_slot", Value::I8(building.output_to_slot));
            fields.insert("input_from_slot", Value::I8(building.input_from_slot));
            fields.insert("output_from_slot", Value::I8(building.output_from_slot));
            fields.insert("input_to_slot", Value::I8(building.input_to_slot));
            fields.insert("output_offset", Value::I8(building.output_offset));
            fields.insert("input_offset", Value::I8(building.input_offset));
            fields.insert("recipe_id", Value::U16(building.recipe_id));
            fields.insert("filter_id", Value::U16(building.filter_id));
            fields.insert("parameter_count", Value::U16(building.parameters.len() as u16));
            out.extend(building_spec().pack(&fields));

            for cell in &building.parameters {
                out.extend_from_slice(&cell.to_le_bytes());
            }
        }

        out
    }

    /// Replace every building's `item_id` matching `search` with
    /// `replacement`. Parameters are left untouched even when they might
    /// semantically reference item ids (spec.md §4.2).
    ///
    /// Returns the number of buildings changed.
    pub fn replace_item(&mut self, search: u16, replacement: u16) -> usize {
        let mut changed = 0;
        for building in &mut self.buildings {
            if building.item_id == search {
                building.item_id = replacement;
                changed += 1;
            }
        }
        if changed > 0 {
            tracing::info!(search, replacement, changed, "replaced building item ids");
        }
        changed
    }
}
