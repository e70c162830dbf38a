//! Declarative little-endian record pack/unpack, binding an ordered list of
//! `(kind, name)` fields to a fixed-width byte layout.
//!
//! Grounded on the teacher's bit-level `BitReader`/`BitWriter` cursor
//! pattern, simplified to byte-aligned fixed-width fields (every field in
//! the blueprint payload is byte-aligned, so no bit-packing is required
//! here).
#[cfg(test)]
mod tests;

use crate::error::PayloadError;
use std::collections::BTreeMap;

/// A scalar field type a [`RecordSpec`] can describe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    I8,
    U8,
    I16,
    U16,
    I32,
    U32,
    F32,
}

impl FieldKind {
    /// Byte width of this field.
    pub const fn width(self) -> usize {
        match self {
            FieldKind::I8 | FieldKind::U8 => 1,
            FieldKind::I16 | FieldKind::U16 => 2,
            FieldKind::I32 | FieldKind::U32 | FieldKind::F32 => 4,
        }
    }
}

/// A single named field within a [`RecordSpec`].
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub kind: FieldKind,
}

/// One decoded scalar value, tagged with the [`FieldKind`] it was read as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    U32(u32),
    F32(f32),
}

impl Value {
    pub fn as_i64(self) -> i64 {
        match self {
            Value::I8(v) => v as i64,
            Value::U8(v) => v as i64,
            Value::I16(v) => v as i64,
            Value::U16(v) => v as i64,
            Value::I32(v) => v as i64,
            Value::U32(v) => v as i64,
            Value::F32(v) => v as i64,
        }
    }

    pub fn as_u32(self) -> u32 {
        match self {
            Value::U32(v) => v,
            Value::I32(v) => v as u32,
            Value::U16(v) => v as u32,
            Value::I16(v) => v as u32,
            Value::U8(v) => v as u32,
            Value::I8(v) => v as u32,
            Value::F32(v) => v as u32,
        }
    }

    pub fn as_f32(self) -> f32 {
        match self {
            Value::F32(v) => v,
            other => other.as_i64() as f32,
        }
    }
}

/// An ordered, fixed-width binding from field names to byte positions.
///
/// `unpack` and `pack` always process fields in declaration order; the
/// record's total byte size is the sum of each field's width.
#[derive(Debug, Clone)]
pub struct RecordSpec {
    fields: Vec<FieldSpec>,
}

impl RecordSpec {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self { fields }
    }

    /// Total byte length of one record.
    pub fn size(&self) -> usize {
        self.fields.iter().map(|f| f.kind.width()).sum()
    }

    /// Decode one record starting at `offset`. Fails with
    /// [`PayloadError::ShortRead`] if fewer than `size()` bytes remain.
    pub fn unpack(&self, buf: &[u8], offset: usize) -> Result<BTreeMap<&'static str, Value>, PayloadError> {
        let size = self.size();
        if offset + size > buf.len() {
            return Err(PayloadError::ShortRead {
                offset,
                needed: size,
                available: buf.len().saturating_sub(offset),
            });
        }

        let mut out = BTreeMap::new();
        let mut cursor = offset;
        for field in &self.fields {
            let width = field.kind.width();
            let bytes = &buf[cursor..cursor + width];
            let value = match field.kind {
                FieldKind::I8 => Value::I8(bytes[0] as i8),
                FieldKind::U8 => Value::U8(bytes[0]),
                FieldKind::I16 => Value::I16(i16::from_le_bytes(bytes.try_into().unwrap())),
                FieldKind::U16 => Value::U16(u16::from_le_bytes(bytes.try_into().unwrap())),
                FieldKind::I32 => Value::I32(i32::from_le_bytes(bytes.try_into().unwrap())),
                FieldKind::U32 => Value::U32(u32::from_le_bytes(bytes.try_into().unwrap())),
                FieldKind::F32 => Value::F32(f32::from_le_bytes(bytes.try_into().unwrap())),
            };
            out.insert(field.name, value);
            cursor += width;
        }
        Ok(out)
    }

    /// Encode `fields` into exactly `size()` bytes, in declaration order.
    ///
    /// # Panics
    /// Panics if `fields` is missing an entry the spec declares, or if a
    /// value's tag does not match the declared [`FieldKind`] — both
    /// indicate a programming error in the caller, not malformed input.
    pub fn pack(&self, fields: &BTreeMap<&'static str, Value>) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size());
        for field in &self.fields {
            let value = fields
                .get(field.name)
                .unwrap_or_else(|| panic!("missing field `{}`", field.name));
            match (field.kind, value) {
                (FieldKind::I8, Value::I8(v)) => out.push(*v as u8),
                (FieldKind::U8, Value::U8(v)) => out.push(*v),
                (FieldKind::I16, Value::I16(v)) => out.extend_from_slice(&v.to_le_bytes()),
                (FieldKind::U16, Value::U16(v)) => out.extend_from_slice(&v.to_le_bytes()),
                (FieldKind::I32, Value::I32(v)) => out.extend_from_slice(&v.to_le_bytes()),
                (FieldKind::U32, Value::U32(v)) => out.extend_from_slice(&v.to_le_bytes()),
                (FieldKind::F32, Value::F32(v)) => out.extend_from_slice(&v.to_le_bytes()),
                _ => panic!("field `{}` kind mismatch", field.name),
            }
        }
        out
    }
}
