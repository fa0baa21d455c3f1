// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::collections::HashMap;

use smallvec::SmallVec;
use smol_str::SmolStr;

use super::{FieldValue, GffError, GFF_VERSION, HEADER_SIZE, LABEL_SIZE};
use crate::model::LocString;

/// Index of a struct added to a [`GffWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructRef(u32);

impl StructRef {
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Index of a field added to a [`GffWriter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldRef(u32);

#[derive(Debug)]
struct PendingStruct {
    type_id: u32,
    fields: SmallVec<[u32; 16]>,
}

#[derive(Debug)]
struct PendingField {
    label: u32,
    value: FieldValue,
}

/// Accumulates structs and typed fields, then lays out the container in one pass.
///
/// Structs are emitted in insertion order, so the first struct added is the root. Fields keep
/// insertion order too; list values may be patched with [`GffWriter::set_value`] once the struct
/// indices they reference are known.
#[derive(Debug)]
pub struct GffWriter {
    file_type: [u8; 4],
    structs: Vec<PendingStruct>,
    fields: Vec<PendingField>,
    labels: Vec<SmolStr>,
    label_lookup: HashMap<SmolStr, u32>,
}

impl GffWriter {
    pub fn new(file_type: [u8; 4]) -> Self {
        Self {
            file_type,
            structs: Vec::new(),
            fields: Vec::new(),
            labels: Vec::new(),
            label_lookup: HashMap::new(),
        }
    }

    pub fn add_struct(&mut self, type_id: u32) -> StructRef {
        self.structs.push(PendingStruct {
            type_id,
            fields: SmallVec::new(),
        });
        StructRef((self.structs.len() - 1) as u32)
    }

    pub fn add_field(
        &mut self,
        owner: StructRef,
        label: &str,
        value: FieldValue,
    ) -> Result<FieldRef, GffError> {
        let label = self.intern_label(label)?;
        let index = self.fields.len() as u32;
        self.fields.push(PendingField { label, value });
        if let Some(pending) = self.structs.get_mut(owner.0 as usize) {
            pending.fields.push(index);
        }
        Ok(FieldRef(index))
    }

    pub fn set_value(&mut self, field: FieldRef, value: FieldValue) {
        if let Some(pending) = self.fields.get_mut(field.0 as usize) {
            pending.value = value;
        }
    }

    pub fn struct_count(&self) -> usize {
        self.structs.len()
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    fn intern_label(&mut self, label: &str) -> Result<u32, GffError> {
        if label.len() > LABEL_SIZE {
            return Err(GffError::LabelTooLong {
                label: label.to_owned(),
            });
        }
        if let Some(index) = self.label_lookup.get(label) {
            return Ok(*index);
        }
        let index = self.labels.len() as u32;
        let label = SmolStr::new(label);
        self.labels.push(label.clone());
        self.label_lookup.insert(label, index);
        Ok(index)
    }

    /// Lays out every section and returns the complete container.
    pub fn finish(self) -> Result<Vec<u8>, GffError> {
        // List offsets are fixed before any struct or field record is encoded.
        let mut list_offsets: HashMap<u32, u32> = HashMap::new();
        let mut list_size: usize = 0;
        for (index, field) in self.fields.iter().enumerate() {
            if let FieldValue::List(items) = &field.value {
                list_offsets.insert(index as u32, to_u32(list_size, "list indices")?);
                list_size += 4 + items.len() * 4;
            }
        }
        let mut list_indices = Vec::with_capacity(list_size);
        for field in &self.fields {
            if let FieldValue::List(items) = &field.value {
                push_u32(&mut list_indices, to_u32(items.len(), "list indices")?);
                for item in items {
                    push_u32(&mut list_indices, *item);
                }
            }
        }

        let mut field_indices = Vec::new();
        let mut struct_table = Vec::with_capacity(self.structs.len() * 12);
        for pending in &self.structs {
            let data_or_offset = match pending.fields.len() {
                0 => u32::MAX,
                1 => pending.fields[0],
                _ => {
                    let offset = to_u32(field_indices.len(), "field indices")?;
                    for field in &pending.fields {
                        push_u32(&mut field_indices, *field);
                    }
                    offset
                }
            };
            push_u32(&mut struct_table, pending.type_id);
            push_u32(&mut struct_table, data_or_offset);
            push_u32(&mut struct_table, pending.fields.len() as u32);
        }

        let mut field_data = Vec::new();
        let mut field_table = Vec::with_capacity(self.fields.len() * 12);
        for (index, field) in self.fields.iter().enumerate() {
            let data_or_offset = match &field.value {
                FieldValue::Byte(v) => u32::from(*v),
                FieldValue::Char(v) => *v as u8 as u32,
                FieldValue::Word(v) => u32::from(*v),
                FieldValue::Short(v) => *v as u16 as u32,
                FieldValue::Dword(v) => *v,
                FieldValue::Int(v) => *v as u32,
                FieldValue::Float(v) => v.to_bits(),
                FieldValue::Struct(v) => *v,
                FieldValue::List(_) => list_offsets.get(&(index as u32)).copied().unwrap_or(0),
                complex => {
                    let offset = to_u32(field_data.len(), "field data")?;
                    encode_complex(&mut field_data, complex)?;
                    offset
                }
            };
            push_u32(&mut field_table, field.value.field_type().as_u32());
            push_u32(&mut field_table, field.label);
            push_u32(&mut field_table, data_or_offset);
        }

        let mut label_table = Vec::with_capacity(self.labels.len() * LABEL_SIZE);
        for label in &self.labels {
            let mut raw = [0u8; LABEL_SIZE];
            raw[..label.len()].copy_from_slice(label.as_bytes());
            label_table.extend_from_slice(&raw);
        }

        let struct_offset = HEADER_SIZE;
        let field_offset = struct_offset + struct_table.len();
        let label_offset = field_offset + field_table.len();
        let field_data_offset = label_offset + label_table.len();
        let field_indices_offset = field_data_offset + field_data.len();
        let list_indices_offset = field_indices_offset + field_indices.len();
        let total = list_indices_offset + list_indices.len();
        to_u32(total, "container")?;

        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(&self.file_type);
        out.extend_from_slice(&GFF_VERSION);
        for word in [
            struct_offset,
            self.structs.len(),
            field_offset,
            self.fields.len(),
            label_offset,
            self.labels.len(),
            field_data_offset,
            field_data.len(),
            field_indices_offset,
            field_indices.len(),
            list_indices_offset,
            list_indices.len(),
        ] {
            push_u32(&mut out, word as u32);
        }
        out.extend_from_slice(&struct_table);
        out.extend_from_slice(&field_table);
        out.extend_from_slice(&label_table);
        out.extend_from_slice(&field_data);
        out.extend_from_slice(&field_indices);
        out.extend_from_slice(&list_indices);

        tracing::debug!(
            structs = self.structs.len(),
            fields = self.fields.len(),
            labels = self.labels.len(),
            bytes = out.len(),
            "laid out container"
        );
        Ok(out)
    }
}

fn encode_complex(out: &mut Vec<u8>, value: &FieldValue) -> Result<(), GffError> {
    match value {
        FieldValue::Dword64(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::Int64(v) => out.extend_from_slice(&v.to_le_bytes()),
        FieldValue::Double(v) => out.extend_from_slice(&v.to_bits().to_le_bytes()),
        FieldValue::ExoString(v) => {
            push_u32(out, to_u32(v.len(), "field data")?);
            out.extend_from_slice(v.as_bytes());
        }
        FieldValue::ResRef(v) => {
            out.push(v.as_str().len() as u8);
            out.extend_from_slice(v.as_str().as_bytes());
        }
        FieldValue::LocString(v) => encode_locstring(out, v)?,
        FieldValue::Void(v) => {
            push_u32(out, to_u32(v.len(), "field data")?);
            out.extend_from_slice(v);
        }
        _ => {}
    }
    Ok(())
}

fn encode_locstring(out: &mut Vec<u8>, value: &LocString) -> Result<(), GffError> {
    let body: usize = 8 + value
        .strings()
        .values()
        .map(|text| 8 + text.len())
        .sum::<usize>();
    push_u32(out, to_u32(body, "field data")?);
    push_u32(out, value.str_ref());
    push_u32(out, value.strings().len() as u32);
    for (language, text) in value.strings() {
        push_u32(out, *language);
        push_u32(out, to_u32(text.len(), "field data")?);
        out.extend_from_slice(text.as_bytes());
    }
    Ok(())
}

fn push_u32(out: &mut Vec<u8>, value: u32) {
    out.extend_from_slice(&value.to_le_bytes());
}

fn to_u32(value: usize, section: &'static str) -> Result<u32, GffError> {
    u32::try_from(value).map_err(|_| GffError::TooLarge { section })
}
