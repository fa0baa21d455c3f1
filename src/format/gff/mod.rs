// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Generic binary tree container (GFF V3.2).
//!
//! The reader turns bytes into raw struct/field/label tables plus the data blobs; the writer does
//! the inverse from typed values. Neither knows anything about dialogue.

mod reader;
mod value;
mod writer;


use smallvec::SmallVec;
use smol_str::SmolStr;

pub use reader::read_gff;
pub use value::{FieldType, FieldValue};
pub use writer::{FieldRef, GffWriter, StructRef};

/// Size of the fixed header in bytes.
pub const HEADER_SIZE: usize = 56;
/// Type tag of the root struct.
pub const ROOT_STRUCT_TYPE: u32 = 0xFFFF_FFFF;
/// Fixed on-disk width of a label.
pub const LABEL_SIZE: usize = 16;
pub const GFF_VERSION: [u8; 4] = *b"V3.2";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GffError {
    #[error("malformed container: {section} at byte {offset}: {reason}")]
    MalformedContainer {
        section: &'static str,
        offset: usize,
        reason: String,
    },
    #[error("label {label:?} is longer than {LABEL_SIZE} bytes")]
    LabelTooLong { label: String },
    #[error("container exceeds the 4 GiB addressable size while writing {section}")]
    TooLarge { section: &'static str },
}

impl GffError {
    pub(crate) fn malformed(section: &'static str, offset: usize, reason: impl Into<String>) -> Self {
        Self::MalformedContainer {
            section,
            offset,
            reason: reason.into(),
        }
    }
}

/// Header counts and section offsets, exactly as stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GffHeader {
    pub file_type: [u8; 4],
    pub file_version: [u8; 4],
    pub struct_offset: u32,
    pub struct_count: u32,
    pub field_offset: u32,
    pub field_count: u32,
    pub label_offset: u32,
    pub label_count: u32,
    pub field_data_offset: u32,
    pub field_data_size: u32,
    pub field_indices_offset: u32,
    pub field_indices_size: u32,
    pub list_indices_offset: u32,
    pub list_indices_size: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawStruct {
    pub type_id: u32,
    /// Field index when the struct has one field, byte offset into the field-indices section
    /// when it has more.
    pub data_or_offset: u32,
    pub field_count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawField {
    pub field_type: FieldType,
    pub label_index: u32,
    /// Inline value for simple types, otherwise an offset into field data (struct index for
    /// `Struct`, list-indices offset for `List`).
    pub data_or_offset: u32,
}

/// A parsed container: raw tables plus the byte sections they point into.
#[derive(Debug, Clone, PartialEq)]
pub struct GffFile {
    pub header: GffHeader,
    pub structs: Vec<RawStruct>,
    pub fields: Vec<RawField>,
    pub labels: Vec<SmolStr>,
    pub field_data: Vec<u8>,
    pub field_indices: Vec<u8>,
    pub list_indices: Vec<u8>,
}

impl GffFile {
    pub fn file_type(&self) -> &[u8; 4] {
        &self.header.file_type
    }

    pub fn root(&self) -> Result<&RawStruct, GffError> {
        self.structs
            .first()
            .ok_or_else(|| GffError::malformed("structs", 0, "container has no root struct"))
    }

    pub fn struct_at(&self, index: u32) -> Result<&RawStruct, GffError> {
        self.structs.get(index as usize).ok_or_else(|| {
            GffError::malformed("structs", index as usize, "struct index out of range")
        })
    }

    pub fn field_at(&self, index: u32) -> Result<&RawField, GffError> {
        self.fields
            .get(index as usize)
            .ok_or_else(|| GffError::malformed("fields", index as usize, "field index out of range"))
    }

    pub fn label_of(&self, field: &RawField) -> Result<&str, GffError> {
        self.labels
            .get(field.label_index as usize)
            .map(SmolStr::as_str)
            .ok_or_else(|| {
                GffError::malformed("labels", field.label_index as usize, "label index out of range")
            })
    }

    /// Field indices belonging to the struct at `index`, in stored order.
    pub fn struct_field_indices(&self, index: u32) -> Result<SmallVec<[u32; 16]>, GffError> {
        let raw = self.struct_at(index)?;
        let mut out = SmallVec::new();
        match raw.field_count {
            0 => {}
            1 => out.push(raw.data_or_offset),
            count => {
                let start = raw.data_or_offset as usize;
                for i in 0..count as usize {
                    let at = start + i * 4;
                    out.push(read_u32_at(&self.field_indices, at, "field indices")?);
                }
            }
        }
        Ok(out)
    }

    /// Struct indices of the list stored at `offset` in the list-indices section.
    pub fn list_at(&self, offset: u32) -> Result<Vec<u32>, GffError> {
        let offset = offset as usize;
        let count = read_u32_at(&self.list_indices, offset, "list indices")? as usize;
        let end = count
            .checked_mul(4)
            .and_then(|len| len.checked_add(offset + 4))
            .ok_or_else(|| GffError::malformed("list indices", offset, "list length overflows"))?;
        if end > self.list_indices.len() {
            return Err(GffError::malformed(
                "list indices",
                offset,
                format!("list of {count} entries runs past end of section"),
            ));
        }
        (0..count)
            .map(|i| read_u32_at(&self.list_indices, offset + 4 + i * 4, "list indices"))
            .collect()
    }

    /// Decodes the value of the field at `index`.
    pub fn value(&self, index: u32) -> Result<FieldValue, GffError> {
        let field = self.field_at(index)?;
        value::decode(self, field)
    }
}

pub(crate) fn read_u32_at(bytes: &[u8], at: usize, section: &'static str) -> Result<u32, GffError> {
    let slice = at
        .checked_add(4)
        .and_then(|end| bytes.get(at..end))
        .ok_or_else(|| GffError::malformed(section, at, "read past end of section"))?;
    Ok(u32::from_le_bytes([slice[0], slice[1], slice[2], slice[3]]))
}
