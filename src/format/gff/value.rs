// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::fmt;

use super::{read_u32_at, GffError, GffFile, RawField};
use crate::model::{LocString, ResRef};

/// Field type tags as stored in the field table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum FieldType {
    Byte = 0,
    Char = 1,
    Word = 2,
    Short = 3,
    Dword = 4,
    Int = 5,
    Dword64 = 6,
    Int64 = 7,
    Float = 8,
    Double = 9,
    ExoString = 10,
    ResRef = 11,
    LocString = 12,
    Void = 13,
    Struct = 14,
    List = 15,
}

impl FieldType {
    pub fn from_u32(raw: u32) -> Option<Self> {
        Some(match raw {
            0 => Self::Byte,
            1 => Self::Char,
            2 => Self::Word,
            3 => Self::Short,
            4 => Self::Dword,
            5 => Self::Int,
            6 => Self::Dword64,
            7 => Self::Int64,
            8 => Self::Float,
            9 => Self::Double,
            10 => Self::ExoString,
            11 => Self::ResRef,
            12 => Self::LocString,
            13 => Self::Void,
            14 => Self::Struct,
            15 => Self::List,
            _ => return None,
        })
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// True when the value lives in the field-data section rather than inline.
    pub fn is_complex(self) -> bool {
        matches!(
            self,
            Self::Dword64
                | Self::Int64
                | Self::Double
                | Self::ExoString
                | Self::ResRef
                | Self::LocString
                | Self::Void
        )
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A decoded field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Byte(u8),
    Char(i8),
    Word(u16),
    Short(i16),
    Dword(u32),
    Int(i32),
    Dword64(u64),
    Int64(i64),
    Float(f32),
    Double(f64),
    ExoString(String),
    ResRef(ResRef),
    LocString(LocString),
    Void(Vec<u8>),
    /// Index of a nested struct.
    Struct(u32),
    /// Struct indices of the list's elements.
    List(Vec<u32>),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            Self::Byte(_) => FieldType::Byte,
            Self::Char(_) => FieldType::Char,
            Self::Word(_) => FieldType::Word,
            Self::Short(_) => FieldType::Short,
            Self::Dword(_) => FieldType::Dword,
            Self::Int(_) => FieldType::Int,
            Self::Dword64(_) => FieldType::Dword64,
            Self::Int64(_) => FieldType::Int64,
            Self::Float(_) => FieldType::Float,
            Self::Double(_) => FieldType::Double,
            Self::ExoString(_) => FieldType::ExoString,
            Self::ResRef(_) => FieldType::ResRef,
            Self::LocString(_) => FieldType::LocString,
            Self::Void(_) => FieldType::Void,
            Self::Struct(_) => FieldType::Struct,
            Self::List(_) => FieldType::List,
        }
    }

    /// Integer view of any unsigned-compatible scalar.
    pub fn as_u32(&self) -> Option<u32> {
        match *self {
            Self::Byte(v) => Some(u32::from(v)),
            Self::Char(v) => Some(v as u32),
            Self::Word(v) => Some(u32::from(v)),
            Self::Short(v) => Some(v as u32),
            Self::Dword(v) => Some(v),
            Self::Int(v) => Some(v as u32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::ExoString(v) => Some(v),
            Self::ResRef(v) => Some(v.as_str()),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Self::ExoString(v) => Some(v),
            Self::ResRef(v) => Some(v.into()),
            _ => None,
        }
    }

    pub fn into_resref(self) -> Option<ResRef> {
        match self {
            Self::ResRef(v) => Some(v),
            Self::ExoString(v) => Some(ResRef::from_lossy_bytes(v.as_bytes())),
            _ => None,
        }
    }

    pub fn into_locstring(self) -> Option<LocString> {
        match self {
            Self::LocString(v) => Some(v),
            Self::ExoString(v) => Some(LocString::new(v)),
            _ => None,
        }
    }

    pub fn into_list(self) -> Option<Vec<u32>> {
        match self {
            Self::List(v) => Some(v),
            _ => None,
        }
    }
}

struct DataCursor<'a> {
    bytes: &'a [u8],
    at: usize,
}

impl<'a> DataCursor<'a> {
    fn new(bytes: &'a [u8], at: usize) -> Self {
        Self { bytes, at }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], GffError> {
        let end = self
            .at
            .checked_add(len)
            .ok_or_else(|| GffError::malformed("field data", self.at, "length overflows"))?;
        let slice = self.bytes.get(self.at..end).ok_or_else(|| {
            GffError::malformed(
                "field data",
                self.at,
                format!("{len} bytes requested past end of section"),
            )
        })?;
        self.at = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, GffError> {
        Ok(self.take(1)?[0])
    }

    fn u32(&mut self) -> Result<u32, GffError> {
        let at = self.at;
        let value = read_u32_at(self.bytes, at, "field data")?;
        self.at = at + 4;
        Ok(value)
    }

    fn u64(&mut self) -> Result<u64, GffError> {
        let slice = self.take(8)?;
        let mut raw = [0u8; 8];
        raw.copy_from_slice(slice);
        Ok(u64::from_le_bytes(raw))
    }

    fn string(&mut self, len: usize) -> Result<String, GffError> {
        Ok(String::from_utf8_lossy(self.take(len)?).into_owned())
    }
}

pub(super) fn decode(file: &GffFile, field: &RawField) -> Result<FieldValue, GffError> {
    let raw = field.data_or_offset;
    let mut data = DataCursor::new(&file.field_data, raw as usize);
    Ok(match field.field_type {
        FieldType::Byte => FieldValue::Byte(raw as u8),
        FieldType::Char => FieldValue::Char(raw as u8 as i8),
        FieldType::Word => FieldValue::Word(raw as u16),
        FieldType::Short => FieldValue::Short(raw as u16 as i16),
        FieldType::Dword => FieldValue::Dword(raw),
        FieldType::Int => FieldValue::Int(raw as i32),
        FieldType::Float => FieldValue::Float(f32::from_bits(raw)),
        FieldType::Dword64 => FieldValue::Dword64(data.u64()?),
        FieldType::Int64 => FieldValue::Int64(data.u64()? as i64),
        FieldType::Double => FieldValue::Double(f64::from_bits(data.u64()?)),
        FieldType::ExoString => {
            let len = data.u32()? as usize;
            FieldValue::ExoString(data.string(len)?)
        }
        FieldType::ResRef => {
            let len = data.u8()? as usize;
            FieldValue::ResRef(ResRef::from_lossy_bytes(data.take(len)?))
        }
        FieldType::LocString => FieldValue::LocString(decode_locstring(&mut data)?),
        FieldType::Void => {
            let len = data.u32()? as usize;
            FieldValue::Void(data.take(len)?.to_vec())
        }
        FieldType::Struct => {
            file.struct_at(raw)?;
            FieldValue::Struct(raw)
        }
        FieldType::List => FieldValue::List(file.list_at(raw)?),
    })
}

fn decode_locstring(data: &mut DataCursor<'_>) -> Result<LocString, GffError> {
    let start = data.at;
    let total_size = data.u32()? as usize;
    let str_ref = data.u32()?;
    let count = data.u32()?;

    let mut loc = LocString::default();
    loc.set_str_ref(str_ref);
    for _ in 0..count {
        let language = data.u32()?;
        let len = data.u32()? as usize;
        loc.set(language, data.string(len)?);
    }

    let consumed = data.at - start - 4;
    if consumed > total_size {
        return Err(GffError::malformed(
            "field data",
            start,
            format!("localized string declares {total_size} bytes but uses {consumed}"),
        ));
    }
    Ok(loc)
}
