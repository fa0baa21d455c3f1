// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Colloquy-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Colloquy and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use smol_str::SmolStr;

use super::{
    read_u32_at, FieldType, GffError, GffFile, GffHeader, RawField, RawStruct, GFF_VERSION,
    HEADER_SIZE, LABEL_SIZE,
};

const STRUCT_SIZE: usize = 12;
const FIELD_SIZE: usize = 12;

/// Parses a container into raw tables.
///
/// Every offset and index is bounds-checked; nothing about the payload's meaning is validated.
pub fn read_gff(bytes: &[u8]) -> Result<GffFile, GffError> {
    let header = parse_header(bytes)?;

    let struct_bytes = section(
        bytes,
        "structs",
        header.struct_offset,
        header.struct_count,
        STRUCT_SIZE,
    )?;
    let field_bytes = section(
        bytes,
        "fields",
        header.field_offset,
        header.field_count,
        FIELD_SIZE,
    )?;
    let label_bytes = section(
        bytes,
        "labels",
        header.label_offset,
        header.label_count,
        LABEL_SIZE,
    )?;
    let field_data = section(
        bytes,
        "field data",
        header.field_data_offset,
        header.field_data_size,
        1,
    )?;
    let field_indices = section(
        bytes,
        "field indices",
        header.field_indices_offset,
        header.field_indices_size,
        1,
    )?;
    let list_indices = section(
        bytes,
        "list indices",
        header.list_indices_offset,
        header.list_indices_size,
        1,
    )?;

    let structs = struct_bytes
        .chunks_exact(STRUCT_SIZE)
        .map(|chunk| RawStruct {
            type_id: le_u32(chunk, 0),
            data_or_offset: le_u32(chunk, 4),
            field_count: le_u32(chunk, 8),
        })
        .collect::<Vec<_>>();

    let fields = field_bytes
        .chunks_exact(FIELD_SIZE)
        .enumerate()
        .map(|(index, chunk)| {
            let raw_type = le_u32(chunk, 0);
            let field_type = FieldType::from_u32(raw_type).ok_or_else(|| {
                GffError::malformed(
                    "fields",
                    header.field_offset as usize + index * FIELD_SIZE,
                    format!("unknown field type {raw_type}"),
                )
            })?;
            Ok(RawField {
                field_type,
                label_index: le_u32(chunk, 4),
                data_or_offset: le_u32(chunk, 8),
            })
        })
        .collect::<Result<Vec<_>, GffError>>()?;

    let labels = label_bytes
        .chunks_exact(LABEL_SIZE)
        .map(|chunk| {
            let len = memchr::memchr(0, chunk).unwrap_or(LABEL_SIZE);
            SmolStr::new(String::from_utf8_lossy(&chunk[..len]))
        })
        .collect::<Vec<_>>();

    let file = GffFile {
        header,
        structs,
        fields,
        labels,
        field_data: field_data.to_vec(),
        field_indices: field_indices.to_vec(),
        list_indices: list_indices.to_vec(),
    };
    validate_tables(&file)?;

    tracing::debug!(
        structs = file.structs.len(),
        fields = file.fields.len(),
        labels = file.labels.len(),
        "read container"
    );
    Ok(file)
}

fn parse_header(bytes: &[u8]) -> Result<GffHeader, GffError> {
    if bytes.len() < HEADER_SIZE {
        return Err(GffError::malformed(
            "header",
            bytes.len(),
            format!("need {HEADER_SIZE} header bytes, found {}", bytes.len()),
        ));
    }

    let mut file_type = [0u8; 4];
    file_type.copy_from_slice(&bytes[0..4]);
    let mut file_version = [0u8; 4];
    file_version.copy_from_slice(&bytes[4..8]);
    if file_version != GFF_VERSION {
        return Err(GffError::malformed(
            "header",
            4,
            format!(
                "unsupported version {:?}",
                String::from_utf8_lossy(&file_version)
            ),
        ));
    }

    let word = |index: usize| read_u32_at(bytes, 8 + index * 4, "header");
    Ok(GffHeader {
        file_type,
        file_version,
        struct_offset: word(0)?,
        struct_count: word(1)?,
        field_offset: word(2)?,
        field_count: word(3)?,
        label_offset: word(4)?,
        label_count: word(5)?,
        field_data_offset: word(6)?,
        field_data_size: word(7)?,
        field_indices_offset: word(8)?,
        field_indices_size: word(9)?,
        list_indices_offset: word(10)?,
        list_indices_size: word(11)?,
    })
}

fn section<'a>(
    bytes: &'a [u8],
    name: &'static str,
    offset: u32,
    count: u32,
    element_size: usize,
) -> Result<&'a [u8], GffError> {
    let start = offset as usize;
    let end = (count as usize)
        .checked_mul(element_size)
        .and_then(|len| len.checked_add(start))
        .ok_or_else(|| GffError::malformed(name, start, "section size overflows"))?;
    bytes.get(start..end).ok_or_else(|| {
        GffError::malformed(
            name,
            start,
            format!(
                "section of {} bytes runs past end of buffer ({} bytes)",
                end - start,
                bytes.len()
            ),
        )
    })
}

fn le_u32(chunk: &[u8], at: usize) -> u32 {
    u32::from_le_bytes([chunk[at], chunk[at + 1], chunk[at + 2], chunk[at + 3]])
}

fn validate_tables(file: &GffFile) -> Result<(), GffError> {
    let field_count = file.fields.len() as u64;
    for (index, raw) in file.structs.iter().enumerate() {
        let at = file.header.struct_offset as usize + index * STRUCT_SIZE;
        match raw.field_count {
            0 => {}
            1 => {
                if u64::from(raw.data_or_offset) >= field_count {
                    return Err(GffError::malformed(
                        "structs",
                        at,
                        format!("field index {} out of range", raw.data_or_offset),
                    ));
                }
            }
            count => {
                let end = u64::from(raw.data_or_offset) + u64::from(count) * 4;
                if end > file.field_indices.len() as u64 {
                    return Err(GffError::malformed(
                        "structs",
                        at,
                        format!("{count} field indices at {} run past section", raw.data_or_offset),
                    ));
                }
                for field_index in file.struct_field_indices(index as u32)? {
                    if u64::from(field_index) >= field_count {
                        return Err(GffError::malformed(
                            "field indices",
                            raw.data_or_offset as usize,
                            format!("field index {field_index} out of range"),
                        ));
                    }
                }
            }
        }
    }

    for (index, field) in file.fields.iter().enumerate() {
        if field.label_index as usize >= file.labels.len() {
            return Err(GffError::malformed(
                "fields",
                file.header.field_offset as usize + index * FIELD_SIZE,
                format!("label index {} out of range", field.label_index),
            ));
        }
    }
    Ok(())
}
