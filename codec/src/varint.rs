// Copyright 2022 Twitter, Inc.
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

//! ZigZag-LEB128 varints, as used by the histogram payload encoding (§4.10).
//! ZigZag maps signed integers to unsigned ones (`0, -1, 1, -2, 2, ...` ->
//! `0, 1, 2, 3, 4, ...`) so that small-magnitude negative numbers stay
//! cheap to encode; LEB128 then packs the unsigned value 7 bits at a time.

use crate::Error;

pub fn write_zigzag_i32(buffer: &mut Vec<u8>, value: i32) {
    write_leb128(buffer, (((value << 1) ^ (value >> 31)) as u32) as u64);
}

pub fn write_zigzag_i64(buffer: &mut Vec<u8>, value: i64) {
    write_leb128(buffer, ((value << 1) ^ (value >> 63)) as u64);
}

fn write_leb128(buffer: &mut Vec<u8>, mut value: u64) {
    loop {
        let mut byte = (value & 0x7f) as u8;
        value >>= 7;
        if value != 0 {
            byte |= 0x80;
        }
        buffer.push(byte);
        if value == 0 {
            break;
        }
    }
}

pub fn read_zigzag_i32(bytes: &[u8], cursor: &mut usize) -> Result<i32, Error> {
    let raw = read_leb128(bytes, cursor)? as u32;
    Ok(((raw >> 1) as i32) ^ -((raw & 1) as i32))
}

pub fn read_zigzag_i64(bytes: &[u8], cursor: &mut usize) -> Result<i64, Error> {
    let raw = read_leb128(bytes, cursor)?;
    Ok(((raw >> 1) as i64) ^ -((raw & 1) as i64))
}

fn read_leb128(bytes: &[u8], cursor: &mut usize) -> Result<u64, Error> {
    let mut result = 0_u64;
    let mut shift = 0_u32;
    loop {
        let byte = *bytes
            .get(*cursor)
            .ok_or(Error::Malformed("varint truncated"))?;
        *cursor += 1;
        result |= u64::from(byte & 0x7f) << shift;
        if byte & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
        if shift >= 64 {
            return Err(Error::Malformed("varint too long"));
        }
    }
}
