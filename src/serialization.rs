//! Tag-Length-Value (TLV) serialization
//!
//! Tags follow BER rules: a first byte whose low five bits are all set is
//! followed by continuation bytes until one has its high bit clear. Lengths
//! are either short form (`< 0x80`) or long form `0x81`..=`0x83` followed by
//! one to three big-endian length bytes.

// Adapted from yubico-piv-tool:
// <https://github.com/Yubico/yubico-piv-tool/>
//
// Copyright (c) 2014-2016 Yubico AB
// All rights reserved.
//
// Redistribution and use in source and binary forms, with or without
// modification, are permitted provided that the following conditions are
// met:
//
//   * Redistributions of source code must retain the above copyright
//     notice, this list of conditions and the following disclaimer.
//
//   * Redistributions in binary form must reproduce the above
//     copyright notice, this list of conditions and the following
//     disclaimer in the documentation and/or other materials provided
//     with the distribution.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS
// "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT
// LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR
// A PARTICULAR PURPOSE ARE DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT
// OWNER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT
// LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR SERVICES; LOSS OF USE,
// DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY
// THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT
// (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
// OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use crate::{Error, Result};
use nom::{
    bytes::complete::take,
    combinator::eof,
    error::{Error as NumError, ErrorKind},
    multi::many0,
    number::complete::u8,
    IResult,
};
use std::collections::BTreeMap;

/// Largest length encodable in long form (three length bytes)
const LENGTH_MAX: usize = 0x00ff_ffff;

/// Tag values mapped to the value bytes they carry.
pub type TlvMap<'a> = BTreeMap<u32, &'a [u8]>;

/// A Type-Length-Value object that has been parsed from a buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Tlv<'a> {
    /// Tag, with multi-byte tags packed big-endian
    pub tag: u32,

    /// Value bytes
    pub value: &'a [u8],
}

impl<'a> Tlv<'a> {
    /// Parses a `Tlv` from a buffer, returning the remainder of the buffer.
    pub fn parse(buffer: &'a [u8]) -> Result<(&'a [u8], Self)> {
        Self::parser(buffer).map_err(|_| malformed())
    }

    /// Writes a TLV to the end of the given buffer, returning the number of
    /// bytes written.
    pub fn write(buffer: &mut Vec<u8>, tag: u32, value: &[u8]) -> Result<usize> {
        let length = encode_length(value.len())?;
        let tag = tag.to_be_bytes();

        // keep at least the final tag byte so that tag 0 still encodes
        let skip = tag.iter().take(3).take_while(|&&byte| byte == 0).count();

        let start = buffer.len();
        buffer.extend_from_slice(&tag[skip..]);
        buffer.extend_from_slice(&length);
        buffer.extend_from_slice(value);

        Ok(buffer.len() - start)
    }

    fn parser(input: &'a [u8]) -> IResult<&'a [u8], Self> {
        let (input, tag) = parse_tag(input)?;
        let (input, length) = parse_length(input)?;
        let (input, value) = take(length)(input)?;

        Ok((input, Tlv { tag, value }))
    }
}

/// Decode a complete TLV stream into a map from tag to value.
///
/// When a tag occurs more than once the last occurrence wins. Trailing bytes
/// that do not form a complete TLV are an error.
pub fn decode_map(buffer: &[u8]) -> Result<TlvMap<'_>> {
    let (input, tlvs) = many0(Tlv::parser)(buffer).map_err(|_| malformed())?;
    eof(input).map_err(|_: nom::Err<NumError<&[u8]>>| malformed())?;

    Ok(tlvs.into_iter().map(|tlv| (tlv.tag, tlv.value)).collect())
}

/// Read a big-endian unsigned integer of variable length.
///
/// An empty value reads as 0. Values longer than four bytes keep their
/// low 32 bits.
pub fn read_uint(value: &[u8]) -> u32 {
    value
        .iter()
        .fold(0, |acc: u32, &byte| (acc << 8) | u32::from(byte))
}

fn malformed() -> Error {
    Error::MalformedResponse {
        reason: "invalid TLV encoding",
    }
}

fn parse_tag(input: &[u8]) -> IResult<&[u8], u32> {
    let (mut input, first) = u8(input)?;
    let mut tag = u32::from(first);

    if first & 0x1f == 0x1f {
        loop {
            if tag > 0x00ff_ffff {
                return Err(nom::Err::Error(NumError::new(input, ErrorKind::TooLarge)));
            }

            let (rest, byte) = u8(input)?;
            input = rest;
            tag = (tag << 8) | u32::from(byte);

            if byte & 0x80 == 0 {
                break;
            }
        }
    }

    Ok((input, tag))
}

fn parse_length(input: &[u8]) -> IResult<&[u8], usize> {
    let (input, first) = u8(input)?;

    match first {
        0x00..=0x7f => Ok((input, usize::from(first))),
        0x81..=0x83 => {
            let (input, bytes) = take(usize::from(first & 0x7f))(input)?;
            let length = bytes
                .iter()
                .fold(0, |len: usize, &byte| (len << 8) | usize::from(byte));
            Ok((input, length))
        }
        // 0x80 is the indefinite length marker, which is not used here
        _ => Err(nom::Err::Error(NumError::new(input, ErrorKind::LengthValue))),
    }
}

fn encode_length(length: usize) -> Result<Vec<u8>> {
    let bytes = (length as u32).to_be_bytes();

    match length {
        0..=0x7f => Ok(vec![bytes[3]]),
        0x80..=0xff => Ok(vec![0x81, bytes[3]]),
        0x100..=0xffff => Ok(vec![0x82, bytes[2], bytes[3]]),
        0x1_0000..=LENGTH_MAX => Ok(vec![0x83, bytes[1], bytes[2], bytes[3]]),
        _ => Err(Error::SizeError),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_returns_remainder() {
        let buffer = [0x01, 0x02, 0xaa, 0xbb, 0x02, 0x00];
        let (rest, tlv) = Tlv::parse(&buffer).unwrap();

        assert_eq!(tlv.tag, 0x01);
        assert_eq!(tlv.value, &[0xaa, 0xbb]);
        assert_eq!(rest, &[0x02, 0x00]);
    }

    #[test]
    fn parse_multi_byte_tag() {
        let buffer = [0x7f, 0x49, 0x01, 0x05];
        let (rest, tlv) = Tlv::parse(&buffer).unwrap();

        assert_eq!(tlv.tag, 0x7f49);
        assert_eq!(tlv.value, &[0x05]);
        assert!(rest.is_empty());
    }

    #[test]
    fn parse_long_form_length() {
        let mut buffer = vec![0x53, 0x81, 0x80];
        buffer.extend_from_slice(&[0x11; 0x80]);

        let (rest, tlv) = Tlv::parse(&buffer).unwrap();
        assert_eq!(tlv.value.len(), 0x80);
        assert!(rest.is_empty());
    }

    #[test]
    fn parse_rejects_truncated_value() {
        assert!(Tlv::parse(&[0x01, 0x04, 0x00, 0x01]).is_err());
        assert!(Tlv::parse(&[0x01]).is_err());
        assert!(Tlv::parse(&[0x01, 0x80]).is_err());
    }

    #[test]
    fn decode_map_last_duplicate_wins() {
        let map = decode_map(&[0x01, 0x01, 0x0a, 0x02, 0x00, 0x01, 0x01, 0x0b]).unwrap();

        assert_eq!(map.len(), 2);
        assert_eq!(map[&0x01], &[0x0b]);
        assert_eq!(map[&0x02], &[] as &[u8]);
    }

    #[test]
    fn decode_map_rejects_trailing_garbage() {
        let err = decode_map(&[0x01, 0x01, 0x0a, 0x02]).unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn decode_map_empty() {
        assert!(decode_map(&[]).unwrap().is_empty());
    }

    #[test]
    fn write_encodes_tag_and_length() {
        let mut buffer = vec![];
        assert_eq!(Tlv::write(&mut buffer, 0x0c, &[]).unwrap(), 2);
        assert_eq!(buffer, [0x0c, 0x00]);

        let mut buffer = vec![];
        let value = [0x42; 0x100];
        assert_eq!(Tlv::write(&mut buffer, 0x7f49, &value).unwrap(), 0x105);
        assert_eq!(&buffer[..5], &[0x7f, 0x49, 0x82, 0x01, 0x00]);

        let map = decode_map(&buffer).unwrap();
        assert_eq!(map[&0x7f49], &value[..]);
    }

    #[test]
    fn read_uint_big_endian() {
        assert_eq!(read_uint(&[]), 0);
        assert_eq!(read_uint(&[0x01]), 1);
        assert_eq!(read_uint(&[0x01, 0x2c]), 300);
        assert_eq!(read_uint(&[0x00, 0xbc, 0x61, 0x4e]), 12_345_678);
        assert_eq!(read_uint(&[0xff, 0x00, 0x00, 0x00, 0x01]), 1);
    }
}
