//! CRC-16 checksum used by configuration records
//!
//! This is the ISO/IEC 13239 CRC (reflected polynomial `0x8408`, initial
//! value `0xffff`). Records store the one's complement of the CRC in
//! little-endian order, which makes a CRC over the data followed by its
//! checksum land on a fixed residual.

/// Reflected CRC-16 polynomial
const POLYNOMIAL: u16 = 0x8408;

/// Residual of a CRC computed over data followed by its stored checksum
pub const CRC_OK_RESIDUAL: u16 = 0xf0b8;

/// Compute the raw (non-inverted) CRC-16 over `data`.
pub fn crc16(data: &[u8]) -> u16 {
    data.iter().fold(0xffff, |mut crc, &byte| {
        crc ^= u16::from(byte);

        for _ in 0..8 {
            let carry = crc & 1 != 0;
            crc >>= 1;

            if carry {
                crc ^= POLYNOMIAL;
            }
        }

        crc
    })
}

/// Does `data` end with a valid inverted little-endian CRC over the bytes
/// preceding it?
pub fn verify(data: &[u8]) -> bool {
    crc16(data) == CRC_OK_RESIDUAL
}
