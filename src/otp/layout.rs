//! Byte layout of a slot configuration record
//!
//! Every field is placed directly after the previous one, so the table below
//! is the only place where offsets are derived.

// Adapted from yubikit-android:
// <https://github.com/Yubico/yubikit-android/>
//
// Copyright (C) 2020-2022 Yubico.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//       http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use core::ops::Range;

/// Size of the fixed (public id) field
pub const FIXED_SIZE: usize = 16;

/// Size of the secret (private) id field
pub const UID_SIZE: usize = 6;

/// Size of the AES key field
pub const KEY_SIZE: usize = 16;

/// Size of an HMAC-SHA1 key: the key field plus the first four bytes of the
/// uid field
pub const HMAC_KEY_SIZE: usize = 20;

/// Size of an access code used to reprogram a slot
pub const ACC_CODE_SIZE: usize = 6;

/// Number of scan codes a static password can hold: fixed, uid and key
pub const SCAN_CODES_SIZE: usize = FIXED_SIZE + UID_SIZE + KEY_SIZE;

/// Location of a field within a record.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Field {
    /// Offset of the first byte
    pub offset: usize,

    /// Size in bytes
    pub size: usize,
}

impl Field {
    const fn first(size: usize) -> Self {
        Self { offset: 0, size }
    }

    const fn next(self, size: usize) -> Self {
        Self {
            offset: self.end(),
            size,
        }
    }

    /// Offset one past the last byte of this field
    pub const fn end(self) -> usize {
        self.offset + self.size
    }

    /// Byte range covered by this field
    pub fn range(self) -> Range<usize> {
        self.offset..self.end()
    }
}

/// Fixed (public id) field
pub const FIXED: Field = Field::first(FIXED_SIZE);

/// Secret id field
pub const UID: Field = FIXED.next(UID_SIZE);

/// Key field
pub const KEY: Field = UID.next(KEY_SIZE);

/// Access code required for subsequent reprogramming
pub const ACC_CODE: Field = KEY.next(ACC_CODE_SIZE);

/// Number of meaningful bytes in the fixed field
pub const FIXED_LEN: Field = ACC_CODE.next(1);

/// Extended flags byte
pub const EXT_FLAGS: Field = FIXED_LEN.next(1);

/// Ticket flags byte
pub const TKT_FLAGS: Field = EXT_FLAGS.next(1);

/// Configuration flags byte
pub const CFG_FLAGS: Field = TKT_FLAGS.next(1);

/// Reserved for future use, always zero
pub const RFU: Field = CFG_FLAGS.next(2);

/// Inverted CRC-16 over everything before it, little-endian
pub const CRC: Field = RFU.next(2);

/// Size of the checksummed configuration
pub const CONFIG_SIZE: usize = CRC.end();

/// Current access code, appended after the configuration
pub const CUR_ACC_CODE: Field = CRC.next(ACC_CODE_SIZE);

/// Size of a complete record as sent to the device
pub const RECORD_SIZE: usize = CUR_ACC_CODE.end();

const _: () = assert!(FIXED_LEN.offset == 44);
const _: () = assert!(CFG_FLAGS.offset == 47);
const _: () = assert!(CRC.offset == 50);
const _: () = assert!(CONFIG_SIZE == 52);
const _: () = assert!(RECORD_SIZE == 58);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_contiguous() {
        let fields = [
            FIXED,
            UID,
            KEY,
            ACC_CODE,
            FIXED_LEN,
            EXT_FLAGS,
            TKT_FLAGS,
            CFG_FLAGS,
            RFU,
            CRC,
            CUR_ACC_CODE,
        ];

        let mut offset = 0;
        for field in fields {
            assert_eq!(field.offset, offset);
            offset = field.end();
        }

        assert_eq!(offset, RECORD_SIZE);
    }

    #[test]
    fn key_field_offsets() {
        assert_eq!(UID.range(), 16..22);
        assert_eq!(KEY.range(), 22..38);
        assert_eq!(ACC_CODE.range(), 38..44);
        assert_eq!(CUR_ACC_CODE.range(), 52..58);
    }
}
