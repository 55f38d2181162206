//! Slot configuration record builder

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

use super::{
    flags::{ConfigFlags, ExtendedFlags, TicketFlags},
    layout::{self, Field},
};
use crate::checksum::crc16;
use log::debug;
use std::fmt;
use zeroize::Zeroizing;

/// A serialized slot configuration, ready to be sent to the device.
pub type Record = Zeroizing<[u8; layout::RECORD_SIZE]>;

/// How key material given to [`ConfigurationBuilder::key`] is spread over
/// the fixed, uid and key fields of a record.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum KeyMode {
    /// AES-128 key, stored in the key field
    Aes,

    /// HMAC-SHA1 key of up to 20 bytes: the first 16 go to the key field
    /// and the remaining bytes to the uid field
    HmacSha1,

    /// Static password scan codes, filling the fixed, uid and key fields in
    /// that order
    Static,
}

impl KeyMode {
    /// Number of bytes of key material this mode can store.
    pub fn capacity(self) -> usize {
        match self {
            KeyMode::Aes => layout::KEY_SIZE,
            KeyMode::HmacSha1 => layout::HMAC_KEY_SIZE,
            KeyMode::Static => layout::SCAN_CODES_SIZE,
        }
    }

    fn split(self, material: &[u8]) -> KeySplit<'_> {
        let len = material.len();

        match self {
            KeyMode::Aes => KeySplit {
                key: Some(&material[..len.min(layout::KEY_SIZE)]),
                ..KeySplit::default()
            },
            KeyMode::HmacSha1 => KeySplit {
                uid: (len > layout::KEY_SIZE)
                    .then(|| &material[layout::KEY_SIZE..len.min(layout::HMAC_KEY_SIZE)]),
                key: Some(&material[..len.min(layout::KEY_SIZE)]),
                ..KeySplit::default()
            },
            KeyMode::Static => {
                let uid_start = layout::FIXED_SIZE;
                let key_start = uid_start + layout::UID_SIZE;

                KeySplit {
                    fixed: (len > 0).then(|| &material[..len.min(layout::FIXED_SIZE)]),
                    uid: (len > uid_start).then(|| &material[uid_start..len.min(key_start)]),
                    key: (len > key_start)
                        .then(|| &material[key_start..len.min(layout::SCAN_CODES_SIZE)]),
                }
            }
        }
    }
}

/// Key material assigned to record fields. `None` leaves a field as it was.
#[derive(Default)]
struct KeySplit<'a> {
    fixed: Option<&'a [u8]>,
    uid: Option<&'a [u8]>,
    key: Option<&'a [u8]>,
}

/// Builder for slot configuration records.
///
/// Fields may be set in any order. Inputs longer than their field are
/// truncated. [`ConfigurationBuilder::build`] never fails: any combination
/// of set and unset fields produces a well-formed record, though not
/// necessarily one the device will accept.
#[derive(Clone, Default)]
pub struct ConfigurationBuilder {
    fixed: Option<Zeroizing<Vec<u8>>>,
    uid: Option<Zeroizing<Vec<u8>>>,
    key: Option<Zeroizing<Vec<u8>>>,
    access_code: Option<Zeroizing<Vec<u8>>>,
    current_access_code: Option<Zeroizing<Vec<u8>>>,
    cfg_flags: ConfigFlags,
    ext_flags: ExtendedFlags,
    tkt_flags: TicketFlags,
}

impl ConfigurationBuilder {
    /// Create a builder with every field unset and all flags cleared
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fixed (public id) field, up to 16 bytes
    pub fn fixed(&mut self, fixed: &[u8]) -> &mut Self {
        self.fixed = Some(truncate("fixed", fixed, layout::FIXED_SIZE));
        self
    }

    /// Set the uid (private id) field, up to 6 bytes
    pub fn uid(&mut self, uid: &[u8]) -> &mut Self {
        self.uid = Some(truncate("uid", uid, layout::UID_SIZE));
        self
    }

    /// Set key material, distributing it over fields according to `mode`.
    pub fn key(&mut self, mode: KeyMode, material: &[u8]) -> &mut Self {
        if material.len() > mode.capacity() {
            debug!(
                "{:?} key material truncated from {} to {} bytes",
                mode,
                material.len(),
                mode.capacity()
            );
        }

        let split = mode.split(material);

        if let Some(fixed) = split.fixed {
            self.fixed(fixed);
        }

        if let Some(uid) = split.uid {
            self.uid(uid);
        }

        if let Some(key) = split.key {
            self.key = Some(truncate("key", key, layout::KEY_SIZE));
        }

        self
    }

    /// Set the access code required to reprogram the slot afterwards
    pub fn access_code(&mut self, code: &[u8]) -> &mut Self {
        self.access_code = Some(truncate("access code", code, layout::ACC_CODE_SIZE));
        self
    }

    /// Set the access code currently protecting the slot
    pub fn current_access_code(&mut self, code: &[u8]) -> &mut Self {
        self.current_access_code = Some(truncate(
            "current access code",
            code,
            layout::ACC_CODE_SIZE,
        ));
        self
    }

    /// Set the configuration flags.
    ///
    /// No validation is performed: using only documented combinations is
    /// the caller's responsibility.
    pub fn cfg_flags(&mut self, flags: ConfigFlags) -> &mut Self {
        self.cfg_flags = flags;
        self
    }

    /// Set the extended flags
    pub fn ext_flags(&mut self, flags: ExtendedFlags) -> &mut Self {
        self.ext_flags = flags;
        self
    }

    /// Set the ticket flags
    pub fn tkt_flags(&mut self, flags: TicketFlags) -> &mut Self {
        self.tkt_flags = flags;
        self
    }

    /// Serialize the configuration into a record.
    pub fn build(&self) -> Record {
        let mut record = Zeroizing::new([0u8; layout::RECORD_SIZE]);

        put(&mut record[..], layout::FIXED, &self.fixed);
        put(&mut record[..], layout::UID, &self.uid);
        put(&mut record[..], layout::KEY, &self.key);
        put(&mut record[..], layout::ACC_CODE, &self.access_code);
        put(
            &mut record[..],
            layout::CUR_ACC_CODE,
            &self.current_access_code,
        );

        if let Some(fixed) = &self.fixed {
            record[layout::FIXED_LEN.offset] = fixed.len() as u8;
        }

        record[layout::EXT_FLAGS.offset] = self.ext_flags.bits();
        record[layout::TKT_FLAGS.offset] = self.tkt_flags.bits();
        record[layout::CFG_FLAGS.offset] = self.cfg_flags.bits();

        let crc = !crc16(&record[..layout::CRC.offset]);
        record[layout::CRC.range()].copy_from_slice(&crc.to_le_bytes());

        record
    }
}

impl fmt::Debug for ConfigurationBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let len = |value: &Option<Zeroizing<Vec<u8>>>| value.as_ref().map(|v| v.len());

        f.debug_struct("ConfigurationBuilder")
            .field("fixed_len", &len(&self.fixed))
            .field("uid_len", &len(&self.uid))
            .field("key_len", &len(&self.key))
            .field("access_code_len", &len(&self.access_code))
            .field("current_access_code_len", &len(&self.current_access_code))
            .field("cfg_flags", &self.cfg_flags)
            .field("ext_flags", &self.ext_flags)
            .field("tkt_flags", &self.tkt_flags)
            .finish()
    }
}

/// Copy at most `max` bytes of `value`, noting any truncation.
fn truncate(field: &str, value: &[u8], max: usize) -> Zeroizing<Vec<u8>> {
    if value.len() > max {
        debug!(
            "{} truncated from {} to {} bytes",
            field,
            value.len(),
            max
        );
    }

    Zeroizing::new(value[..value.len().min(max)].to_vec())
}

fn put(record: &mut [u8], field: Field, value: &Option<Zeroizing<Vec<u8>>>) {
    if let Some(value) = value {
        debug_assert!(value.len() <= field.size);
        record[field.offset..field.offset + value.len()].copy_from_slice(value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checksum;

    fn sequence(len: usize) -> Vec<u8> {
        (1..=len as u8).collect()
    }

    #[test]
    fn empty_builder_builds_zeroed_record() {
        let record = ConfigurationBuilder::new().build();

        assert_eq!(record.len(), layout::RECORD_SIZE);
        assert!(record[..layout::CRC.offset].iter().all(|&b| b == 0));
        assert!(checksum::verify(&record[..layout::CONFIG_SIZE]));
    }

    #[test]
    fn fields_land_at_their_offsets() {
        let record = ConfigurationBuilder::new()
            .fixed(&[0xf1; 4])
            .uid(&[0xa1; 6])
            .key(KeyMode::Aes, &[0xb1; 16])
            .access_code(&[0xc1; 6])
            .current_access_code(&[0xd1; 6])
            .ext_flags(ExtendedFlags::SERIAL_API_VISIBLE)
            .tkt_flags(TicketFlags::APPEND_CR)
            .cfg_flags(ConfigFlags::CHAL_HMAC)
            .build();

        assert_eq!(&record[0..4], &[0xf1; 4]);
        assert_eq!(&record[4..16], &[0; 12]);
        assert_eq!(&record[16..22], &[0xa1; 6]);
        assert_eq!(&record[22..38], &[0xb1; 16]);
        assert_eq!(&record[38..44], &[0xc1; 6]);
        assert_eq!(record[44], 4);
        assert_eq!(record[45], 0x04);
        assert_eq!(record[46], 0x20);
        assert_eq!(record[47], 0x22);
        assert_eq!(&record[48..50], &[0, 0]);
        assert_eq!(&record[52..58], &[0xd1; 6]);
    }

    #[test]
    fn stored_checksum_is_inverted_crc() {
        let record = ConfigurationBuilder::new()
            .key(KeyMode::HmacSha1, &sequence(20))
            .tkt_flags(TicketFlags::CHAL_RESP)
            .build();

        let stored = u16::from_le_bytes([record[50], record[51]]);
        assert_eq!(stored, !crc16(&record[..50]));
    }

    #[test]
    fn current_access_code_is_not_checksummed() {
        let mut builder = ConfigurationBuilder::new();
        builder.fixed(b"public");
        let without = builder.build();

        builder.current_access_code(&[1, 2, 3, 4, 5, 6]);
        let with = builder.build();

        assert_eq!(&without[..52], &with[..52]);
    }

    #[test]
    fn build_is_repeatable() {
        let mut builder = ConfigurationBuilder::new();
        builder.key(KeyMode::Static, &sequence(30));

        assert_eq!(*builder.build(), *builder.build());
    }

    #[test]
    fn over_long_inputs_are_truncated() {
        let record = ConfigurationBuilder::new()
            .fixed(&sequence(20))
            .uid(&sequence(9))
            .access_code(&sequence(8))
            .build();

        assert_eq!(&record[0..16], &sequence(16)[..]);
        assert_eq!(record[44], 16);
        assert_eq!(&record[16..22], &sequence(6)[..]);
        assert_eq!(&record[38..44], &sequence(6)[..]);
    }

    #[test]
    fn hmac_key_spills_into_uid() {
        for len in 0..=20 {
            let key = sequence(len);
            let record = ConfigurationBuilder::new()
                .key(KeyMode::HmacSha1, &key)
                .build();

            let stored = len.min(16);
            assert_eq!(&record[22..22 + stored], &key[..stored]);

            if len > 16 {
                assert_eq!(&record[16..len], &key[16..len]);
                assert_eq!(&record[len..22], &vec![0; 22 - len][..]);
            } else {
                assert_eq!(&record[16..22], &[0; 6]);
            }
        }
    }

    #[test]
    fn hmac_key_keeps_previous_uid_when_short() {
        let mut builder = ConfigurationBuilder::new();
        builder.uid(&[9; 6]).key(KeyMode::HmacSha1, &[1; 16]);

        assert_eq!(&builder.build()[16..22], &[9; 6]);
    }

    #[test]
    fn static_key_of_twenty_bytes() {
        let material = sequence(20);
        let record = ConfigurationBuilder::new()
            .key(KeyMode::Static, &material)
            .build();

        assert_eq!(&record[0..16], &material[..16]);
        assert_eq!(record[44], 16);
        assert_eq!(&record[16..20], &material[16..20]);
        assert_eq!(&record[20..22], &[0, 0]);
        assert_eq!(&record[22..38], &[0; 16]);
    }

    #[test]
    fn static_key_fills_all_fields() {
        let material = sequence(45);
        let record = ConfigurationBuilder::new()
            .key(KeyMode::Static, &material)
            .build();

        assert_eq!(&record[0..38], &material[..38]);
    }

    #[test]
    fn empty_static_key_sets_nothing() {
        let record = ConfigurationBuilder::new()
            .key(KeyMode::Static, &[])
            .build();

        assert_eq!(record[44], 0);
        assert!(record[..38].iter().all(|&b| b == 0));
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut builder = ConfigurationBuilder::new();
        builder.key(KeyMode::Aes, &[0x5a; 16]);

        let debug = format!("{:?}", builder);
        assert!(debug.contains("key_len: Some(16)"));
        assert!(!debug.contains("key:"));
        assert!(!debug.contains('['));
    }
}
