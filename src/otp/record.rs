//! Parsing of built slot configuration records

use super::{
    flags::{ConfigFlags, ExtendedFlags, TicketFlags},
    layout,
};
use crate::{checksum, Error, Result};
use std::fmt;
use zeroize::Zeroizing;

/// A slot configuration record read back into its fields.
///
/// This is the inverse of [`ConfigurationBuilder::build`][super::ConfigurationBuilder::build],
/// reading through the same layout table.
#[derive(Clone, Eq, PartialEq)]
pub struct SlotRecord {
    bytes: Zeroizing<[u8; layout::RECORD_SIZE]>,
}

impl SlotRecord {
    /// Parse a record, verifying its size and checksum.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        if bytes.len() != layout::RECORD_SIZE {
            return Err(Error::SizeError);
        }

        if !checksum::verify(&bytes[..layout::CONFIG_SIZE]) {
            return Err(Error::ChecksumError);
        }

        let mut record = Zeroizing::new([0u8; layout::RECORD_SIZE]);
        record.copy_from_slice(bytes);

        Ok(Self { bytes: record })
    }

    /// Meaningful bytes of the fixed field
    pub fn fixed(&self) -> &[u8] {
        let len = usize::from(self.fixed_len()).min(layout::FIXED_SIZE);
        &self.field(layout::FIXED)[..len]
    }

    /// Value of the fixed length byte
    pub fn fixed_len(&self) -> u8 {
        self.bytes[layout::FIXED_LEN.offset]
    }

    /// Uid field
    pub fn uid(&self) -> &[u8] {
        self.field(layout::UID)
    }

    /// Key field
    pub fn key(&self) -> &[u8] {
        self.field(layout::KEY)
    }

    /// Access code field
    pub fn access_code(&self) -> &[u8] {
        self.field(layout::ACC_CODE)
    }

    /// Current access code appended after the configuration
    pub fn current_access_code(&self) -> &[u8] {
        self.field(layout::CUR_ACC_CODE)
    }

    /// Configuration flags
    pub fn cfg_flags(&self) -> ConfigFlags {
        ConfigFlags::from_bits_retain(self.bytes[layout::CFG_FLAGS.offset])
    }

    /// Extended flags
    pub fn ext_flags(&self) -> ExtendedFlags {
        ExtendedFlags::from_bits_retain(self.bytes[layout::EXT_FLAGS.offset])
    }

    /// Ticket flags
    pub fn tkt_flags(&self) -> TicketFlags {
        TicketFlags::from_bits_retain(self.bytes[layout::TKT_FLAGS.offset])
    }

    /// Stored (inverted) checksum
    pub fn checksum(&self) -> u16 {
        let crc = self.field(layout::CRC);
        u16::from_le_bytes([crc[0], crc[1]])
    }

    /// Borrow the raw record
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..]
    }

    fn field(&self, field: layout::Field) -> &[u8] {
        &self.bytes[field.range()]
    }
}

impl AsRef<[u8]> for SlotRecord {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl fmt::Debug for SlotRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SlotRecord")
            .field("fixed_len", &self.fixed_len())
            .field("cfg_flags", &self.cfg_flags())
            .field("ext_flags", &self.ext_flags())
            .field("tkt_flags", &self.tkt_flags())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::otp::{ConfigurationBuilder, KeyMode};

    #[test]
    fn reads_back_built_fields() {
        let record = ConfigurationBuilder::new()
            .fixed(b"vvcccc")
            .uid(&[1, 2, 3, 4, 5, 6])
            .key(KeyMode::Aes, &[0x42; 16])
            .access_code(b"secret")
            .current_access_code(b"oldpw!")
            .tkt_flags(TicketFlags::APPEND_CR)
            .build();

        let parsed = SlotRecord::parse(&record[..]).unwrap();
        assert_eq!(parsed.fixed(), b"vvcccc");
        assert_eq!(parsed.fixed_len(), 6);
        assert_eq!(parsed.uid(), &[1, 2, 3, 4, 5, 6]);
        assert_eq!(parsed.key(), &[0x42; 16]);
        assert_eq!(parsed.access_code(), b"secret");
        assert_eq!(parsed.current_access_code(), b"oldpw!");
        assert_eq!(parsed.tkt_flags(), TicketFlags::APPEND_CR);
        assert!(parsed.cfg_flags().is_empty());
    }

    #[test]
    fn rejects_wrong_size() {
        let record = ConfigurationBuilder::new().build();
        assert_eq!(
            SlotRecord::parse(&record[..layout::CONFIG_SIZE]),
            Err(Error::SizeError)
        );
    }

    #[test]
    fn rejects_corrupted_checksum() {
        let mut record = ConfigurationBuilder::new().fixed(b"abc").build();
        record[layout::CFG_FLAGS.offset] ^= 0x80;

        assert_eq!(SlotRecord::parse(&record[..]), Err(Error::ChecksumError));
    }

    #[test]
    fn current_access_code_changes_keep_checksum_valid() {
        let mut record = ConfigurationBuilder::new().fixed(b"abc").build();
        record[layout::CUR_ACC_CODE.offset] = 0xff;

        assert!(SlotRecord::parse(&record[..]).is_ok());
    }
}
