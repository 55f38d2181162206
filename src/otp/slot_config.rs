//! Typed slot programs
//!
//! Each constructor picks the key mode and the flag combination its
//! credential type needs, and leaves the byte layout to
//! [`ConfigurationBuilder`].

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
    builder::{ConfigurationBuilder, KeyMode, Record},
    flags::{ConfigFlags, ExtendedFlags, TicketFlags},
    layout, Slot,
};
use crate::{Error, Result};
use log::warn;

/// Whether a program replaces a slot or updates the one stored in it
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Program {
    Configure,
    Update,
}

/// A slot program for one credential type.
#[derive(Clone, Debug)]
pub struct SlotConfiguration {
    program: Program,
    builder: ConfigurationBuilder,
    cfg_flags: ConfigFlags,
    ext_flags: ExtendedFlags,
    tkt_flags: TicketFlags,
}

impl SlotConfiguration {
    /// Yubico OTP: AES key with a public id sent in front of every OTP.
    pub fn yubico_otp(
        public_id: &[u8],
        private_id: &[u8; layout::UID_SIZE],
        key: &[u8; layout::KEY_SIZE],
    ) -> Result<Self> {
        if public_id.len() > layout::FIXED_SIZE {
            return Err(Error::ArgumentError);
        }

        let mut config = Self::keyboard();
        config
            .builder
            .fixed(public_id)
            .uid(private_id)
            .key(KeyMode::Aes, key);

        Ok(config)
    }

    /// HMAC-SHA1 challenge-response with a key of up to 20 bytes.
    pub fn hmac_sha1(key: &[u8], require_touch: bool) -> Result<Self> {
        if key.len() > layout::HMAC_KEY_SIZE {
            return Err(Error::ArgumentError);
        }

        let mut config = Self::new(Program::Configure);
        config.builder.key(KeyMode::HmacSha1, key);
        config.tkt_flags |= TicketFlags::CHAL_RESP;
        config.cfg_flags |= ConfigFlags::CHAL_HMAC | ConfigFlags::HMAC_LT64;

        Ok(config.cfg_flag(ConfigFlags::CHAL_BTN_TRIG, require_touch))
    }

    /// OATH-HOTP with a key of up to 20 bytes.
    pub fn hotp(key: &[u8], eight_digits: bool) -> Result<Self> {
        if key.len() > layout::HMAC_KEY_SIZE {
            return Err(Error::ArgumentError);
        }

        let mut config = Self::keyboard();
        config.builder.key(KeyMode::HmacSha1, key);
        config.tkt_flags |= TicketFlags::OATH_HOTP;

        Ok(config.cfg_flag(ConfigFlags::OATH_HOTP8, eight_digits))
    }

    /// Static password made of up to 38 keyboard scan codes.
    pub fn static_password(scan_codes: &[u8]) -> Result<Self> {
        if scan_codes.len() > layout::SCAN_CODES_SIZE {
            return Err(Error::ArgumentError);
        }

        let mut config = Self::keyboard();
        config.builder.key(KeyMode::Static, scan_codes);
        config.cfg_flags |= ConfigFlags::SHORT_TICKET;

        Ok(config)
    }

    /// Static password derived by the device from an AES key.
    pub fn static_ticket(
        fixed: &[u8],
        uid: &[u8; layout::UID_SIZE],
        key: &[u8; layout::KEY_SIZE],
    ) -> Result<Self> {
        if fixed.len() > layout::FIXED_SIZE {
            return Err(Error::ArgumentError);
        }

        let mut config = Self::keyboard();
        config
            .builder
            .fixed(fixed)
            .uid(uid)
            .key(KeyMode::Aes, key);
        config.cfg_flags |= ConfigFlags::STATIC_TICKET;

        Ok(config)
    }

    /// Update program: changes flags and access code of an existing slot
    /// without touching its credential.
    ///
    /// Ticket and extended flags outside of their update masks are dropped
    /// when the record is built.
    pub fn update() -> Self {
        let mut config = Self::new(Program::Update);
        config.tkt_flags |= TicketFlags::APPEND_CR;
        config
    }

    /// Is this an update program?
    pub fn is_update(&self) -> bool {
        self.program == Program::Update
    }

    /// Command code used to write this program to `slot`
    pub fn command(&self, slot: Slot) -> u8 {
        match self.program {
            Program::Configure => slot.configure_command(),
            Program::Update => slot.update_command(),
        }
    }

    /// Protect the slot with an access code
    pub fn access_code(mut self, code: &[u8]) -> Self {
        self.builder.access_code(code);
        self
    }

    /// Provide the access code currently protecting the slot
    pub fn current_access_code(mut self, code: &[u8]) -> Self {
        self.builder.current_access_code(code);
        self
    }

    /// Set or clear ticket flags
    pub fn tkt_flag(mut self, flags: TicketFlags, enabled: bool) -> Self {
        self.tkt_flags.set(flags, enabled);
        self
    }

    /// Set or clear configuration flags
    pub fn cfg_flag(mut self, flags: ConfigFlags, enabled: bool) -> Self {
        self.cfg_flags.set(flags, enabled);
        self
    }

    /// Set or clear extended flags
    pub fn ext_flag(mut self, flags: ExtendedFlags, enabled: bool) -> Self {
        self.ext_flags.set(flags, enabled);
        self
    }

    /// Builder holding this program's fields and flags
    pub fn to_builder(&self) -> ConfigurationBuilder {
        let (tkt_flags, ext_flags) = match self.program {
            Program::Configure => (self.tkt_flags, self.ext_flags),
            Program::Update => (
                masked("ticket", self.tkt_flags, TicketFlags::UPDATE_MASK),
                masked("extended", self.ext_flags, ExtendedFlags::UPDATE_MASK),
            ),
        };

        let mut builder = self.builder.clone();
        builder
            .cfg_flags(self.cfg_flags)
            .ext_flags(ext_flags)
            .tkt_flags(tkt_flags);
        builder
    }

    /// Serialize this program into a record
    pub fn build(&self) -> Record {
        self.to_builder().build()
    }

    fn new(program: Program) -> Self {
        Self {
            program,
            builder: ConfigurationBuilder::new(),
            cfg_flags: ConfigFlags::empty(),
            ext_flags: ExtendedFlags::SERIAL_API_VISIBLE | ExtendedFlags::ALLOW_UPDATE,
            tkt_flags: TicketFlags::empty(),
        }
    }

    /// Base for programs that type their output over the keyboard interface
    fn keyboard() -> Self {
        let mut config = Self::new(Program::Configure);
        config.tkt_flags |= TicketFlags::APPEND_CR;
        config.ext_flags |= ExtendedFlags::FAST_TRIG;
        config
    }
}

fn masked<F>(kind: &str, flags: F, mask: F) -> F
where
    F: bitflags::Flags<Bits = u8> + Copy,
{
    let kept = flags.intersection(mask);

    if kept.bits() != flags.bits() {
        warn!(
            "dropping {} flags {:#04x} not allowed in an update",
            kind,
            flags.bits() & !mask.bits()
        );
    }

    kept
}
