//! Flag bytes of a slot configuration
//!
//! Several configuration flag bits carry different meanings depending on
//! the mode a slot is programmed in, which is why some values are declared
//! more than once under different names.

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

use bitflags::bitflags;

bitflags! {
    /// Ticket flags
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    pub struct TicketFlags: u8 {
        /// Send TAB before first part
        const TAB_FIRST = 0x01;

        /// Send TAB after first part
        const APPEND_TAB1 = 0x02;

        /// Send TAB after second part
        const APPEND_TAB2 = 0x04;

        /// Add 0.5s delay after first part
        const APPEND_DELAY1 = 0x08;

        /// Add 0.5s delay after second part
        const APPEND_DELAY2 = 0x10;

        /// Append CR as final character
        const APPEND_CR = 0x20;

        /// OATH HOTP mode
        const OATH_HOTP = 0x40;

        /// Challenge-response enabled (requires a challenge type in the
        /// configuration flags as well)
        const CHAL_RESP = 0x40;

        /// Block update of config 2 unless config 2 is configured and has
        /// this bit set
        const PROTECT_CFG2 = 0x80;
    }
}

impl TicketFlags {
    /// Ticket flags which may be changed by an update program
    pub const UPDATE_MASK: Self = Self::APPEND_CR;
}

bitflags! {
    /// Configuration flags
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    pub struct ConfigFlags: u8 {
        /// Send reference string (0..F) before data
        const SEND_REF = 0x01;

        /// Send ticket first (default is fixed part)
        const TICKET_FIRST = 0x02;

        /// Add 10ms intra-key pacing
        const PACING_10MS = 0x04;

        /// Add 20ms intra-key pacing
        const PACING_20MS = 0x08;

        /// Allow trigger through HID/keyboard
        const ALLOW_HIDTRIG = 0x10;

        /// Static ticket generation
        const STATIC_TICKET = 0x20;

        // Static password modes

        /// Send truncated ticket (half length)
        const SHORT_TICKET = 0x02;

        /// Strong password policy flag #1 (mixed case)
        const STRONG_PW1 = 0x10;

        /// Strong password policy flag #2 (substitute 0..7 to digits)
        const STRONG_PW2 = 0x40;

        /// Allow manual (local) update of static OTP
        const MAN_UPDATE = 0x80;

        // OATH HOTP mode

        /// Generate 8 digits HOTP rather than 6 digits
        const OATH_HOTP8 = 0x02;

        /// First byte in fixed part sent as modhex
        const OATH_FIXED_MODHEX1 = 0x10;

        /// First two bytes in fixed part sent as modhex
        const OATH_FIXED_MODHEX2 = 0x40;

        /// Fixed part sent as modhex
        const OATH_FIXED_MODHEX = 0x50;

        /// Mask to get out fixed flags
        const OATH_FIXED_MASK = 0x50;

        // Challenge-response mode

        /// Mask to get out challenge type
        const CHAL_MASK = 0x22;

        /// Flag to indicate if configuration is challenge-response
        const IS_CHAL_RESP = 0x20;

        /// Challenge-response enabled, Yubico OTP mode
        const CHAL_YUBICO = 0x20;

        /// Challenge-response enabled, HMAC-SHA1
        const CHAL_HMAC = 0x22;

        /// Set when HMAC message is less than 64 bytes
        const HMAC_LT64 = 0x04;

        /// Challenge-response operation requires button press
        const CHAL_BTN_TRIG = 0x08;
    }
}

bitflags! {
    /// Extended flags
    #[derive(Copy, Clone, Debug, Default, Eq, Hash, PartialEq)]
    pub struct ExtendedFlags: u8 {
        /// Serial number visible at startup (button press)
        const SERIAL_BTN_VISIBLE = 0x01;

        /// Serial number visible in USB iSerial field
        const SERIAL_USB_VISIBLE = 0x02;

        /// Serial number visible via API call
        const SERIAL_API_VISIBLE = 0x04;

        /// Use numeric keypad for digits
        const USE_NUMERIC_KEYPAD = 0x08;

        /// Use fast trig if only cfg1 set
        const FAST_TRIG = 0x10;

        /// Allow update of existing configuration (selected flags + access code)
        const ALLOW_UPDATE = 0x20;

        /// Dormant configuration (can be woken up and flag removed, requires
        /// the update flag)
        const DORMANT = 0x40;
    }
}

impl ExtendedFlags {
    /// Extended flags which may be changed by an update program
    pub const UPDATE_MASK: Self = Self::SERIAL_API_VISIBLE.union(Self::ALLOW_UPDATE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_masks() {
        assert_eq!(TicketFlags::UPDATE_MASK.bits(), 0x20);
        assert_eq!(ExtendedFlags::UPDATE_MASK.bits(), 0x24);
    }

    #[test]
    fn combined_config_flags() {
        assert_eq!(
            ConfigFlags::CHAL_HMAC,
            ConfigFlags::IS_CHAL_RESP | ConfigFlags::SHORT_TICKET
        );
        assert_eq!(
            ConfigFlags::OATH_FIXED_MODHEX,
            ConfigFlags::OATH_FIXED_MODHEX1 | ConfigFlags::OATH_FIXED_MODHEX2
        );
        assert_eq!(ConfigFlags::CHAL_MASK.bits(), 0x22);
    }

    #[test]
    fn unknown_bits_are_retained() {
        let flags = ExtendedFlags::from_bits_retain(0x80 | 0x04);
        assert_eq!(flags.bits(), 0x84);
        assert!(flags.contains(ExtendedFlags::SERIAL_API_VISIBLE));
    }
}
