//! Device information reported by the management application

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
    Capability, DeviceConfig, DeviceFlags, FormFactor, Serial, Transport,
    TAG_AUTO_EJECT_TIMEOUT, TAG_CHALLENGE_RESPONSE_TIMEOUT, TAG_CONFIG_LOCK, TAG_DEVICE_FLAGS,
    TAG_FIRMWARE_VERSION, TAG_FORM_FACTOR, TAG_NFC_ENABLED, TAG_NFC_SUPPORTED, TAG_SERIAL_NUMBER,
    TAG_USB_ENABLED, TAG_USB_SUPPORTED,
};
use crate::{
    serialization::{decode_map, read_uint, TlvMap},
    Error, Result, Version,
};
use log::{debug, trace, warn};
use std::collections::BTreeMap;

/// Form factor byte bit set on FIPS models
const FORM_FACTOR_FIPS: u32 = 0x80;

/// Form factor byte bit set on Security Key models
const FORM_FACTOR_SKY: u32 = 0x40;

/// Correction applied to a decoded response for firmware which reports
/// some values incorrectly.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Fix {
    /// Replace the USB supported capabilities
    UsbSupported(Capability),

    /// Discard the reported USB enabled capabilities
    IgnoreUsbEnabled,
}

struct Quirk {
    description: &'static str,
    applies: fn(Version) -> bool,
    fix: Fix,
}

/// Firmware quirks, in the order they are applied.
const QUIRKS: &[Quirk] = &[
    Quirk {
        description: "4.2.4 does not report supported capabilities",
        applies: |version| version == Version::new(4, 2, 4),
        fix: Fix::UsbSupported(Capability::from_bits_retain(0x3f)),
    },
    Quirk {
        description: "4.x reports enabled USB capabilities incorrectly",
        applies: |version| version.major == 4,
        fix: Fix::IgnoreUsbEnabled,
    },
];

/// Metadata describing a YubiKey and its current configuration.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeviceInfo {
    config: DeviceConfig,
    serial: Option<Serial>,
    version: Version,
    form_factor: FormFactor,
    supported_capabilities: BTreeMap<Transport, Capability>,
    is_locked: bool,
    is_fips: bool,
    is_sky: bool,
}

impl DeviceInfo {
    /// Parse a device info response.
    ///
    /// The first byte is the length of the TLV payload which follows it.
    /// `default_version` is used when the response does not carry a
    /// firmware version, which older devices omit.
    pub fn parse(response: &[u8], default_version: Version) -> Result<Self> {
        let (&length, payload) = response.split_first().ok_or(Error::MalformedResponse {
            reason: "empty response",
        })?;

        if usize::from(length) != payload.len() {
            return Err(Error::MalformedResponse {
                reason: "invalid length",
            });
        }

        let data = decode_map(payload)?;
        trace!("device info tags: {:02x?}", data.keys().collect::<Vec<_>>());

        let form_factor = uint(&data, TAG_FORM_FACTOR);
        let version = firmware_version(&data, default_version);

        let mut usb_supported = Capability::from_bits_retain(uint(&data, TAG_USB_SUPPORTED));
        let mut usb_enabled = data
            .get(&TAG_USB_ENABLED)
            .map(|value| Capability::from_bits_retain(read_uint(value)));

        for quirk in QUIRKS.iter().filter(|quirk| (quirk.applies)(version)) {
            debug!("firmware {}: {}", version, quirk.description);

            match quirk.fix {
                Fix::UsbSupported(caps) => usb_supported = caps,
                Fix::IgnoreUsbEnabled => usb_enabled = None,
            }
        }

        let mut supported_capabilities = BTreeMap::new();
        let mut enabled_capabilities = BTreeMap::new();

        supported_capabilities.insert(Transport::Usb, usb_supported);

        if let Some(caps) = usb_enabled {
            enabled_capabilities.insert(Transport::Usb, caps);
        }

        if let Some(value) = data.get(&TAG_NFC_SUPPORTED) {
            supported_capabilities.insert(
                Transport::Nfc,
                Capability::from_bits_retain(read_uint(value)),
            );
            enabled_capabilities.insert(
                Transport::Nfc,
                Capability::from_bits_retain(uint(&data, TAG_NFC_ENABLED)),
            );
        }

        let config = DeviceConfig {
            enabled_capabilities,
            auto_eject_timeout: Some(uint(&data, TAG_AUTO_EJECT_TIMEOUT) as u16),
            challenge_response_timeout: Some(uint(&data, TAG_CHALLENGE_RESPONSE_TIMEOUT) as u8),
            device_flags: Some(DeviceFlags::from_bits_retain(uint(&data, TAG_DEVICE_FLAGS))),
        };

        let serial = match uint(&data, TAG_SERIAL_NUMBER) {
            0 => None,
            serial => Some(Serial(serial)),
        };

        Ok(Self {
            config,
            serial,
            version,
            form_factor: FormFactor::from_code(form_factor),
            supported_capabilities,
            is_locked: uint(&data, TAG_CONFIG_LOCK) == 1,
            is_fips: form_factor & FORM_FACTOR_FIPS != 0,
            is_sky: form_factor & FORM_FACTOR_SKY != 0,
        })
    }

    /// Current mutable configuration
    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Serial number, if the device reports one.
    ///
    /// Devices only report a serial number when it is set and one of the
    /// OTP slots allows reading it over the API.
    pub fn serial(&self) -> Option<Serial> {
        self.serial
    }

    /// Firmware version
    pub fn version(&self) -> Version {
        self.version
    }

    /// Physical form factor
    pub fn form_factor(&self) -> FormFactor {
        self.form_factor
    }

    /// Is `transport` available on this device?
    pub fn has_transport(&self, transport: Transport) -> bool {
        self.supported_capabilities.contains_key(&transport)
    }

    /// Transports available on this device
    pub fn transports(&self) -> impl Iterator<Item = Transport> + '_ {
        self.supported_capabilities.keys().copied()
    }

    /// Capabilities supported (not necessarily enabled) over `transport`.
    ///
    /// Empty if the transport is not available.
    pub fn supported_capabilities(&self, transport: Transport) -> Capability {
        self.supported_capabilities
            .get(&transport)
            .copied()
            .unwrap_or_default()
    }

    /// Is the configuration protected by a lock code?
    pub fn is_locked(&self) -> bool {
        self.is_locked
    }

    /// Is this a FIPS model?
    pub fn is_fips(&self) -> bool {
        self.is_fips
    }

    /// Is this a Security Key model?
    pub fn is_sky(&self) -> bool {
        self.is_sky
    }
}

fn uint(data: &TlvMap<'_>, tag: u32) -> u32 {
    data.get(&tag).map(|value| read_uint(value)).unwrap_or(0)
}

fn firmware_version(data: &TlvMap<'_>, default_version: Version) -> Version {
    match data.get(&TAG_FIRMWARE_VERSION) {
        Some(value) => Version::from_bytes(value).unwrap_or_else(|| {
            warn!(
                "ignoring {}-byte firmware version, using {}",
                value.len(),
                default_version
            );
            default_version
        }),
        None => default_version,
    }
}
