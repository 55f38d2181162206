//! Mutable device configuration

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
    Capability, DeviceFlags, Transport, TAG_AUTO_EJECT_TIMEOUT, TAG_CHALLENGE_RESPONSE_TIMEOUT,
    TAG_CONFIG_LOCK, TAG_DEVICE_FLAGS, TAG_NFC_ENABLED, TAG_REBOOT, TAG_UNLOCK, TAG_USB_ENABLED,
};
use crate::{serialization::Tlv, Error, Result};
use log::debug;
use std::collections::BTreeMap;

/// Size of a configuration lock code
pub const LOCK_CODE_SIZE: usize = 16;

/// The part of a YubiKey's configuration which can be changed.
///
/// Every field is optional: a config read from a device carries what the
/// device reported, a config written to a device only changes the fields
/// which are set.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeviceConfig {
    pub(crate) enabled_capabilities: BTreeMap<Transport, Capability>,
    pub(crate) auto_eject_timeout: Option<u16>,
    pub(crate) challenge_response_timeout: Option<u8>,
    pub(crate) device_flags: Option<DeviceFlags>,
}

impl DeviceConfig {
    /// Start building a config to write to a device
    pub fn builder() -> DeviceConfigBuilder {
        DeviceConfigBuilder::default()
    }

    /// Capabilities enabled over `transport`, if known
    pub fn enabled_capabilities(&self, transport: Transport) -> Option<Capability> {
        self.enabled_capabilities.get(&transport).copied()
    }

    /// Transports for which enabled capabilities are known
    pub fn transports(&self) -> impl Iterator<Item = Transport> + '_ {
        self.enabled_capabilities.keys().copied()
    }

    /// Seconds of inactivity after which the CCID interface ejects
    pub fn auto_eject_timeout(&self) -> Option<u16> {
        self.auto_eject_timeout
    }

    /// Seconds to wait for a touch during a challenge-response operation
    pub fn challenge_response_timeout(&self) -> Option<u8> {
        self.challenge_response_timeout
    }

    /// Device flags
    pub fn device_flags(&self) -> Option<DeviceFlags> {
        self.device_flags
    }

    /// Encode this config as a write-config payload.
    ///
    /// `current_lock_code` unlocks a locked configuration; `new_lock_code`
    /// sets (or, when all zeros, clears) the lock. Both must be
    /// [`LOCK_CODE_SIZE`] bytes long.
    pub fn to_bytes(
        &self,
        reboot: bool,
        current_lock_code: Option<&[u8]>,
        new_lock_code: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        let mut payload = Vec::new();

        if reboot {
            Tlv::write(&mut payload, TAG_REBOOT, &[])?;
        }

        if let Some(code) = current_lock_code {
            Tlv::write(&mut payload, TAG_UNLOCK, lock_code(code)?)?;
        }

        if let Some(caps) = self.enabled_capabilities(Transport::Usb) {
            Tlv::write(&mut payload, TAG_USB_ENABLED, &capabilities(caps)?)?;
        }

        if let Some(caps) = self.enabled_capabilities(Transport::Nfc) {
            Tlv::write(&mut payload, TAG_NFC_ENABLED, &capabilities(caps)?)?;
        }

        if let Some(timeout) = self.auto_eject_timeout {
            Tlv::write(&mut payload, TAG_AUTO_EJECT_TIMEOUT, &timeout.to_be_bytes())?;
        }

        if let Some(timeout) = self.challenge_response_timeout {
            Tlv::write(&mut payload, TAG_CHALLENGE_RESPONSE_TIMEOUT, &[timeout])?;
        }

        if let Some(flags) = self.device_flags {
            let flags = u8::try_from(flags.bits()).map_err(|_| Error::ArgumentError)?;
            Tlv::write(&mut payload, TAG_DEVICE_FLAGS, &[flags])?;
        }

        if let Some(code) = new_lock_code {
            Tlv::write(&mut payload, TAG_CONFIG_LOCK, lock_code(code)?)?;
        }

        let length = u8::try_from(payload.len()).map_err(|_| Error::SizeError)?;
        debug!("encoded {}-byte device config", length);

        let mut bytes = Vec::with_capacity(payload.len() + 1);
        bytes.push(length);
        bytes.extend_from_slice(&payload);
        Ok(bytes)
    }
}

/// Builder for [`DeviceConfig`]
#[derive(Clone, Debug, Default)]
pub struct DeviceConfigBuilder {
    config: DeviceConfig,
}

impl DeviceConfigBuilder {
    /// Enable exactly `capabilities` over `transport`
    pub fn enabled_capabilities(mut self, transport: Transport, capabilities: Capability) -> Self {
        self.config
            .enabled_capabilities
            .insert(transport, capabilities);
        self
    }

    /// Set the auto-eject timeout in seconds
    pub fn auto_eject_timeout(mut self, seconds: u16) -> Self {
        self.config.auto_eject_timeout = Some(seconds);
        self
    }

    /// Set the challenge-response touch timeout in seconds
    pub fn challenge_response_timeout(mut self, seconds: u8) -> Self {
        self.config.challenge_response_timeout = Some(seconds);
        self
    }

    /// Set the device flags
    pub fn device_flags(mut self, flags: DeviceFlags) -> Self {
        self.config.device_flags = Some(flags);
        self
    }

    /// Finish building
    pub fn build(self) -> DeviceConfig {
        self.config
    }
}

fn lock_code(code: &[u8]) -> Result<&[u8]> {
    if code.len() == LOCK_CODE_SIZE {
        Ok(code)
    } else {
        Err(Error::ArgumentError)
    }
}

fn capabilities(caps: Capability) -> Result<[u8; 2]> {
    u16::try_from(caps.bits())
        .map(u16::to_be_bytes)
        .map_err(|_| Error::ArgumentError)
}
