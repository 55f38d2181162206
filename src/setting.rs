//! Configuration setting values parsed from the environment and config file:
//! `/etc/yubico/yubikey-config.conf`

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

/// Default location of the YubiKey configuration file
pub const DEFAULT_CONFIG_FILE: &str = "/etc/yubico/yubikey-config.conf";

/// Prefix of environment variables holding user settings
pub const ENV_PREFIX: &str = "YUBIKEY_CONFIG_";

/// Reject field inputs longer than their record field instead of truncating
pub const STRICT_LENGTHS: &str = "STRICT_LENGTHS";

use log::{debug, trace};
use std::{
    env,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

/// Source of how a setting was configured.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SettingSource {
    /// User-specified setting: sourced via `YUBIKEY_CONFIG_*` environment vars.
    User,

    /// Admin-specified setting: sourced via the
    /// `/etc/yubico/yubikey-config.conf` configuration file.
    Admin,

    /// Default setting.
    #[default]
    Default,
}

/// Setting booleans: configuration values sourced from a file or the environment.
///
/// These can be configured globally in `/etc/yubico/yubikey-config.conf` by a
/// system administrator, or by the local user via `YUBIKEY_CONFIG_*`
/// environment variables. Admin settings take precedence.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Setting {
    /// Boolean value
    pub value: bool,

    /// Source of the configuration setting (user, admin, or default)
    pub source: SettingSource,
}

impl Setting {
    /// Get a [`Setting`] value by name.
    pub fn get(key: &str, default: bool) -> Self {
        Self::from_file(DEFAULT_CONFIG_FILE, key)
            .or_else(|| Self::from_env(key))
            .unwrap_or(Self {
                value: default,
                source: SettingSource::Default,
            })
    }

    /// Get a boolean config value from the given config file
    fn from_file(path: impl AsRef<Path>, key: &str) -> Option<Self> {
        let file = File::open(path.as_ref()).ok()?;
        trace!("reading settings from {}", path.as_ref().display());

        Self::from_lines(BufReader::new(file), key)
    }

    /// Find `key` among `NAME=value` lines, skipping comments
    fn from_lines(reader: impl BufRead, key: &str) -> Option<Self> {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                _ => continue,
            };

            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (name, value) = match line.split_once('=') {
                Some((name, value)) => (name.trim(), value.trim()),
                None => continue,
            };

            if name == key {
                debug!("setting {} configured by administrator", key);
                return Some(Setting {
                    source: SettingSource::Admin,
                    value: parse_bool(value),
                });
            }
        }

        None
    }

    /// Get a setting boolean from an environment variable
    fn from_env(key: &str) -> Option<Self> {
        env::var(format!("{}{}", ENV_PREFIX, key))
            .ok()
            .map(|value| Setting {
                source: SettingSource::User,
                value: parse_bool(value.trim()),
            })
    }
}

fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = "\
# administrator settings
OTHER=1

STRICT_LENGTHS = true
";

    #[test]
    fn reads_admin_setting() {
        let setting = Setting::from_lines(CONFIG.as_bytes(), STRICT_LENGTHS).unwrap();

        assert_eq!(setting.source, SettingSource::Admin);
        assert!(setting.value);
    }

    #[test]
    fn skips_comments_and_missing_keys() {
        assert_eq!(Setting::from_lines(CONFIG.as_bytes(), "MISSING"), None);
        assert_eq!(
            Setting::from_lines("#STRICT_LENGTHS=1\n".as_bytes(), STRICT_LENGTHS),
            None
        );
    }

    #[test]
    fn falsy_values() {
        let setting = Setting::from_lines("OTHER=no\n".as_bytes(), "OTHER").unwrap();
        assert!(!setting.value);
    }

    #[test]
    fn missing_file_yields_none() {
        assert_eq!(
            Setting::from_file("/nonexistent/yubikey-config.conf", STRICT_LENGTHS),
            None
        );
    }

    #[test]
    fn default_setting() {
        let setting = Setting::default();
        assert!(!setting.value);
        assert_eq!(setting.source, SettingSource::Default);
    }
}
