//! Decode device info responses

use super::decode_hex;
use crate::terminal::{print_attr, STDOUT};
use clap::Args;
use std::{io, process::exit};
use termcolor::StandardStreamLock;
use yubikey_config::{management::Transport, Capability, DeviceInfo, Version};

// String to use for `None`
const NONE_STR: &str = "<none>";

/// The `info` subcommand
#[derive(Debug, Args)]
pub struct InfoCmd {
    /// Firmware version to assume when the response does not report one
    #[clap(long = "default-version", default_value = "3.0.0")]
    pub default_version: Version,

    /// Device info response, including its length byte (hex)
    pub response: String,
}

impl InfoCmd {
    /// Run the `info` subcommand
    pub fn run(&self) {
        let response = decode_hex("response", &self.response);

        let info = DeviceInfo::parse(&response, self.default_version).unwrap_or_else(|e| {
            status_err!("can't decode device info: {}", e);
            exit(1);
        });

        if let Err(e) = print_info(&mut STDOUT.lock(), &info) {
            status_err!("can't print device info: {}", e);
            exit(1);
        }
    }
}

fn print_info(s: &mut StandardStreamLock<'_>, info: &DeviceInfo) -> io::Result<()> {
    print_attr(s, "version", info.version())?;

    match info.serial() {
        Some(serial) => print_attr(s, "serial", serial)?,
        None => print_attr(s, "serial", NONE_STR)?,
    }

    print_attr(s, "form factor", info.form_factor())?;
    print_attr(s, "FIPS", info.is_fips())?;
    print_attr(s, "security key", info.is_sky())?;
    print_attr(s, "locked", info.is_locked())?;

    let config = info.config();

    for transport in [Transport::Usb, Transport::Nfc] {
        if !info.has_transport(transport) {
            continue;
        }

        print_attr(
            s,
            &format!("{} supported", transport),
            capabilities(info.supported_capabilities(transport)),
        )?;

        match config.enabled_capabilities(transport) {
            Some(caps) => print_attr(s, &format!("{} enabled", transport), capabilities(caps))?,
            None => print_attr(s, &format!("{} enabled", transport), NONE_STR)?,
        }
    }

    if let Some(timeout) = config.auto_eject_timeout() {
        print_attr(s, "auto-eject timeout", timeout)?;
    }

    if let Some(timeout) = config.challenge_response_timeout() {
        print_attr(s, "chal-resp timeout", timeout)?;
    }

    if let Some(flags) = config.device_flags() {
        print_attr(s, "device flags", format!("{:#04x}", flags.bits()))?;
    }

    Ok(())
}

fn capabilities(caps: Capability) -> String {
    if caps.is_empty() {
        return NONE_STR.to_owned();
    }

    let mut names = caps.names().join(" ");

    let unknown = caps.bits() & !Capability::all().bits();
    if unknown != 0 {
        names.push_str(&format!(" {:#06x}", unknown));
    }

    names.trim_start().to_owned()
}
