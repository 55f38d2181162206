//! Build OTP slot configuration records

use super::decode_hex;
use crate::terminal::{print_attr, STDOUT};
use clap::{Args, Subcommand};
use log::debug;
use rand_core::{OsRng, RngCore};
use std::{io, process::exit};
use yubikey_config::{
    otp::{layout, Slot, SlotConfiguration},
    setting::{Setting, STRICT_LENGTHS},
    Error, Result,
};

/// The `otp` subcommand
#[derive(Debug, Args)]
pub struct OtpCmd {
    /// Slot to program (1 or 2)
    #[clap(short = 's', long = "slot", default_value = "2")]
    pub slot: Slot,

    /// Access code protecting the slot after programming (hex)
    #[clap(long = "access-code")]
    pub access_code: Option<String>,

    /// Access code currently protecting the slot (hex)
    #[clap(long = "current-access-code")]
    pub current_access_code: Option<String>,

    /// Credential to program
    #[clap(subcommand)]
    pub preset: Preset,
}

/// Credential types
#[derive(Debug, Subcommand)]
pub enum Preset {
    /// Yubico OTP
    YubicoOtp {
        /// Public id (hex)
        #[clap(long = "public-id")]
        public_id: String,

        /// Private id (hex, 6 bytes)
        #[clap(long = "private-id")]
        private_id: Option<String>,

        /// AES key (hex, 16 bytes)
        #[clap(long = "key")]
        key: Option<String>,

        /// Generate a random private id and key
        #[clap(long = "generate")]
        generate: bool,
    },

    /// HMAC-SHA1 challenge-response
    HmacSha1 {
        /// HMAC key (hex, up to 20 bytes)
        #[clap(long = "key")]
        key: Option<String>,

        /// Generate a random 20-byte key
        #[clap(long = "generate")]
        generate: bool,

        /// Require touch to compute a response
        #[clap(long = "touch")]
        touch: bool,
    },

    /// OATH-HOTP
    Hotp {
        /// HMAC key (hex, up to 20 bytes)
        #[clap(long = "key")]
        key: Option<String>,

        /// Generate a random 20-byte key
        #[clap(long = "generate")]
        generate: bool,

        /// Generate 8 digit codes instead of 6
        #[clap(long = "digits8")]
        digits8: bool,
    },

    /// Static password
    StaticPassword {
        /// Keyboard scan codes (hex, up to 38 bytes)
        scan_codes: String,
    },

    /// Static password derived from an AES key
    StaticTicket {
        /// Fixed part (hex, up to 16 bytes)
        #[clap(long = "fixed")]
        fixed: String,

        /// Uid (hex, 6 bytes)
        #[clap(long = "uid")]
        uid: String,

        /// AES key (hex, 16 bytes)
        #[clap(long = "key")]
        key: String,
    },

    /// Update the flags and access code of a programmed slot
    Update,
}

impl OtpCmd {
    /// Run the `otp` subcommand
    pub fn run(&self) {
        let strict = Setting::get(STRICT_LENGTHS, false);
        debug!("{}: {} ({:?})", STRICT_LENGTHS, strict.value, strict.source);

        let config = self.configuration(strict.value).unwrap_or_else(|e| {
            status_err!("can't build slot configuration: {}", e);
            exit(1);
        });

        if let Err(e) = print_record(self.slot, &config) {
            status_err!("can't print slot configuration: {}", e);
            exit(1);
        }
    }

    fn configuration(&self, strict: bool) -> Result<SlotConfiguration> {
        let mut config = self.preset.configuration()?;
        debug!("slot {} preset: {:?}", self.slot, config);

        if let Some(code) = &self.access_code {
            let code = field("access code", code, layout::ACC_CODE_SIZE, strict);
            config = config.access_code(&code);
        }

        if let Some(code) = &self.current_access_code {
            let code = field("current access code", code, layout::ACC_CODE_SIZE, strict);
            config = config.current_access_code(&code);
        }

        Ok(config)
    }
}

impl Preset {
    fn configuration(&self) -> Result<SlotConfiguration> {
        match self {
            Preset::YubicoOtp {
                public_id,
                private_id,
                key,
                generate,
            } => {
                let public_id = decode_hex("public id", public_id);
                let private_id: [u8; layout::UID_SIZE] =
                    secret("private-id", private_id.as_deref(), *generate)?;
                let key: [u8; layout::KEY_SIZE] = secret("key", key.as_deref(), *generate)?;
                SlotConfiguration::yubico_otp(&public_id, &private_id, &key)
            }
            Preset::HmacSha1 {
                key,
                generate,
                touch,
            } => SlotConfiguration::hmac_sha1(&hmac_key(key.as_deref(), *generate)?, *touch),
            Preset::Hotp {
                key,
                generate,
                digits8,
            } => SlotConfiguration::hotp(&hmac_key(key.as_deref(), *generate)?, *digits8),
            Preset::StaticPassword { scan_codes } => {
                SlotConfiguration::static_password(&decode_hex("scan codes", scan_codes))
            }
            Preset::StaticTicket { fixed, uid, key } => {
                let uid: [u8; layout::UID_SIZE] = exact("uid", uid)?;
                let key: [u8; layout::KEY_SIZE] = exact("key", key)?;
                SlotConfiguration::static_ticket(&decode_hex("fixed", fixed), &uid, &key)
            }
            Preset::Update => Ok(SlotConfiguration::update()),
        }
    }
}

/// Print the command code and record for `config`
fn print_record(slot: Slot, config: &SlotConfiguration) -> io::Result<()> {
    let record = config.build();

    let mut s = STDOUT.lock();
    print_attr(&mut s, "slot", slot)?;
    print_attr(&mut s, "command", format!("{:#04x}", config.command(slot)))?;
    print_attr(&mut s, "record", hex::lower::encode_string(&record[..]))?;
    Ok(())
}

/// Decode a hex field, enforcing its maximum length when `strict`
fn field(name: &str, value: &str, max: usize, strict: bool) -> Vec<u8> {
    let bytes = decode_hex(name, value);

    if bytes.len() > max {
        if strict {
            status_err!("{} is {} bytes, at most {} allowed", name, bytes.len(), max);
            exit(1);
        }

        status_warn!("{} truncated to {} bytes", name, max);
    }

    bytes
}

/// Decode a hex argument of exactly `N` bytes
fn exact<const N: usize>(name: &str, value: &str) -> Result<[u8; N]> {
    let bytes = decode_hex(name, value);

    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        status_err!("{} must be {} bytes, got {}", name, N, bytes.len());
        Error::ArgumentError
    })
}

/// Secret of exactly `N` bytes, given as hex with `--<flag>` or generated
fn secret<const N: usize>(flag: &str, value: Option<&str>, generate: bool) -> Result<[u8; N]> {
    match given(flag, value, generate) {
        Some(value) => exact(flag, value),
        None => Ok(generated(flag)),
    }
}

/// HMAC key of up to 20 bytes, given as hex or generated
fn hmac_key(value: Option<&str>, generate: bool) -> Result<Vec<u8>> {
    match given("key", value, generate) {
        Some(value) => Ok(decode_hex("key", value)),
        None => Ok(generated::<{ layout::HMAC_KEY_SIZE }>("key").to_vec()),
    }
}

/// Value of `--<flag>`, or `None` when it is to be generated.
///
/// Exactly one of `--<flag>` and `--generate` must be passed.
fn given<'a>(flag: &str, value: Option<&'a str>, generate: bool) -> Option<&'a str> {
    match (value, generate) {
        (Some(value), false) => Some(value),
        (None, true) => None,
        (Some(_), true) => {
            status_err!("--{} and --generate can't be used together", flag);
            exit(1);
        }
        (None, false) => {
            status_err!("one of --{} or --generate is required", flag);
            exit(1);
        }
    }
}

fn generated<const N: usize>(name: &str) -> [u8; N] {
    let mut bytes = [0u8; N];
    OsRng.fill_bytes(&mut bytes);
    status_ok!("Generated", "{}: {}", name, hex::lower::encode_string(&bytes));
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_value_or_generate() {
        assert_eq!(given("key", Some("00"), false), Some("00"));
        assert_eq!(given("key", None, true), None);
    }

    #[test]
    fn exact_length_is_enforced() {
        assert_eq!(exact::<2>("uid", "0102"), Ok([0x01, 0x02]));
        assert_eq!(exact::<6>("uid", "0102"), Err(Error::ArgumentError));
    }

    #[test]
    fn generated_hmac_key_is_full_length() {
        let key = hmac_key(None, true).unwrap();
        assert_eq!(key.len(), layout::HMAC_KEY_SIZE);
    }

    #[test]
    fn access_code_is_applied_without_strict_lengths() {
        let cmd = OtpCmd {
            slot: Slot::One,
            access_code: Some("010203040506".to_owned()),
            current_access_code: None,
            preset: Preset::Update,
        };

        let config = cmd.configuration(false).unwrap();
        assert!(config.is_update());
        assert_eq!(config.command(Slot::One), Slot::One.update_command());
    }
}
