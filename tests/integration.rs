//! Integration tests

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, trivial_casts, unused_qualifications)]

use log::trace;
use once_cell::sync::Lazy;
use std::env;
use yubikey_config::{
    checksum,
    management::{DeviceConfig, DeviceFlags, DeviceInfo, FormFactor, Serial, Transport},
    otp::{layout, ConfigurationBuilder, KeyMode, Slot, SlotConfiguration, SlotRecord},
    Capability, Error, Version,
};

/// Device info response of a 5.4.3 USB-C keychain with NFC
static DEVICE_INFO_5_4_3: Lazy<Vec<u8>> = Lazy::new(|| {
    init_logging();

    decode(concat!(
        "2b",
        "0102023f",     // usb supported
        "020400bc614e", // serial
        "0302023b",     // usb enabled
        "040103",       // form factor
        "0503050403",   // firmware version
        "06020000",     // auto-eject timeout
        "07010f",       // challenge-response timeout
        "080100",       // device flags
        "0a0100",       // config locked
        "0d02023f",     // nfc supported
        "0e02023b",     // nfc enabled
    ))
});

const DEFAULT_VERSION: Version = Version::new(3, 0, 0);

/// One-time test initialization and setup
fn init_logging() {
    // Only show logs if `RUST_LOG` is set
    if env::var("RUST_LOG").is_ok() {
        let _ = env_logger::builder()
            .format_timestamp(None)
            .is_test(true)
            .try_init();
    }
}

fn decode(hex: &str) -> Vec<u8> {
    hex::mixed::decode_vec(hex).unwrap()
}

fn sequence(len: usize) -> Vec<u8> {
    (0..len).map(|i| 0xa0 ^ i as u8).collect()
}

//
// Device info decoding
//

#[test]
fn test_parse_device_info() {
    let info = DeviceInfo::parse(&DEVICE_INFO_5_4_3, DEFAULT_VERSION).unwrap();
    trace!("device info: {:?}", info);

    assert_eq!(info.version(), Version::new(5, 4, 3));
    assert_eq!(info.serial(), Some(Serial(12345678)));
    assert_eq!(info.form_factor(), FormFactor::UsbCKeychain);
    assert!(!info.is_locked());
    assert!(info.has_transport(Transport::Nfc));
    assert_eq!(
        info.supported_capabilities(Transport::Usb),
        Capability::OTP
            | Capability::U2F
            | Capability::OPENPGP
            | Capability::PIV
            | Capability::OATH
            | Capability::FIDO2
            | Capability::from_bits_retain(0x04)
    );
    assert_eq!(info.config().challenge_response_timeout(), Some(15));
    assert_eq!(info.config().device_flags(), Some(DeviceFlags::empty()));
}

#[test]
fn test_parse_is_deterministic() {
    let first = DeviceInfo::parse(&DEVICE_INFO_5_4_3, DEFAULT_VERSION).unwrap();
    let second = DeviceInfo::parse(&DEVICE_INFO_5_4_3, DEFAULT_VERSION).unwrap();

    assert_eq!(first, second);
}

#[test]
fn test_enabled_capabilities_are_reported_verbatim() {
    let info = DeviceInfo::parse(&DEVICE_INFO_5_4_3, DEFAULT_VERSION).unwrap();

    for transport in info.transports() {
        let enabled = info.config().enabled_capabilities(transport).unwrap();
        assert_eq!(enabled.bits(), 0x023b);
        assert!(info.supported_capabilities(transport).contains(enabled));
    }
}

#[test]
fn test_firmware_4_2_4_quirk() {
    let response = decode(concat!("0d", "0102000f", "0503040204", "030201ff"));
    let info = DeviceInfo::parse(&response, DEFAULT_VERSION).unwrap();

    assert_eq!(info.supported_capabilities(Transport::Usb).bits(), 0x3f);
    assert_eq!(info.config().enabled_capabilities(Transport::Usb), None);
}

#[test]
fn test_no_nfc_support() {
    let response = decode(concat!("09", "0102023f", "0503050403"));
    let info = DeviceInfo::parse(&response, DEFAULT_VERSION).unwrap();

    assert!(!info.has_transport(Transport::Nfc));
    assert!(info.supported_capabilities(Transport::Nfc).is_empty());
    assert_eq!(info.config().enabled_capabilities(Transport::Nfc), None);
    assert_eq!(info.transports().collect::<Vec<_>>(), [Transport::Usb]);
}

#[test]
fn test_serial_zero_is_absent() {
    let response = decode(concat!("06", "020400000000"));
    let info = DeviceInfo::parse(&response, DEFAULT_VERSION).unwrap();

    assert_eq!(info.serial(), None);
    assert_eq!(info.version(), DEFAULT_VERSION);
}

#[test]
fn test_length_mismatch() {
    let mut response = DEVICE_INFO_5_4_3.clone();

    response[0] -= 1;
    assert!(matches!(
        DeviceInfo::parse(&response, DEFAULT_VERSION),
        Err(Error::MalformedResponse { .. })
    ));

    response.pop();
    response[0] += 2;
    assert!(matches!(
        DeviceInfo::parse(&response, DEFAULT_VERSION),
        Err(Error::MalformedResponse { .. })
    ));
}

//
// Device config encoding
//

#[test]
fn test_device_config_payload_decodes_as_device_info() {
    let config = DeviceConfig::builder()
        .enabled_capabilities(Transport::Usb, Capability::OTP | Capability::FIDO2)
        .enabled_capabilities(Transport::Nfc, Capability::empty())
        .auto_eject_timeout(600)
        .challenge_response_timeout(30)
        .device_flags(DeviceFlags::REMOTE_WAKEUP)
        .build();

    let payload = config.to_bytes(false, None, None).unwrap();
    let info = DeviceInfo::parse(&payload, Version::new(5, 0, 0)).unwrap();

    assert_eq!(
        info.config().enabled_capabilities(Transport::Usb),
        config.enabled_capabilities(Transport::Usb)
    );
    assert_eq!(info.config().auto_eject_timeout(), Some(600));
    assert_eq!(info.config().challenge_response_timeout(), Some(30));
    assert_eq!(info.config().device_flags(), Some(DeviceFlags::REMOTE_WAKEUP));

    // NFC enabled alone does not make NFC a supported transport
    assert!(!info.has_transport(Transport::Nfc));
}

//
// Slot configuration records
//

#[test]
fn test_record_size_and_checksum() {
    let record = ConfigurationBuilder::new()
        .fixed(&sequence(12))
        .uid(&sequence(6))
        .key(KeyMode::Aes, &sequence(16))
        .access_code(&sequence(6))
        .build();

    assert_eq!(record.len(), 58);
    assert!(checksum::verify(&record[..layout::CONFIG_SIZE]));

    let stored = u16::from_le_bytes([record[50], record[51]]);
    assert_eq!(stored, !checksum::crc16(&record[..50]));
}

#[test]
fn test_hmac_key_lengths() {
    for len in 0..=layout::HMAC_KEY_SIZE {
        let key = sequence(len);
        let record = ConfigurationBuilder::new()
            .key(KeyMode::HmacSha1, &key)
            .build();
        let parsed = SlotRecord::parse(&record[..]).unwrap();

        let stored = len.min(layout::KEY_SIZE);
        assert_eq!(&parsed.key()[..stored], &key[..stored]);

        if len > layout::KEY_SIZE {
            assert_eq!(&parsed.uid()[..len - 16], &key[16..]);
        } else {
            assert_eq!(parsed.uid(), &[0; 6]);
        }
    }
}

#[test]
fn test_static_key_of_twenty_bytes() {
    let material = sequence(20);
    let record = ConfigurationBuilder::new()
        .key(KeyMode::Static, &material)
        .build();
    let parsed = SlotRecord::parse(&record[..]).unwrap();

    assert_eq!(parsed.fixed(), &material[..16]);
    assert_eq!(&parsed.uid()[..4], &material[16..]);
    assert_eq!(parsed.key(), &[0; 16]);
}

#[test]
fn test_truncated_fields() {
    let record = ConfigurationBuilder::new()
        .fixed(&sequence(17))
        .uid(&sequence(7))
        .access_code(&sequence(7))
        .build();
    let parsed = SlotRecord::parse(&record[..]).unwrap();

    assert_eq!(parsed.fixed_len(), 16);
    assert_eq!(parsed.fixed(), &sequence(16)[..]);
    assert_eq!(parsed.uid(), &sequence(6)[..]);
    assert_eq!(parsed.access_code(), &sequence(6)[..]);
}

#[test]
fn test_slot_programs() {
    let otp = SlotConfiguration::yubico_otp(&decode("2d2d2d2d2d2d"), &[1; 6], &[2; 16]).unwrap();
    let hmac = SlotConfiguration::hmac_sha1(&sequence(20), false).unwrap();
    let update = SlotConfiguration::update().access_code(b"123456");

    assert_eq!(otp.command(Slot::One), 0x01);
    assert_eq!(hmac.command(Slot::Two), 0x03);
    assert_eq!(update.command(Slot::Two), 0x05);

    for config in [otp, hmac, update] {
        let record = config.build();
        assert!(SlotRecord::parse(&record[..]).is_ok());
    }
}
