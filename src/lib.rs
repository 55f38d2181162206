#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod checksum;
mod error;
pub mod management;
pub mod otp;
pub mod serialization;
pub mod setting;
mod version;

pub use crate::{
    error::{Error, Result},
    management::{
        Capability, DeviceConfig, DeviceFlags, DeviceInfo, FormFactor, Serial, Transport,
    },
    otp::{ConfigurationBuilder, KeyMode, Slot, SlotConfiguration},
    setting::{Setting, SettingSource},
    version::Version,
};
