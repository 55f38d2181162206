//! Firmware version

use crate::{Error, Result};
use std::{
    fmt::{self, Display},
    str::FromStr,
};

/// YubiKey firmware version
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub struct Version {
    /// Major version component
    pub major: u8,

    /// Minor version component
    pub minor: u8,

    /// Patch version component
    pub patch: u8,
}

impl Version {
    /// Number of bytes in an encoded version
    pub const BYTE_SIZE: usize = 3;

    /// Create a new version from its components
    pub const fn new(major: u8, minor: u8, patch: u8) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a version from its encoded form: one byte per component.
    ///
    /// Bytes beyond the third are ignored. Returns `None` if fewer than
    /// three bytes are present.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        match bytes {
            [major, minor, patch, ..] => Some(Self::new(*major, *minor, *patch)),
            _ => None,
        }
    }

    /// Encode this version as bytes.
    pub fn to_bytes(self) -> [u8; Self::BYTE_SIZE] {
        [self.major, self.minor, self.patch]
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.trim().splitn(3, '.').map(u8::from_str);

        match (parts.next(), parts.next(), parts.next()) {
            (Some(Ok(major)), Some(Ok(minor)), Some(Ok(patch))) => {
                Ok(Self::new(major, minor, patch))
            }
            _ => Err(Error::ParseError),
        }
    }
}

impl From<[u8; Version::BYTE_SIZE]> for Version {
    fn from(bytes: [u8; Version::BYTE_SIZE]) -> Self {
        Self::new(bytes[0], bytes[1], bytes[2])
    }
}
