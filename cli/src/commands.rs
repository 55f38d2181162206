//! Commands of the CLI application

pub mod info;
pub mod otp;

use self::{info::InfoCmd, otp::OtpCmd};
use crate::terminal;
use clap::{Parser, Subcommand};
use std::env;
use termcolor::ColorChoice;

/// The `ykconfig` CLI utility
#[derive(Debug, Parser)]
#[clap(version, about)]
pub struct YkConfigCli {
    /// Subcommand to execute.
    #[clap(subcommand)]
    pub command: Commands,
}

impl YkConfigCli {
    /// Run the underlying command type or print usage info and exit
    pub fn run(&self) {
        terminal::set_color_choice(ColorChoice::Auto);

        // Only show logs if `RUST_LOG` is set
        if env::var("RUST_LOG").is_ok() {
            env_logger::builder().format_timestamp(None).init();
        }

        self.command.run()
    }
}

/// Subcommands of this application
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// `version` subcommand
    #[clap(about = "display version information")]
    Version(VersionOpts),

    /// `otp` subcommand
    #[clap(about = "build an OTP slot configuration record")]
    Otp(OtpCmd),

    /// `info` subcommand
    #[clap(about = "decode a device info response")]
    Info(InfoCmd),
}

impl Commands {
    /// Run the given command
    pub fn run(&self) {
        match self {
            Commands::Version(version) => version.run(),
            Commands::Otp(otp) => otp.run(),
            Commands::Info(info) => info.run(),
        }
    }
}

/// Version options
#[derive(Debug, Parser)]
pub struct VersionOpts {}

impl VersionOpts {
    /// Display version information
    pub fn run(&self) {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    }
}

/// Decode a hex argument, exiting with an error message if it is invalid
pub(crate) fn decode_hex(name: &str, value: &str) -> Vec<u8> {
    hex::mixed::decode_vec(value.trim()).unwrap_or_else(|e| {
        status_err!("invalid hex in {}: {}", name, e);
        std::process::exit(1);
    })
}
