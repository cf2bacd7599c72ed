//! Command-line argument parsing with clap.

use clap::Parser;
use std::path::PathBuf;

/// Photo booth kiosk: live preview, countdown, three shots, emailed strip
#[derive(Parser, Debug)]
#[command(name = "photobooth")]
#[command(version, about = "Photo booth kiosk", long_about = None)]
pub struct Args {
    /// Serial device the start button is wired to (default from config, /dev/ttyACM0)
    #[arg(long)]
    pub serial: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_defaults() {
        let args = Args::parse_from(["photobooth"]);
        assert!(args.serial.is_none());
    }

    #[test]
    fn test_args_serial_option() {
        let args = Args::parse_from(["photobooth", "--serial", "/dev/ttyUSB1"]);
        assert_eq!(args.serial, Some(PathBuf::from("/dev/ttyUSB1")));
    }

    #[test]
    fn test_args_rejects_unknown_subcommand() {
        assert!(Args::try_parse_from(["photobooth", "list-cameras"]).is_err());
    }
}
