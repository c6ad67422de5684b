//! Helpers around the system `ping` utility.
//!
//! - [`parse`]: reading reply times out of its output
//! - [`ping_args`]: building a platform-appropriate argument list

pub mod parse;

use std::time::Duration;

pub use parse::{parse_reply_times, parse_transmit_summary};

/// Program name of the system ping utility
pub const PING_PROGRAM: &str = "ping";

/// Arguments for sending `count` echo requests to `address`, waiting at most
/// `reply_timeout` for each reply.
///
/// The address is passed last, after every flag.
pub fn ping_args(address: &str, count: u32, reply_timeout: Duration) -> Vec<String> {
    let mut args = Vec::with_capacity(5);

    if cfg!(windows) {
        args.extend(["-n".to_string(), count.to_string()]);
        args.extend(["-w".to_string(), reply_timeout.as_millis().to_string()]);
    } else if cfg!(target_os = "macos") {
        // BSD ping takes the per-reply wait in milliseconds
        args.extend(["-c".to_string(), count.to_string()]);
        args.extend(["-W".to_string(), reply_timeout.as_millis().to_string()]);
    } else {
        args.extend(["-c".to_string(), count.to_string()]);
        args.extend(["-W".to_string(), reply_timeout.as_secs().max(1).to_string()]);
    }

    args.push(address.to_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_is_last() {
        let args = ping_args("8.8.8.8", 5, Duration::from_secs(10));
        assert_eq!(args.last().map(String::as_str), Some("8.8.8.8"));
        assert!(args.contains(&"5".to_string()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_flags() {
        let args = ping_args("1.1.1.1", 3, Duration::from_millis(500));
        assert_eq!(args, vec!["-c", "3", "-W", "1", "1.1.1.1"]);
    }
}
