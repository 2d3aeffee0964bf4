//! Test utilities for property-based testing
//!
//! This module provides generators and helpers for proptest.

#[cfg(test)]
pub mod generators {
    use proptest::prelude::*;

    /// Generate a board id as used in `boards.txt` (`nodemcuv2`, `d1_mini`)
    pub fn board_id() -> impl Strategy<Value = String> {
        "[a-z][a-z0-9_]{0,15}"
    }

    /// Generate a FlashSize menu variant (`4M1M`, `4M3M`)
    pub fn flash_variant() -> impl Strategy<Value = String> {
        (prop_oneof![Just(1u32), Just(2), Just(4), Just(8), Just(16)], 0u32..16)
            .prop_map(|(flash, spiffs)| format!("{flash}M{spiffs}M"))
    }

    /// Generate a dotted-quad IPv4 address
    pub fn ipv4_address() -> impl Strategy<Value = String> {
        (any::<u8>(), any::<u8>(), any::<u8>(), any::<u8>())
            .prop_map(|(a, b, c, d)| format!("{a}.{b}.{c}.{d}"))
    }

    /// Generate a serial port name for Windows, Linux or macOS
    pub fn serial_port() -> impl Strategy<Value = String> {
        prop_oneof![
            (1u32..64).prop_map(|n| format!("COM{n}")),
            (0u32..8).prop_map(|n| format!("/dev/ttyUSB{n}")),
            "[a-zA-Z0-9]{4,10}".prop_map(|s| format!("/dev/cu.usbserial-{s}")),
        ]
    }

    /// Generate a flash offset aligned to 4 KiB, below 16 MiB
    pub fn flash_offset() -> impl Strategy<Value = u64> {
        (0u64..4096).prop_map(|sector| sector * 0x1000)
    }
}

#[cfg(test)]
mod tests {
    use super::generators::*;
    use proptest::prelude::*;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn test_board_id_generator(board in board_id()) {
            prop_assert!(!board.is_empty());
            prop_assert!(board.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
        }

        #[test]
        fn test_ipv4_generator(ip in ipv4_address()) {
            let parts: Vec<&str> = ip.split('.').collect();
            prop_assert_eq!(parts.len(), 4);
            for part in parts {
                prop_assert!(part.parse::<u8>().is_ok());
            }
        }

        #[test]
        fn test_flash_offset_generator(offset in flash_offset()) {
            prop_assert_eq!(offset % 0x1000, 0);
            prop_assert!(offset < 0x100_0000);
        }
    }
}
