//! SPIFFS memory layout resolution
//!
//! The board package describes each board's flash partitioning in
//! `boards.txt`, with one set of keys per FlashSize menu variant:
//!
//! ```text
//! nodemcuv2.upload.resetmethod=nodemcu
//! nodemcuv2.menu.FlashSize.4M1M.build.spiffs_start=0x300000
//! nodemcuv2.menu.FlashSize.4M1M.build.spiffs_end=0x3FB000
//! ```

use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

use super::project::ProjectConfig;
use super::properties::{lines, Properties};
use super::target::Target;
use crate::config::defaults::{DEFAULT_BLOCK_SIZE, DEFAULT_PAGE_SIZE};
use crate::error::{Result, UploadError};

pub const SPIFFS_START: &str = "spiffs_start";
pub const SPIFFS_END: &str = "spiffs_end";
pub const SPIFFS_PAGE_SIZE: &str = "spiffs_pagesize";
pub const SPIFFS_BLOCK_SIZE: &str = "spiffs_blocksize";
pub const UPLOAD_SPEED: &str = "speed";
pub const RESET_METHOD: &str = "resetmethod";

/// Determine the FlashSize menu variant for the target board
///
/// The project's `FlashSize` wins. Otherwise the IDE stores the selection
/// as `custom_FlashSize=<board>_<variant>`.
pub fn resolve_memory_config(
    project: &ProjectConfig,
    preferences: &Properties,
    target: &Target,
) -> Result<String> {
    if let Some(flash_size) = project.flash_size.as_deref() {
        return Ok(flash_size.to_string());
    }

    preferences
        .get_non_empty("custom_FlashSize")
        .and_then(|selection| variant_for_board(selection, &target.board))
        .ok_or_else(|| UploadError::AmbiguousFlashSize {
            board: target.board.clone(),
        })
}

fn variant_for_board(selection: &str, board: &str) -> Option<String> {
    let pattern = format!(r"^{}_(\S+)", regex::escape(board));
    let re = Regex::new(&pattern).ok()?;
    re.captures(selection)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Flash parameters for one board and FlashSize variant
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlashParameters {
    values: BTreeMap<String, String>,
}

impl FlashParameters {
    /// Scan board definitions for a board and memory configuration
    ///
    /// Lines are applied in file order, so a later definition of the same
    /// parameter replaces an earlier one.
    pub fn scan(boards: &str, board: &str, memory_config: &str) -> Self {
        let board = regex::escape(board);
        let variant = regex::escape(memory_config);
        let patterns = [
            format!(r"^{board}\.(?:build|upload)\.([^\s=]+)=(\S+)"),
            format!(r"^{board}\.menu\.FlashSize\.{variant}\.(?:build|upload)\.([^\s=]+)=(\S+)"),
        ];
        let patterns: Vec<Regex> = patterns
            .iter()
            .filter_map(|p| Regex::new(p).ok())
            .collect();

        let mut values = BTreeMap::new();
        for line in lines(boards) {
            if let Some(caps) = patterns.iter().find_map(|re| re.captures(line)) {
                values.insert(caps[1].to_string(), caps[2].to_string());
            }
        }
        Self { values }
    }

    pub fn get(&self, param: &str) -> Option<&str> {
        self.values.get(param).map(String::as_str)
    }

    pub fn set(&mut self, param: &str, value: impl Into<String>) {
        self.values.insert(param.to_string(), value.into());
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// Resolve flash parameters for the target, applying project overrides
pub fn resolve_flash_parameters(
    boards: &str,
    target: &Target,
    memory_config: &str,
    project: &ProjectConfig,
) -> Result<FlashParameters> {
    let mut params = FlashParameters::scan(boards, &target.board, memory_config);

    for required in [SPIFFS_START, SPIFFS_END] {
        if params.get(required).is_none() {
            return Err(UploadError::MissingParameter {
                param: required.to_string(),
                board: target.to_string(),
                memory_config: memory_config.to_string(),
            });
        }
    }

    if let Some(speed) = &project.upload_speed {
        params.set(UPLOAD_SPEED, speed.clone());
    }
    if let Some(method) = &project.reset_method {
        params.set(RESET_METHOD, method.clone());
    }

    for (key, value) in params.iter() {
        tracing::debug!("  {key} = {value}");
    }
    Ok(params)
}

/// Parse an integer, as hex when `0x`-prefixed, else decimal
pub fn parse_int(param: &str, value: &str) -> Result<u64> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => trimmed.parse::<u64>(),
    };
    parsed.map_err(|e| UploadError::InvalidParameter {
        param: param.to_string(),
        value: value.to_string(),
        reason: e.to_string(),
    })
}

/// Numeric SPIFFS region derived from flash parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SpiffsLayout {
    pub start: u64,
    pub end: u64,
    pub page_size: u64,
    pub block_size: u64,
}

impl SpiffsLayout {
    /// Compute the layout; page and block size fall back to 256 and 4096
    pub fn from_parameters(params: &FlashParameters) -> Result<Self> {
        let required = |param: &str| {
            params
                .get(param)
                .ok_or_else(|| UploadError::MissingParameter {
                    param: param.to_string(),
                    board: String::new(),
                    memory_config: String::new(),
                })
                .and_then(|v| parse_int(param, v))
        };
        let optional = |param: &str, default: &str| {
            parse_int(param, params.get(param).unwrap_or(default))
        };

        let start = required(SPIFFS_START)?;
        let end = required(SPIFFS_END)?;
        if end < start {
            return Err(UploadError::InvalidParameter {
                param: SPIFFS_END.to_string(),
                value: format!("{end:#x}"),
                reason: format!("ends before {SPIFFS_START} {start:#x}"),
            });
        }

        Ok(Self {
            start,
            end,
            page_size: optional(SPIFFS_PAGE_SIZE, DEFAULT_PAGE_SIZE)?,
            block_size: optional(SPIFFS_BLOCK_SIZE, DEFAULT_BLOCK_SIZE)?,
        })
    }

    /// Image size in bytes
    pub fn size(&self) -> u64 {
        self.end - self.start
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARDS: &str = "\
nodemcu.name=NodeMCU 0.9 (ESP-12 Module)
nodemcu.upload.resetmethod=nodemcu
nodemcu.upload.speed=115200
nodemcu.build.spiffs_pagesize=256
nodemcu.menu.FlashSize.4M1M.build.spiffs_start=0x300000
nodemcu.menu.FlashSize.4M1M.build.spiffs_end=0x3FB000
nodemcu.menu.FlashSize.4M1M.build.spiffs_blocksize=8192
nodemcu.menu.FlashSize.4M3M.build.spiffs_start=0x100000
nodemcu.menu.FlashSize.4M3M.build.spiffs_end=0x3FB000
nodemcuv2.upload.speed=921600
d1_mini.build.spiffs_start=0x200000
";

    fn target(board: &str) -> Target {
        Target::parse(&format!("esp8266:esp8266:{board}"))
    }

    #[test]
    fn test_project_flash_size_wins() {
        let project = ProjectConfig {
            flash_size: Some("4M3M".to_string()),
            ..ProjectConfig::default()
        };
        let preferences: Properties = [("custom_FlashSize", "nodemcu_4M1M")].into_iter().collect();

        let config = resolve_memory_config(&project, &preferences, &target("nodemcu")).unwrap();
        assert_eq!(config, "4M3M");
    }

    #[test]
    fn test_flash_size_from_preferences() {
        let preferences: Properties =
            [("custom_FlashSize", "nodemcuv2_4M1M")].into_iter().collect();

        let config =
            resolve_memory_config(&ProjectConfig::default(), &preferences, &target("nodemcuv2"))
                .unwrap();
        assert_eq!(config, "4M1M");
    }

    #[test]
    fn test_flash_size_for_other_board_is_ambiguous() {
        let preferences: Properties = [("custom_FlashSize", "d1_mini_4M1M")].into_iter().collect();

        let err =
            resolve_memory_config(&ProjectConfig::default(), &preferences, &target("nodemcu"))
                .unwrap_err();
        assert!(matches!(err, UploadError::AmbiguousFlashSize { .. }));
    }

    #[test]
    fn test_scan_board_and_variant_keys() {
        let params = FlashParameters::scan(BOARDS, "nodemcu", "4M1M");

        assert_eq!(params.get(SPIFFS_START), Some("0x300000"));
        assert_eq!(params.get(SPIFFS_END), Some("0x3FB000"));
        assert_eq!(params.get(SPIFFS_BLOCK_SIZE), Some("8192"));
        assert_eq!(params.get(SPIFFS_PAGE_SIZE), Some("256"));
        assert_eq!(params.get(RESET_METHOD), Some("nodemcu"));
        // nodemcuv2 keys must not leak into nodemcu
        assert_eq!(params.get(UPLOAD_SPEED), Some("115200"));
        // "name" is not a build/upload key
        assert!(params.get("name").is_none());
    }

    #[test]
    fn test_scan_later_lines_overwrite() {
        let boards = "\
generic.build.spiffs_start=0x100000
generic.menu.FlashSize.1M.build.spiffs_start=0xEB000
";
        let params = FlashParameters::scan(boards, "generic", "1M");
        assert_eq!(params.get(SPIFFS_START), Some("0xEB000"));
    }

    #[test]
    fn test_layout_size() {
        let boards = "\
nodemcu.build.spiffs_start=0x100000
nodemcu.build.spiffs_end=0x300000
";
        let params =
            resolve_flash_parameters(boards, &target("nodemcu"), "4M", &ProjectConfig::default())
                .unwrap();
        let layout = SpiffsLayout::from_parameters(&params).unwrap();

        assert_eq!(layout.start, 0x10_0000);
        assert_eq!(layout.end, 0x30_0000);
        assert_eq!(layout.size(), 0x20_0000);
        assert_eq!(layout.page_size, 256);
        assert_eq!(layout.block_size, 4096);
    }

    #[test]
    fn test_missing_end_is_missing_parameter() {
        let err = resolve_flash_parameters(
            BOARDS,
            &target("d1_mini"),
            "4M1M",
            &ProjectConfig::default(),
        )
        .unwrap_err();

        assert!(matches!(
            err,
            UploadError::MissingParameter { ref param, .. } if param == SPIFFS_END
        ));
    }

    #[test]
    fn test_project_overrides_upload_settings() {
        let project = ProjectConfig {
            upload_speed: Some("460800".to_string()),
            reset_method: Some("ck".to_string()),
            ..ProjectConfig::default()
        };
        let params = resolve_flash_parameters(BOARDS, &target("nodemcu"), "4M1M", &project).unwrap();

        assert_eq!(params.get(UPLOAD_SPEED), Some("460800"));
        assert_eq!(params.get(RESET_METHOD), Some("ck"));
    }

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("x", "0x100000").unwrap(), 0x10_0000);
        assert_eq!(parse_int("x", "0X3fb000").unwrap(), 0x3F_B000);
        assert_eq!(parse_int("x", "4096").unwrap(), 4096);
        assert!(matches!(
            parse_int("x", "4K"),
            Err(UploadError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_end_before_start_is_invalid() {
        let mut params = FlashParameters::default();
        params.set(SPIFFS_START, "0x300000");
        params.set(SPIFFS_END, "0x100000");

        let err = SpiffsLayout::from_parameters(&params).unwrap_err();
        assert!(matches!(err, UploadError::InvalidParameter { .. }));
    }

    mod proptests {
        use super::*;
        use crate::test_utils::generators::{board_id, flash_offset, flash_variant};
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn test_layout_size_from_scanned_menu(
                board in board_id(),
                variant in flash_variant(),
                start in flash_offset(),
                len in flash_offset(),
            ) {
                let boards = format!(
                    "{board}.menu.FlashSize.{variant}.build.spiffs_start={start:#X}\n\
                     {board}.menu.FlashSize.{variant}.build.spiffs_end={}\n",
                    start + len
                );
                let params = FlashParameters::scan(&boards, &board, &variant);
                let layout = SpiffsLayout::from_parameters(&params).unwrap();

                prop_assert_eq!(layout.start, start);
                prop_assert_eq!(layout.size(), len);
                prop_assert_eq!(layout.page_size, 256);
                prop_assert_eq!(layout.block_size, 4096);
            }

            #[test]
            fn test_other_boards_never_leak(board in board_id(), variant in flash_variant()) {
                let boards = format!("x{board}.build.spiffs_start=0x1000\n");
                prop_assert!(FlashParameters::scan(&boards, &board, &variant).is_empty());
            }
        }
    }
}
