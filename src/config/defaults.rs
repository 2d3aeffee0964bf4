//! Default configuration values

/// The only board package / architecture this tool knows how to flash
pub const SUPPORTED_FAMILY: &str = "esp8266";

/// SPIFFS page size used when the board does not define `spiffs_pagesize`
pub const DEFAULT_PAGE_SIZE: &str = "256";

/// SPIFFS block size used when the board does not define `spiffs_blocksize`
pub const DEFAULT_BLOCK_SIZE: &str = "4096";

/// Interpreter used to run the OTA script
pub const DEFAULT_PYTHON: &str = "python";

/// Tool that builds the SPIFFS image
pub const PACKER_TOOL: &str = "mkspiffs";

/// Tool that flashes over a serial port
pub const SERIAL_TOOL: &str = "esptool";

/// Tool that flashes over the network
pub const OTA_TOOL: &str = "espota.py";
