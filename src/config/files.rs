//! Well-known file and directory names

/// Project configuration, relative to the project root
pub const PROJECT_CONFIG_FILE: &str = ".vscode/arduino.json";

/// Arduino preferences file inside the preferences directory
pub const PREFERENCES_FILE: &str = "preferences.txt";

/// Board definitions inside the installed board package
pub const BOARDS_FILE: &str = "boards.txt";

/// Default data directory, relative to the project root
pub const DATA_DIR: &str = "data";

/// Name of the packed image inside the temp directory
pub const IMAGE_FILE: &str = "spiffs.bin";

/// Settings file inside the esp8266fs config directory
pub const SETTINGS_FILE: &str = "config.toml";

/// macOS application bundle of the Arduino IDE
pub const ARDUINO_APP_BUNDLE: &str = "Arduino.app";

/// Arduino IDE executable name
pub const ARDUINO_EXECUTABLE: &str = "arduino";
