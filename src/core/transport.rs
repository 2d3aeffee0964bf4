//! Upload transport selection

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use super::project::ProjectConfig;
use super::properties::Properties;
use crate::config::defaults::{OTA_TOOL, SERIAL_TOOL};
use crate::error::{Result, UploadError};

/// How the image reaches the device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "port", rename_all = "lowercase")]
pub enum Transport {
    /// Serial port such as `COM6` or `/dev/ttyUSB0`, flashed with esptool
    Serial(String),
    /// Device IPv4 address, flashed over the air with espota.py
    Network(String),
}

impl Transport {
    /// Classify a configured port value
    pub fn classify(port: &str) -> Self {
        if is_ipv4(port) {
            Self::Network(port.to_string())
        } else {
            Self::Serial(port.to_string())
        }
    }

    /// Serial port or IP address
    pub fn port(&self) -> &str {
        match self {
            Self::Serial(port) | Self::Network(port) => port,
        }
    }

    /// Name of the board-package tool that performs the upload
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::Serial(_) => SERIAL_TOOL,
            Self::Network(_) => OTA_TOOL,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Serial(port) => write!(f, "serial {port}"),
            Self::Network(ip) => write!(f, "network {ip}"),
        }
    }
}

/// Dotted-quad check
pub fn is_ipv4(port: &str) -> bool {
    static IPV4: OnceLock<Option<Regex>> = OnceLock::new();
    IPV4.get_or_init(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+$").ok())
        .as_ref()
        .is_some_and(|re| re.is_match(port))
}

/// Resolve the upload port from the project, falling back to preferences
pub fn resolve_port(project: &ProjectConfig, preferences: &Properties) -> Result<String> {
    project
        .port
        .as_deref()
        .or_else(|| preferences.get_non_empty("serial.port"))
        .map(str::to_string)
        .ok_or_else(|| UploadError::NotConfigured {
            what: "upload port".to_string(),
            hint: "set \"port\" in arduino.json or select a port in the Arduino IDE".to_string(),
        })
}

/// Resolve the port and pick the transport for it
pub fn resolve_transport(project: &ProjectConfig, preferences: &Properties) -> Result<Transport> {
    let transport = Transport::classify(&resolve_port(project, preferences)?);
    tracing::debug!("Output port: {transport}");
    Ok(transport)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ip_routes_to_network() {
        assert_eq!(
            Transport::classify("192.168.1.5"),
            Transport::Network("192.168.1.5".to_string())
        );
        assert_eq!(Transport::classify("192.168.1.5").tool_name(), "espota.py");
    }

    #[test]
    fn test_ports_route_to_serial() {
        for port in ["COM6", "/dev/ttyUSB0", "/dev/cu.usbserial-1420", "192.168.1"] {
            let transport = Transport::classify(port);
            assert_eq!(transport, Transport::Serial(port.to_string()));
            assert_eq!(transport.tool_name(), "esptool");
        }
    }

    #[test]
    fn test_project_port_wins() {
        let project = ProjectConfig {
            port: Some("10.0.0.7".to_string()),
            ..ProjectConfig::default()
        };
        let preferences: Properties = [("serial.port", "COM3")].into_iter().collect();

        let transport = resolve_transport(&project, &preferences).unwrap();
        assert_eq!(transport.port(), "10.0.0.7");
    }

    #[test]
    fn test_preferences_port_fallback() {
        let preferences: Properties = [("serial.port", "COM3")].into_iter().collect();
        let transport = resolve_transport(&ProjectConfig::default(), &preferences).unwrap();
        assert_eq!(transport, Transport::Serial("COM3".to_string()));
    }

    #[test]
    fn test_no_port_configured() {
        let err = resolve_port(&ProjectConfig::default(), &Properties::new()).unwrap_err();
        assert!(matches!(err, UploadError::NotConfigured { .. }));
    }

    mod proptests {
        use super::*;
        use crate::test_utils::generators::{ipv4_address, serial_port};
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(100))]

            #[test]
            fn test_any_dotted_quad_is_network(ip in ipv4_address()) {
                prop_assert_eq!(Transport::classify(&ip), Transport::Network(ip.clone()));
            }

            #[test]
            fn test_serial_ports_stay_serial(port in serial_port()) {
                prop_assert_eq!(Transport::classify(&port).tool_name(), "esptool");
            }
        }
    }
}
