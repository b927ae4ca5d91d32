//! Platform setup and duplicate-device tracking

use std::collections::HashSet;
use std::net::{IpAddr, ToSocketAddrs};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::{DeviceConfig, PlatformConfig, SourceCatalog};
use crate::device::SfrTvDevice;
use crate::SdkError;

/// Addresses of the boxes already set up
///
/// Owned by the application and passed to [`setup_platform`]; a box reached
/// under two host names is only added once.
#[derive(Debug, Default)]
pub struct KnownDevices {
    addresses: Mutex<HashSet<IpAddr>>,
}

impl KnownDevices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an address; false when it was already known
    pub fn register(&self, ip: IpAddr) -> bool {
        self.addresses.lock().insert(ip)
    }

    pub fn contains(&self, ip: &IpAddr) -> bool {
        self.addresses.lock().contains(ip)
    }

    pub fn len(&self) -> usize {
        self.addresses.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.addresses.lock().is_empty()
    }
}

/// Resolve a host name to the first address it maps to
pub fn resolve_host(host: &str, port: u16) -> Result<IpAddr, SdkError> {
    let resolution_error = |source| SdkError::HostResolution {
        host: host.to_string(),
        source,
    };
    (host, port)
        .to_socket_addrs()
        .map_err(resolution_error)?
        .next()
        .map(|addr| addr.ip())
        .ok_or_else(|| {
            resolution_error(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no address found",
            ))
        })
}

/// Create the device described by a platform entry
///
/// Returns `Ok(None)` when the entry has no host or names a box that is
/// already registered.
pub fn setup_platform(
    known: &KnownDevices,
    config: &PlatformConfig,
    sources: SourceCatalog,
) -> Result<Option<SfrTvDevice>, SdkError> {
    let Some(host) = config.host.as_deref() else {
        warn!("Cannot determine device");
        return Ok(None);
    };

    let ip = resolve_host(host, config.port)?;
    if !known.register(ip) {
        info!("Ignoring duplicate SFR TV {}:{}", host, config.port);
        return Ok(None);
    }

    let device_config = DeviceConfig::new(host, config.port, &config.name, config.timeout(), sources);
    info!("SFR TV (STB7) {}:{} added as '{}'", host, config.port, config.name);
    Ok(Some(SfrTvDevice::new(device_config)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn platform(host: Option<&str>) -> PlatformConfig {
        PlatformConfig {
            host: host.map(str::to_string),
            name: "Salon".to_string(),
            timeout: 20,
            port: 7682,
        }
    }

    #[test]
    fn test_register_deduplicates() {
        let known = KnownDevices::new();
        let ip = IpAddr::V4(Ipv4Addr::new(192, 168, 1, 20));

        assert!(known.register(ip));
        assert!(!known.register(ip));
        assert!(known.contains(&ip));
        assert_eq!(known.len(), 1);
    }

    #[test]
    fn test_resolve_literal_address() {
        assert_eq!(
            resolve_host("127.0.0.1", 7682).unwrap(),
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        );
    }

    #[test]
    fn test_setup_without_host() {
        let known = KnownDevices::new();
        let device = setup_platform(&known, &platform(None), SourceCatalog::default()).unwrap();
        assert!(device.is_none());
        assert!(known.is_empty());
    }

    #[test]
    fn test_setup_adds_device_once() {
        let known = KnownDevices::new();
        let sources = SourceCatalog::from_json(r#"{"TF1": 192}"#).unwrap();

        let device = setup_platform(&known, &platform(Some("127.0.0.1")), sources.clone())
            .unwrap()
            .expect("first setup should add the device");
        assert_eq!(device.name(), "Salon");
        assert_eq!(device.source_list(), vec!["TF1".to_string()]);

        let duplicate = setup_platform(&known, &platform(Some("127.0.0.1")), sources).unwrap();
        assert!(duplicate.is_none());
        assert_eq!(known.len(), 1);
    }
}
