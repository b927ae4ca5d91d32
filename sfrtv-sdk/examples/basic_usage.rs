//! Basic usage example of the SFR TV SDK
//!
//! Sets up one box from a platform entry, polls its status a few times and
//! prints the reconciled state.
//!
//! Run with: SFRTV_LOG=debug cargo run -p sfrtv-sdk --example basic_usage -- 192.168.1.20 sources.json

use std::thread;
use std::time::Duration;

use sfrtv_sdk::{
    logging, setup_platform, KnownDevices, Operation, PlatformConfig, SdkError, SharedDevice,
    SourceCatalog,
};

fn main() -> Result<(), SdkError> {
    logging::init_logging_from_env().map_err(|e| SdkError::InvalidConfig(e.to_string()))?;

    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "192.168.1.20".to_string());
    let sources_path = args.next().unwrap_or_else(|| "sources.json".to_string());

    let config = PlatformConfig::from_json_str(&format!(r#"{{"host": "{}", "name": "Salon"}}"#, host))?;
    let sources = SourceCatalog::load(&sources_path)?;
    println!("Loaded {} channels from {}", sources.len(), sources_path);

    let known = KnownDevices::new();
    let Some(device) = setup_platform(&known, &config, sources)? else {
        println!("No device configured");
        return Ok(());
    };
    let device = SharedDevice::new(device);

    for _ in 0..3 {
        device.refresh();
        let state = device.state();
        println!(
            "{}: {} (source: {})",
            device.name(),
            state.media_state().as_str(),
            state.current_source.as_deref().unwrap_or("-")
        );
        thread::sleep(Duration::from_secs(5));
    }

    let first = device.with_device(|d| d.source_list().into_iter().next());
    if let Some(channel) = first {
        println!("Zapping to {}", channel);
        device.issue(Operation::SelectSource(channel));
    }

    Ok(())
}
