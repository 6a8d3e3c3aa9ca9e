//! Unit tests for instance and bundle configuration.
use super::*;

fn chip(host: u8, cs: u8) -> InstanceConfig {
    InstanceConfig::builder(HostId(host), GpioPin(cs))
        .bus_pins(GpioPin(36), GpioPin(37), GpioPin(38))
        .build()
}

//==================================================================================INSTANCE_CONFIG
#[test]
/// Builder defaults match the usual 16 MHz / 1 Mbit/s bridge setup.
fn test_builder_defaults() {
    let cfg = chip(2, 33);
    assert_eq!(cfg.bitrate, CanBitrate::Kbps1000);
    assert_eq!(cfg.oscillator, Oscillator::Mhz16);
    assert_eq!(cfg.spi_clock_hz, 10_000_000);
    assert_eq!(cfg.queue_depth, 64);
    assert_eq!(cfg.device.int, None);
    assert_eq!(cfg.resource(), (HostId(2), GpioPin(33)));
    assert!(cfg.validate(0).is_ok());
}

#[test]
/// SPI clock and queue depth are range checked.
fn test_instance_validation() {
    let too_fast = InstanceConfig::builder(HostId(1), GpioPin(5))
        .spi_clock_hz(20_000_000)
        .build();
    assert_eq!(
        too_fast.validate(3),
        Err(ConfigError::InvalidSpiClock {
            index: 3,
            hz: 20_000_000
        })
    );

    let no_queue = InstanceConfig::builder(HostId(1), GpioPin(5))
        .queue_depth(0)
        .build();
    assert_eq!(
        no_queue.validate(1),
        Err(ConfigError::InvalidQueueDepth { index: 1 })
    );
}

#[test]
fn test_bitrate_and_oscillator_values() {
    assert_eq!(CanBitrate::Kbps31_25.bits_per_second(), 31_250);
    assert_eq!(CanBitrate::Kbps500.bits_per_second(), 500_000);
    assert_eq!(Oscillator::Mhz8.hz(), 8_000_000);
}

//==================================================================================BUNDLE_CONFIG
#[test]
/// Count must stay within `1..=MAX_INSTANCES`.
fn test_bundle_count_bounds() {
    assert_eq!(BundleConfig::new().validate(), Err(ConfigError::InvalidCount { count: 0 }));
    assert_eq!(
        BundleConfig::from_slice(&[]),
        Err(ConfigError::InvalidCount { count: 0 })
    );

    let nine: [InstanceConfig; 9] = core::array::from_fn(|i| chip(1, i as u8));
    assert_eq!(
        BundleConfig::from_slice(&nine),
        Err(ConfigError::InvalidCount { count: 9 })
    );
    assert_eq!(
        bundle::validate_instances(&nine),
        Err(ConfigError::InvalidCount { count: 9 })
    );

    let mut bundle = BundleConfig::from_slice(&nine[..MAX_INSTANCES]).expect("eight fit");
    assert_eq!(bundle.len(), MAX_INSTANCES);
    assert!(bundle.validate().is_ok());
    assert_eq!(bundle.push(nine[8]), Err(ConfigError::CapacityExceeded));
}

#[test]
/// Two instances on the same host and chip-select are rejected.
fn test_bundle_duplicate_resource() {
    let bundle = BundleConfig::from_slice(&[chip(1, 10), chip(2, 10), chip(1, 11), chip(1, 10)])
        .expect("count is valid");
    assert_eq!(
        bundle.validate(),
        Err(ConfigError::DuplicateResource { first: 0, second: 3 })
    );
}

#[test]
/// Same chip-select on distinct hosts is a different resource.
fn test_bundle_push_and_get() {
    let mut bundle = BundleConfig::new();
    bundle.push(chip(1, 10)).expect("room left");
    bundle.push(chip(2, 10)).expect("room left");
    assert_eq!(bundle.len(), 2);
    assert!(!bundle.is_empty());
    assert_eq!(bundle.get(1).map(|c| c.host), Some(HostId(2)));
    assert!(bundle.get(2).is_none());
    assert!(bundle.validate().is_ok());
}

#[test]
fn test_config_kind() {
    let bundle = BundleConfig::from_slice(&[chip(1, 10)]).expect("valid");
    assert_eq!(CanConfig::MultiBridge(bundle).kind(), BackendKind::MultiBridge);
    assert_eq!(CanConfig::SingleBridge(chip(1, 10)).kind(), BackendKind::SingleBridge);
    let builtin = BuiltinConfig::builder(GpioPin(39), GpioPin(40)).build();
    assert_eq!(CanConfig::Builtin(builtin).kind(), BackendKind::Builtin);
    assert!(builtin.validate().is_ok());
    assert_eq!(
        BuiltinConfig::builder(GpioPin(39), GpioPin(40)).queues(0, 20).build().validate(),
        Err(ConfigError::InvalidControllerQueue {
            tx_len: 0,
            rx_len: 20
        })
    );
}
