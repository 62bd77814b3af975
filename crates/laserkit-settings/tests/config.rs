use laserkit_core::error::SettingsError;
use laserkit_settings::DeviceConfig;

#[test]
fn defaults_match_the_reference_device() {
    let config = DeviceConfig::default();
    assert_eq!(config.port, "auto");
    assert_eq!(config.baud_rate, 115200);
    assert_eq!(config.bed_width_mm, 300.0);
    assert_eq!(config.bed_height_mm, 300.0);
    assert_eq!(config.max_travel_rate, 1200.0);
    assert_eq!(config.max_cut_rate, 6000.0);
    assert_eq!(config.identification_prefix, "Grbl");
    assert_eq!(config.reset_wait_secs, 5);
    assert!(!config.homing);
    assert!(config.wait_for_ack);
    assert_eq!(config.resolutions_dpi, vec![500.0]);
    config.validate().unwrap();
}

#[test]
fn pre_job_lines_split_and_trim() {
    let config = DeviceConfig::default();
    let lines: Vec<&str> = config.pre_job_lines().collect();
    assert_eq!(lines, vec!["G21", "G90", "G10 P0 L20 X0", "G10 L20 Y0"]);
}

#[test]
fn empty_gcode_list_yields_no_lines() {
    let config = DeviceConfig {
        post_job_gcode: String::new(),
        ..DeviceConfig::default()
    };
    assert_eq!(config.post_job_lines().count(), 0);
}

#[test]
fn negative_bed_is_rejected() {
    let config = DeviceConfig {
        bed_width_mm: -1.0,
        ..DeviceConfig::default()
    };
    match config.validate().unwrap_err() {
        SettingsError::InvalidValue { setting, .. } => assert_eq!(setting, "bed_width_mm"),
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn zero_baud_is_rejected() {
    let config = DeviceConfig {
        baud_rate: 0,
        ..DeviceConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn empty_resolution_list_is_rejected() {
    let config = DeviceConfig {
        resolutions_dpi: vec![],
        ..DeviceConfig::default()
    };
    assert!(config.validate().is_err());
}

#[test]
fn toml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.toml");

    let mut config = DeviceConfig::default();
    config.homing = true;
    config.reset_wait_secs = 0;
    config.save_to_file(&path).unwrap();

    let loaded = DeviceConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn json_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.json");

    let config = DeviceConfig {
        port: "/dev/ttyACM0".to_string(),
        ack_timeout_ms: Some(30_000),
        ..DeviceConfig::default()
    };
    config.save_to_file(&path).unwrap();

    let loaded = DeviceConfig::load_from_file(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn unknown_keys_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.toml");
    std::fs::write(&path, "prot = \"/dev/ttyUSB0\"\n").unwrap();

    assert!(matches!(
        DeviceConfig::load_from_file(&path),
        Err(SettingsError::Parse { .. })
    ));
}

#[test]
fn invalid_values_in_file_are_rejected_on_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("device.toml");
    std::fs::write(&path, "max_cut_rate = -5.0\n").unwrap();

    assert!(matches!(
        DeviceConfig::load_from_file(&path),
        Err(SettingsError::InvalidValue { .. })
    ));
}
