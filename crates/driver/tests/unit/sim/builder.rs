//! # Builder Tests
//!
//! Checks that a platform description turns into the right set of components, in the
//! right order, with chained memory-model windows.

use fasedsim_driver::DriverError;
use fasedsim_driver::common::HOST_MEM_BASE;
use fasedsim_driver::config::{MemoryModelConfig, PlatformConfig, RegisterConfig};
use fasedsim_driver::sim::build_driver;
use fasedsim_driver::sim::builder::stats_file_name;
use pretty_assertions::assert_eq;

use crate::common::harness::{args, platform_in};
use crate::common::mocks::simif::ScriptedSimif;

#[test]
fn default_platform_components() {
    let dir = tempfile::tempdir().unwrap();
    let d = build_driver(&args(&[]), &platform_in(dir.path()), ScriptedSimif::new()).unwrap();

    let names: Vec<_> = d.endpoints().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["assertions", "prints", "test_harness"]);
    assert_eq!(d.print_endpoint().map(|e| e.name()), Some("prints"));
    assert_eq!(d.models().len(), 1);
    assert_eq!(d.models()[0].window().base, HOST_MEM_BASE);
    assert_eq!(d.models()[0].name(), "fased");
    assert!(d.tasks().is_empty());
}

#[test]
fn harness_is_always_present() {
    let dir = tempfile::tempdir().unwrap();
    let mut platform = platform_in(dir.path());
    platform.widgets.clear();
    let d = build_driver(&args(&[]), &platform, ScriptedSimif::new()).unwrap();

    let names: Vec<_> = d.endpoints().iter().map(|e| e.name()).collect();
    assert_eq!(names, vec!["test_harness"]);
    assert!(d.print_endpoint().is_none());
}

#[test]
fn model_windows_are_chained() {
    let dir = tempfile::tempdir().unwrap();
    let mut platform = platform_in(dir.path());
    platform.memory_models = vec![
        MemoryModelConfig {
            name: "ddr0".to_string(),
            target_addr_bits: 20,
            ..MemoryModelConfig::default()
        },
        MemoryModelConfig {
            name: "ddr1".to_string(),
            target_addr_bits: 16,
            ..MemoryModelConfig::default()
        },
        MemoryModelConfig::default(),
    ];
    let d = build_driver(&args(&[]), &platform, ScriptedSimif::new()).unwrap();

    let windows: Vec<_> = d.models().iter().map(|m| m.window()).collect();
    assert_eq!(windows[0].base, HOST_MEM_BASE);
    assert_eq!(windows[0].size, 1 << 20);
    assert_eq!(windows[1].base, windows[0].end());
    assert_eq!(windows[2].base, windows[1].end());
    assert_eq!(windows[2].size, 1 << 32);
}

#[test]
fn run_flags_reach_the_driver() {
    let dir = tempfile::tempdir().unwrap();
    let d = build_driver(
        &args(&["+max-cycles=777", "+profile-interval=10", "+zero-out-dram"]),
        &platform_in(dir.path()),
        ScriptedSimif::new(),
    )
    .unwrap();
    assert_eq!(d.config().max_cycles, Some(777));
    assert!(d.config().zero_out_dram);
    assert_eq!(d.tasks().len(), 1);
}

#[test]
fn duplicate_widget_is_rejected_before_anything_is_built() {
    let platform =
        PlatformConfig::from_json(r#"{ "widgets": [ { "kind": "assertion" }, { "kind": "assertion" } ] }"#)
            .unwrap();
    assert!(matches!(
        build_driver(&args(&[]), &platform, ScriptedSimif::new()),
        Err(DriverError::DuplicateWidget("assertion"))
    ));
}

#[test]
fn construction_errors_propagate() {
    let dir = tempfile::tempdir().unwrap();
    let platform = platform_in(dir.path());

    assert!(matches!(
        build_driver(&args(&["+max-cycles=many"]), &platform, ScriptedSimif::new()),
        Err(DriverError::InvalidPlusArg { .. })
    ));
    assert!(matches!(
        build_driver(&args(&["+mm_nope=1"]), &platform, ScriptedSimif::new()),
        Err(DriverError::UnknownRegister(name)) if name == "nope"
    ));

    let mut wide = platform.clone();
    wide.memory_models[0].target_addr_bits = 64;
    assert!(matches!(
        build_driver(&args(&[]), &wide, ScriptedSimif::new()),
        Err(DriverError::InvalidWindowWidth(64))
    ));
}

#[test]
fn register_plusargs_reach_only_the_models_that_have_them() {
    let dir = tempfile::tempdir().unwrap();
    let mut platform = platform_in(dir.path());
    platform.memory_models.push(MemoryModelConfig {
        name: "relaxed".to_string(),
        write_registers: vec![RegisterConfig {
            name: "relaxFunctionalModel".to_string(),
            offset: 0x40,
            default: Some(0),
        }],
        ..MemoryModelConfig::default()
    });

    let mut d = build_driver(
        &args(&["+max-cycles=60", "+mm_readMaxReqs=4", "+mm_relaxFunctionalModel=1"]),
        &platform,
        ScriptedSimif::new(),
    )
    .unwrap();
    assert_eq!(d.models().len(), 2);

    let second = d.models()[1].window().base;
    let _ = d.run().unwrap();
    let sim = d.simif();
    assert_eq!(sim.peek(HOST_MEM_BASE + 0x40), 1);
    assert_eq!(sim.peek(HOST_MEM_BASE + 0x44), 4);
    assert_eq!(sim.peek(second + 0x40), 1);
    assert_eq!(sim.peek(second + 0x44), 0);
}

#[test]
fn stats_files_are_indexed() {
    assert_eq!(stats_file_name(0), "memory_stats0.csv");
    assert_eq!(stats_file_name(12), "memory_stats12.csv");
}
