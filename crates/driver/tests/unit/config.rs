//! # Configuration Tests
//!
//! Covers run-flag parsing from plusargs, the shared plusarg lookup, and the JSON
//! platform description with its defaults and validation.

use std::io::Write;

use fasedsim_driver::config::{
    PlatformConfig, PlusArgs, RunConfig, WidgetConfig, parse_u64,
};
use fasedsim_driver::DriverError;
use pretty_assertions::assert_eq;
use rstest::rstest;
use tempfile::NamedTempFile;

fn run_config(args: &[&str]) -> RunConfig {
    RunConfig::from_args(args).unwrap()
}

#[test]
fn no_flags_gives_defaults() {
    let config = run_config(&[]);
    assert_eq!(config, RunConfig::default());
    assert_eq!(config.max_cycles, None);
    assert_eq!(config.profile_interval, None);
    assert!(!config.zero_out_dram);
}

#[rstest]
#[case("+max-cycles=1000", Some(1000))]
#[case("+max-cycles=0", Some(0))]
#[case("+max-cycles=-1", None)]
#[case("+max-cycles= 42", Some(42))]
fn max_cycles_values(#[case] arg: &str, #[case] expected: Option<u64>) {
    assert_eq!(run_config(&[arg]).max_cycles, expected);
}

#[rstest]
#[case("+profile-interval=100", Some(100))]
#[case("+profile-interval=-1", None)]
fn profile_interval_values(#[case] arg: &str, #[case] expected: Option<u64>) {
    assert_eq!(run_config(&[arg]).profile_interval, expected);
}

#[rstest]
#[case("+max-cycles=abc")]
#[case("+max-cycles=")]
#[case("+max-cycles=-2")]
#[case("+profile-interval=1.5")]
#[case("+profile-interval=0x10")]
fn malformed_numbers_are_rejected(#[case] arg: &str) {
    assert!(matches!(
        RunConfig::from_args([arg]),
        Err(DriverError::InvalidPlusArg { .. })
    ));
}

#[test]
fn zero_out_dram_is_a_bare_flag() {
    assert!(run_config(&["+zero-out-dram"]).zero_out_dram);
}

#[test]
fn unrecognized_arguments_are_ignored() {
    let config = run_config(&["--verbose", "+mm_readMaxReqs=4", "+permissive", "foo"]);
    assert_eq!(config, RunConfig::default());
}

#[test]
fn later_flags_override_earlier_ones() {
    let config = run_config(&["+max-cycles=10", "+max-cycles=20"]);
    assert_eq!(config.max_cycles, Some(20));
}

#[test]
fn all_flags_together() {
    let config = run_config(&[
        "+max-cycles=5000",
        "+profile-interval=250",
        "+zero-out-dram",
    ]);
    assert_eq!(
        config,
        RunConfig {
            max_cycles: Some(5000),
            profile_interval: Some(250),
            zero_out_dram: true,
        }
    );
}

#[test]
fn plusargs_last_value_wins() {
    let args = PlusArgs::new(["+print-file=a.txt", "+print-file=b.txt"]);
    assert_eq!(args.value("+print-file="), Some("b.txt"));
    assert_eq!(args.value("+print-start="), None);
    assert!(args.has("+print-file"));
}

#[test]
fn plusargs_numeric_lookup() {
    let args = PlusArgs::new(["+print-start=0x100", "+print-end=abc"]);
    assert_eq!(args.u64_value("+print-start=").unwrap(), Some(0x100));
    assert_eq!(args.u64_value("+missing=").unwrap(), None);
    assert!(args.u64_value("+print-end=").is_err());
}

#[test]
fn plusargs_with_prefix_splits_name_and_value() {
    let args = PlusArgs::new(["+mm_readMaxReqs=4", "+mm_broken", "+mm_writeMaxReqs=0x2", "+x=1"]);
    let pairs: Vec<_> = args.with_prefix("+mm_").collect();
    assert_eq!(pairs, vec![("readMaxReqs", "4"), ("writeMaxReqs", "0x2")]);
}

#[rstest]
#[case("0", Some(0))]
#[case("1234", Some(1234))]
#[case("0x1F", Some(0x1F))]
#[case("0XfF", Some(0xFF))]
#[case("-1", None)]
#[case("twelve", None)]
fn parse_u64_cases(#[case] input: &str, #[case] expected: Option<u64>) {
    assert_eq!(parse_u64(input), expected);
}

#[test]
fn empty_platform_is_the_default() {
    let platform = PlatformConfig::from_json("{}").unwrap();
    assert_eq!(platform, PlatformConfig::default());
    assert_eq!(platform.memory_models.len(), 1);
    assert!(platform.assertion().is_some());
    assert!(platform.print().is_some());
    platform.validate().unwrap();
}

#[test]
fn default_memory_model_registers() {
    let platform = PlatformConfig::default();
    let model = &platform.memory_models[0];
    assert_eq!(model.name, "fased");
    assert_eq!(model.target_addr_bits, 32);
    let reads: Vec<_> = model.read_registers.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(
        reads,
        vec!["totalReads", "totalWrites", "totalReadBeats", "totalWriteBeats"]
    );
    assert!(model.write_registers.iter().all(|r| r.default.is_some()));
}

#[test]
fn platform_with_two_models_and_no_widgets() {
    let json = r#"{
        "memory_models": [
            { "name": "ddr0", "target_addr_bits": 20 },
            { "name": "ddr1", "target_addr_bits": 24,
              "read_registers": [ { "name": "hits", "offset": 16 } ],
              "write_registers": [] }
        ],
        "widgets": [],
        "test_harness": { "base": 8192 },
        "output_dir": "stats"
    }"#;
    let platform = PlatformConfig::from_json(json).unwrap();
    assert_eq!(platform.memory_models.len(), 2);
    assert_eq!(platform.memory_models[1].read_registers[0].offset, 16);
    assert!(platform.memory_models[1].write_registers.is_empty());
    assert!(platform.assertion().is_none());
    assert!(platform.print().is_none());
    assert_eq!(platform.test_harness.base, 0x2000);
    assert_eq!(platform.output_dir.to_str(), Some("stats"));
}

#[test]
fn widget_kinds_are_tagged() {
    let json = r#"{ "widgets": [
        { "kind": "assertion", "base": 4096, "messages": ["overflow", "underflow"] },
        { "kind": "print", "base": 4352 }
    ] }"#;
    let platform = PlatformConfig::from_json(json).unwrap();
    let assertion = platform.assertion().unwrap();
    assert_eq!(assertion.messages, vec!["overflow", "underflow"]);
    assert_eq!(platform.print().unwrap().base, 0x1100);
    let kinds: Vec<_> = platform.widgets.iter().map(WidgetConfig::kind).collect();
    assert_eq!(kinds, vec!["assertion", "print"]);
}

#[rstest]
#[case(r#"{ "widgets": [ { "kind": "print" }, { "kind": "print" } ] }"#, "print")]
#[case(r#"{ "widgets": [ { "kind": "assertion" }, { "kind": "print" }, { "kind": "assertion" } ] }"#, "assertion")]
fn duplicate_widgets_fail_validation(#[case] json: &str, #[case] kind: &str) {
    let platform = PlatformConfig::from_json(json).unwrap();
    match platform.validate() {
        Err(DriverError::DuplicateWidget(k)) => assert_eq!(k, kind),
        other => panic!("expected duplicate widget error, got {other:?}"),
    }
}

#[rstest]
#[case(r#"{ "bogus": 1 }"#)]
#[case(r#"{ "widgets": [ { "kind": "uart" } ] }"#)]
#[case(r#"{ "host": { "step_size": -4 } }"#)]
#[case("not json")]
fn malformed_platforms_are_rejected(#[case] json: &str) {
    assert!(matches!(
        PlatformConfig::from_json(json),
        Err(DriverError::Config(_))
    ));
}

#[test]
fn platform_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, r#"{{ "traffic": {{ "transactions": 4, "fail_at": 300, "fail_id": 2 }} }}"#)
        .unwrap();
    let platform = PlatformConfig::from_file(file.path()).unwrap();
    assert_eq!(platform.traffic.transactions, 4);
    assert_eq!(platform.traffic.fail_at, Some(300));
    assert_eq!(platform.traffic.fail_id, 2);
    assert_eq!(platform.traffic.interval, 8);
}

#[test]
fn missing_platform_file_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");
    match PlatformConfig::from_file(&path) {
        Err(DriverError::File { path: p, .. }) => assert_eq!(p, path),
        other => panic!("expected file error, got {other:?}"),
    }
}
