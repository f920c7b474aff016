//! # Run Report Tests
//!
//! Verifies verdict classification, the speed and FMR arithmetic, the KHz/MHz display
//! switch, and the exact text of the end-of-run report.

use fasedsim_driver::stats::SimSpeed;
use fasedsim_driver::{RunReport, Verdict};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case(0, true, false, Verdict::Passed)]
#[case(0, true, true, Verdict::Passed)]
#[case(0, false, true, Verdict::TimedOut)]
#[case(7, false, true, Verdict::Failed { code: 7 })]
#[case(7, true, false, Verdict::Failed { code: 7 })]
#[case(-1, true, true, Verdict::Failed { code: -1 })]
fn verdict_classification(
    #[case] exit_code: i32,
    #[case] complete: bool,
    #[case] timed_out: bool,
    #[case] expected: Verdict,
) {
    assert_eq!(Verdict::determine(exit_code, complete, timed_out), expected);
}

#[test]
fn only_failures_are_fatal() {
    assert!(Verdict::Failed { code: 1 }.is_fatal());
    assert!(!Verdict::TimedOut.is_fatal());
    assert!(!Verdict::Passed.is_fatal());
    assert!(Verdict::Passed.passed());
    assert!(!Verdict::TimedOut.passed());
}

#[test]
fn passed_report_text() {
    let report = RunReport::new(Verdict::Passed, 0, 2000, 4000, 1.0);
    let mut out = Vec::new();
    report.write_to(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "*** PASSED *** after 2000 cycles\n\
         time elapsed: 1.0 s, simulation speed = 2.00 KHz\n\
         FPGA-Cycles-to-Model-Cycles Ratio (FMR): 2.00\n"
    );
}

#[test]
fn failed_report_text_in_mhz() {
    let report = RunReport::new(Verdict::Failed { code: 3 }, 3, 5_000_000, 7_500_000, 2.0);
    let mut out = Vec::new();
    report.write_to(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "*** FAILED *** (code = 3) after 5000000 cycles\n\
         time elapsed: 2.0 s, simulation speed = 2.50 MHz\n\
         FPGA-Cycles-to-Model-Cycles Ratio (FMR): 1.50\n"
    );
}

#[test]
fn timeout_banner() {
    let report = RunReport::new(Verdict::TimedOut, 0, 1000, 1000, 0.5);
    assert_eq!(report.banner(), "*** FAILED *** (timeout) after 1000 cycles");
}

#[rstest]
#[case(999.99, SimSpeed::KHz(999.99))]
#[case(1000.0, SimSpeed::KHz(1000.0))]
#[case(1500.0, SimSpeed::MHz(1.5))]
fn speed_unit_switches_above_1000_khz(#[case] khz: f64, #[case] expected: SimSpeed) {
    assert_eq!(SimSpeed::from_khz(khz), expected);
}

#[test]
fn speed_display() {
    assert_eq!(SimSpeed::KHz(12.5).to_string(), "12.50 KHz");
    assert_eq!(SimSpeed::MHz(3.0).to_string(), "3.00 MHz");
}

#[test]
fn zero_cycles_does_not_panic() {
    let report = RunReport::new(Verdict::TimedOut, 0, 0, 0, 0.0);
    assert!(report.fmr.is_nan());
    let mut out = Vec::new();
    report.write_to(&mut out).unwrap();
}

proptest! {
    /// FMR and speed follow their definitions for every run with a nonzero end cycle.
    #[test]
    fn ratios_follow_definitions(
        end_cycle in 1u64..1_000_000_000,
        host_cycles in 0u64..10_000_000_000,
        sim_time in 0.001f64..10_000.0,
    ) {
        let report = RunReport::new(Verdict::Passed, 0, end_cycle, host_cycles, sim_time);
        let fmr = host_cycles as f64 / end_cycle as f64;
        let khz = end_cycle as f64 / (sim_time * 1000.0);
        prop_assert!((report.fmr - fmr).abs() <= f64::EPSILON * fmr.max(1.0));
        prop_assert!((report.sim_speed - khz).abs() <= f64::EPSILON * khz.max(1.0));
        match report.speed() {
            SimSpeed::KHz(v) => prop_assert!(khz <= 1000.0 && v == khz),
            SimSpeed::MHz(v) => prop_assert!(khz > 1000.0 && (v - khz / 1000.0).abs() < 1e-9 * khz),
        }
    }
}
