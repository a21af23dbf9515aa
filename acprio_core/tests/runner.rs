use std::sync::atomic::AtomicBool;
use std::time::Duration;

use acprio_bus::{ReplayBus, SimulatedBus};
use acprio_config::{SimulationCfg, TraceRow};
use acprio_core::mocks::MemoryBus;
use acprio_core::runner::run;
use acprio_core::{ControllerCfg, ControllerError, DischargeController, RunParams, StopReason};
use acprio_traits::clock::{Clock, ManualClock};
use acprio_traits::{BusItem, DataBus};

fn params(max_ticks: Option<u64>) -> RunParams {
    RunParams {
        tick: Duration::from_millis(1000),
        max_ticks,
    }
}

#[test]
fn stops_after_max_ticks_on_schedule() {
    let bus = MemoryBus::new(3000.0, 10.0, 400.0, 12.0);
    let mut ctl = DischargeController::start(bus, ControllerCfg::default()).unwrap();
    let clock = ManualClock::new();
    let stop = AtomicBool::new(false);

    let summary = run(&mut ctl, &params(Some(5)), &clock, &stop).unwrap();
    assert_eq!(summary.stop, StopReason::MaxTicks);
    assert_eq!(summary.ticks, 5);
    assert_eq!(summary.writes, 1);
    assert_eq!(summary.overruns, 0);
    assert_eq!(summary.final_setpoint_w, 320.0);
    assert!(summary.ac_load_priority);
    // One period elapsed per tick.
    assert_eq!(clock.elapsed(), Duration::from_secs(5));
}

#[test]
fn raised_shutdown_flag_prevents_any_write() {
    let bus = MemoryBus::new(3000.0, 10.0, 400.0, 12.0);
    let mut ctl = DischargeController::start(bus, ControllerCfg::default()).unwrap();
    let stop = AtomicBool::new(true);

    let summary = run(&mut ctl, &params(None), &ManualClock::new(), &stop).unwrap();
    assert_eq!(summary.stop, StopReason::Shutdown);
    assert_eq!(summary.ticks, 0);
    assert!(ctl.bus().writes.is_empty());
    assert_eq!(ctl.bus().setting_w, 3000.0);
}

#[test]
fn replay_runs_until_trace_ends() {
    let rows: Vec<TraceRow> = [(400.0, 12.0), (400.0, 12.0), (400.0, 12.0), (0.0, 9.0)]
        .into_iter()
        .map(|(pv_power_w, soc)| TraceRow { pv_power_w, soc })
        .collect();
    let bus = ReplayBus::new(rows, 10.0, 3000.0);
    let mut ctl = DischargeController::start(bus, ControllerCfg::default()).unwrap();

    let summary = run(&mut ctl, &params(None), &ManualClock::new(), &AtomicBool::new(false)).unwrap();
    assert_eq!(summary.stop, StopReason::EndOfData);
    // First row is consumed by start().
    assert_eq!(summary.ticks, 3);
    assert_eq!(ctl.bus().written(), &[320.0, 0.0]);
    assert_eq!(summary.final_setpoint_w, 0.0);
    assert!(summary.ac_load_priority);
}

#[test]
fn bus_failure_is_fatal_and_typed() {
    let sim = SimulationCfg {
        initial_soc: 50.0,
        ..SimulationCfg::default()
    };
    let bus = SimulatedBus::new(&sim, Duration::from_secs(1)).fail_after_ticks(2);
    let mut ctl = DischargeController::start(bus, ControllerCfg::default()).unwrap();

    let err = run(&mut ctl, &params(Some(100)), &ManualClock::new(), &AtomicBool::new(false))
        .unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ControllerError>(),
        Some(ControllerError::SampleRead { .. })
    ));
    assert_eq!(ctl.ticks(), 2);
}

/// Bus whose reads take longer than one tick period on a manual clock.
struct SlowBus {
    inner: MemoryBus,
    clock: ManualClock,
    delay: Duration,
}

impl DataBus for SlowBus {
    fn refresh(&mut self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.clock.advance(self.delay);
        Ok(())
    }

    fn read(&mut self, item: BusItem) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        self.inner.read(item)
    }

    fn write(
        &mut self,
        item: BusItem,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner.write(item, value)
    }
}

#[test]
fn slow_ticks_are_counted_as_overruns() {
    let clock = ManualClock::new();
    let bus = SlowBus {
        inner: MemoryBus::new(0.0, 10.0, 0.0, 50.0),
        clock: clock.clone(),
        delay: Duration::from_millis(2500),
    };
    let mut ctl = DischargeController::start(bus, ControllerCfg::default()).unwrap();
    let start = clock.now();

    let summary = run(&mut ctl, &params(Some(3)), &clock, &AtomicBool::new(false)).unwrap();
    assert_eq!(summary.ticks, 3);
    assert_eq!(summary.overruns, 3);
    // Ticks never overlap: every tick's work is accounted for in the elapsed time.
    assert!(clock.ms_since(start) >= 3 * 2500);
}

/// Bus whose SOC reads fail with an untyped transport error once `healthy_reads` are used up.
struct SocReadFails {
    inner: MemoryBus,
    healthy_reads: u32,
}

impl DataBus for SocReadFails {
    fn read(&mut self, item: BusItem) -> Result<f64, Box<dyn std::error::Error + Send + Sync>> {
        if item == BusItem::BatterySoc {
            if self.healthy_reads == 0 {
                return Err(
                    "org.freedesktop.DBus.Error.LimitsExceeded: connection resources exhausted"
                        .into(),
                );
            }
            self.healthy_reads -= 1;
        }
        self.inner.read(item)
    }

    fn write(
        &mut self,
        item: BusItem,
        value: f64,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.inner.write(item, value)
    }
}

#[test]
fn untyped_exhausted_error_is_fatal_not_end_of_data() {
    let bus = SocReadFails {
        inner: MemoryBus::new(0.0, 10.0, 0.0, 50.0),
        healthy_reads: 2,
    };
    let mut ctl = DischargeController::start(bus, ControllerCfg::default()).unwrap();

    let err = run(&mut ctl, &params(Some(10)), &ManualClock::new(), &AtomicBool::new(false))
        .unwrap_err();
    match err.downcast_ref::<ControllerError>() {
        Some(ControllerError::SampleRead { what, reason }) => {
            assert!(what.ends_with("/Dc/Battery/Soc"));
            assert!(reason.contains("resources exhausted"));
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert_eq!(ctl.ticks(), 1);
}

#[test]
fn summary_counts_come_from_the_controller() {
    let bus = MemoryBus::new(3000.0, 10.0, 400.0, 12.0);
    let mut ctl = DischargeController::start(bus, ControllerCfg::default()).unwrap();
    let clock = ManualClock::new();
    let stop = AtomicBool::new(false);

    let first = run(&mut ctl, &params(Some(2)), &clock, &stop).unwrap();
    assert_eq!((first.ticks, first.writes), (2, 1));

    // A second bounded run continues the controller's totals.
    ctl.bus_mut().setting_w = 1000.0;
    let second = run(&mut ctl, &params(Some(3)), &clock, &stop).unwrap();
    assert_eq!(second.stop, StopReason::MaxTicks);
    assert_eq!((second.ticks, second.writes), (5, 2));
    assert_eq!((second.ticks, second.writes), (ctl.ticks(), ctl.writes()));
    assert_eq!(ctl.bus().writes, vec![320.0, 320.0]);
}
