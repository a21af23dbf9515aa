#![no_main]
use acprio_core::{Controller, ControllerCfg, Sample};
use libfuzzer_sys::arbitrary::{self, Arbitrary};
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Tick {
    soc: u16,
    pv_w: u16,
    setting_w: u16,
}

#[derive(Debug, Arbitrary)]
struct Input {
    minimum_soc: u8,
    cap_w: u16,
    ticks: Vec<Tick>,
}

fn sample(min: f64, t: &Tick) -> Sample {
    Sample {
        setting_w: f64::from(t.setting_w),
        minimum_soc: min,
        pv_power_w: f64::from(t.pv_w),
        soc: f64::from(t.soc % 1001) / 10.0,
    }
}

fuzz_target!(|input: Input| {
    let Some(first) = input.ticks.first() else { return };
    let min = f64::from(input.minimum_soc % 101);
    let cap = f64::from(input.cap_w.max(1));
    let cfg = ControllerCfg { max_discharge_power_w: cap, ..ControllerCfg::default() };
    let Ok(mut c) = Controller::new(&sample(min, first), cfg) else { return };

    for t in &input.ticks[1..] {
        let d = c.decide(&sample(min, t)).expect("finite inputs never fail");
        assert!((0.0..=cap).contains(&d.state.setpoint_w));
        if d.state.ac_load_priority {
            assert!(sample(min, t).soc < min + 10.0);
        }
    }
});
