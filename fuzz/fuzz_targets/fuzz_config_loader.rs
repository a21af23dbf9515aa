#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<acprio_config::Config>(data) {
        if cfg.validate().is_ok() {
            // Anything that validates must also be accepted by the controller.
            let c: acprio_core::ControllerCfg = (&cfg.controller).into();
            assert!(c.validate().is_ok());
        }
    }
});
