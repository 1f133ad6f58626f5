#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    // Parse and validation errors are fine; panics are not.
    if let Ok(cfg) = toml::from_str::<chlorine_config::Config>(data)
        && cfg.validate().is_ok()
    {
        // A config that validates must yield a sweep the optimizer accepts.
        let sweep = chlorine_core::SweepCfg::from(&cfg.sweep);
        assert!(sweep.candidate_count().is_ok());
    }
});
