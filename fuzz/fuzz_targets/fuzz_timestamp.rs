#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|input: (&str, &str)| {
    let (date, time) = input;
    if let Ok(ts) = chlorine_core::parse_timestamp(date, time) {
        let r = chlorine_core::Reading::new(7.0, 10.0, 350, 20.0, 7.5, ts);
        let v = chlorine_core::FeatureVector::build(&r);
        assert!(v.as_slice().iter().all(|x| x.is_finite()));
    }
});
