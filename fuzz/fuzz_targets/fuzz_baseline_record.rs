//! Fuzz target: `BaselineStore::decode`
//!
//! Whatever bytes sit under the baseline key, decoding must never panic,
//! and anything it accepts must re-encode to a record that decodes to the
//! same pair.
//!
//! cargo fuzz run fuzz_baseline_record

#![no_main]

use iaqmon::adapters::nvs::NvsAdapter;
use iaqmon::baseline::BaselineStore;
use libfuzzer_sys::fuzz_target;

type Store = BaselineStore<NvsAdapter>;

fuzz_target!(|data: &[u8]| {
    if let Ok(baseline) = Store::decode(data) {
        let bytes = Store::encode(baseline).expect("encode accepted baseline");
        assert_eq!(Store::decode(&bytes), Ok(baseline));
    }
});
