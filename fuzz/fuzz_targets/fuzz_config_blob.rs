//! Fuzz target: config blob loading
//!
//! Arbitrary bytes stored under the config key must either load as a
//! config that passes validation or be rejected; the boot path then falls
//! back to defaults without panicking.
//!
//! cargo fuzz run fuzz_config_blob

#![no_main]

use iaqmon::adapters::nvs::NvsAdapter;
use iaqmon::app::ports::StoragePort;
use iaqmon::config::{self, CONFIG_KEY, STORAGE_NAMESPACE};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut nvs) = NvsAdapter::new() else {
        return;
    };
    if nvs.write(STORAGE_NAMESPACE, CONFIG_KEY, data).is_err() {
        return;
    }
    if let Ok(cfg) = config::load_config(&nvs) {
        assert!(cfg.validate().is_ok());
    }
    let _ = config::load_or_default(&nvs);
});
