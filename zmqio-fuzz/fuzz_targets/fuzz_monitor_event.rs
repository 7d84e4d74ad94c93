#![no_main]

use libfuzzer_sys::fuzz_target;
use zmqio_core::monitor::{Event, EventDetail, HEADER_LEN};

fuzz_target!(|data: &[u8]| {
    // First byte picks where the header ends; the rest is the address part.
    let Some((&split, rest)) = data.split_first() else {
        return;
    };
    let split = usize::from(split).min(rest.len());
    let (header, address) = rest.split_at(split);

    match Event::decode(header, address) {
        Ok(event) => {
            assert_eq!(header.len(), HEADER_LEN);
            let _ = event.to_string();
            let error = event.error();
            match event.detail {
                EventDetail::None | EventDetail::RetryInterval(_) => assert!(error.is_none()),
                _ => assert!(error.is_some()),
            }
        }
        Err(_) => assert_ne!(header.len(), HEADER_LEN),
    }
});
