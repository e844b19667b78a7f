#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use regrid_layout::list::{move_between, swap};

#[derive(Debug, Arbitrary)]
struct Input {
    source: Vec<u8>,
    destination: Vec<u8>,
    from: u8,
    to: u8,
}

fuzz_target!(|input: Input| {
    let (from, to) = (usize::from(input.from), usize::from(input.to));

    if let Ok(out) = swap(&input.source, from, to) {
        assert_eq!(out.len(), input.source.len());
        assert_eq!(out[to], input.source[from]);
        let mut sorted_in = input.source.clone();
        let mut sorted_out = out.into_owned();
        sorted_in.sort_unstable();
        sorted_out.sort_unstable();
        assert_eq!(sorted_in, sorted_out, "swap lost or duplicated elements");
    } else {
        assert!(from >= input.source.len() || to >= input.source.len());
    }

    if let Ok((s, d)) = move_between(&input.source, &input.destination, from, to) {
        assert_eq!(s.len() + 1, input.source.len());
        assert_eq!(d.len(), input.destination.len() + 1);
        assert_eq!(d[to], input.source[from]);
    } else {
        assert!(from >= input.source.len() || to > input.destination.len());
    }
});
