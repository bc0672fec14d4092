#![no_main]
use libfuzzer_sys::fuzz_target;
use rangecode::{
    ArithmeticCoder, CarrylessRangeCoder, RangeCoder, Renormalize, UnderflowMode,
};

fn check<C: Renormalize>(coder: &C, message: &[u32]) {
    let table = coder.count(message).unwrap();
    let encoded = coder.encode(&table, message).unwrap();
    let decoded = coder.decode(&table, &encoded, message.len()).unwrap();
    assert_eq!(decoded, message);
}

fuzz_target!(|data: (Vec<u8>, u8)| {
    let (bytes, knob) = data;
    let message: Vec<u32> = bytes.iter().map(|&b| u32::from(b)).collect();

    let precision = 10 + u32::from(knob) % 23;
    let underflow = if knob & 0x80 != 0 {
        UnderflowMode::Clamp
    } else {
        UnderflowMode::FollowBits
    };
    check(
        &ArithmeticCoder::with_precision(256, precision)
            .unwrap()
            .with_underflow(underflow),
        &message,
    );

    let bits = 8 + u32::from(knob) % 17;
    check(&CarrylessRangeCoder::with_min_range_bits(256, bits).unwrap(), &message);
    check(&RangeCoder::new(256).unwrap(), &message);
});
