use proptest::prelude::*;
use rangecode::{
    ArithmeticCoder, CarrylessRangeCoder, Codec, CoderConfig, Error, FrequencyTable, PolicyKind,
    RangeCoder, Renormalize, UnderflowMode,
};

fn all_policies() -> Vec<PolicyKind> {
    vec![
        PolicyKind::arithmetic(),
        PolicyKind::Arithmetic {
            precision: 32,
            underflow: UnderflowMode::Clamp,
        },
        PolicyKind::carryless(),
        PolicyKind::Range,
    ]
}

fn text_message() -> Vec<u32> {
    let text = "It was the best of times, it was the worst of times, it was the age of \
                wisdom, it was the age of foolishness, it was the epoch of belief, it was \
                the epoch of incredulity, it was the season of Light, it was the season of \
                Darkness, it was the spring of hope, it was the winter of despair.";
    text.bytes().map(u32::from).collect()
}

#[test]
fn test_text_compresses_under_every_policy() {
    let message = text_message();
    let mut sizes = Vec::new();
    for policy in all_policies() {
        let codec = Codec::new(&CoderConfig::new(256, policy)).unwrap();
        let table = codec.count(&message).unwrap();
        let encoded = codec.encode(&table, &message).unwrap();
        assert!(
            encoded.len() < message.len(),
            "{} produced {} bytes for {}",
            codec.name(),
            encoded.len(),
            message.len()
        );
        assert_eq!(codec.decode(&table, &encoded, message.len()).unwrap(), message);
        sizes.push(encoded.len());
    }
    assert_eq!(sizes.len(), 4);
}

#[test]
fn test_carry_stress_message() {
    let message = [1u32, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 2, 3];
    for policy in all_policies() {
        let codec = Codec::new(&CoderConfig::new(4, policy)).unwrap();
        let table = codec.count(&message).unwrap();
        let encoded = codec.encode(&table, &message).unwrap();
        assert_eq!(codec.decode(&table, &encoded, message.len()).unwrap(), message);
    }
}

#[test]
fn test_empty_message_every_policy() {
    for policy in all_policies() {
        let codec = Codec::new(&CoderConfig::new(16, policy)).unwrap();
        let table = codec.count(&[]).unwrap();
        assert!(table.frequencies().iter().all(|&f| f == 1));
        let encoded = codec.encode(&table, &[]).unwrap();
        assert!(encoded.is_empty());
        assert!(codec.decode(&table, &encoded, 0).unwrap().is_empty());
    }
}

#[test]
fn test_single_symbol_alphabet_every_policy() {
    for policy in all_policies() {
        let codec = Codec::new(&CoderConfig::new(1, policy)).unwrap();
        for len in [1usize, 2, 17, 5000] {
            let message = vec![0u32; len];
            let table = codec.count(&message).unwrap();
            let encoded = codec.encode(&table, &message).unwrap();
            assert!(encoded.len() <= 4);
            assert_eq!(codec.decode(&table, &encoded, len).unwrap(), message);
        }
    }
}

#[test]
fn test_boundary_alphabet_sizes() {
    let message: Vec<u32> = (0..4096u32).map(|i| (i * 31 + i / 5) % 4096).collect();

    let arithmetic = ArithmeticCoder::with_precision(4096, 14).unwrap();
    let carryless = CarrylessRangeCoder::with_min_range_bits(4096, 12).unwrap();
    for decoded in [
        {
            let table = arithmetic.count(&message).unwrap();
            assert!(table.total() <= arithmetic.threshold());
            let encoded = arithmetic.encode(&table, &message).unwrap();
            arithmetic.decode(&table, &encoded, message.len()).unwrap()
        },
        {
            let table = carryless.count(&message).unwrap();
            assert!(table.total() <= carryless.threshold());
            let encoded = carryless.encode(&table, &message).unwrap();
            carryless.decode(&table, &encoded, message.len()).unwrap()
        },
    ] {
        assert_eq!(decoded, message);
    }

    assert!(matches!(
        ArithmeticCoder::with_precision(4097, 14),
        Err(Error::AlphabetTooLarge { .. })
    ));
}

#[test]
fn test_truncated_stream_decodes_without_error() {
    let message = text_message();
    let coder = RangeCoder::new(256).unwrap();
    let table = coder.count(&message).unwrap();
    let encoded = coder.encode(&table, &message).unwrap();
    let truncated = &encoded[..encoded.len() / 2];
    let decoded = coder.decode(&table, truncated, message.len()).unwrap();
    assert_eq!(decoded.len(), message.len());
    assert_ne!(decoded, message);
}

#[test]
fn test_decoding_with_shared_table() {
    // A table received out of band drives the decoder just like a recount.
    let message = text_message();
    let coder = CarrylessRangeCoder::new(256).unwrap();
    let table = coder.count(&message).unwrap();
    let encoded = coder.encode(&table, &message).unwrap();
    let received =
        FrequencyTable::from_frequencies(table.frequencies().to_vec(), coder.threshold()).unwrap();
    assert_eq!(coder.decode(&received, &encoded, message.len()).unwrap(), message);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn prop_roundtrip_every_policy(
        alphabet in 1usize..=256,
        raw in prop::collection::vec(any::<u8>(), 0..1500),
        skew in 0u32..4,
    ) {
        // Squash values toward zero by `skew` to vary the distribution.
        let message: Vec<u32> = raw
            .iter()
            .map(|&b| (u32::from(b) >> skew) % alphabet as u32)
            .collect();
        for policy in all_policies() {
            let codec = Codec::new(&CoderConfig::new(alphabet, policy)).unwrap();
            let table = codec.count(&message).unwrap();
            prop_assert!(table.total() <= codec.threshold());
            let encoded = codec.encode(&table, &message).unwrap();
            prop_assert_eq!(codec.decode(&table, &encoded, message.len()).unwrap(), message.as_slice());
        }
    }

    #[test]
    fn prop_arithmetic_precision_sweep(
        precision in 10u32..=32,
        raw in prop::collection::vec(0u32..256, 1..800),
    ) {
        let coder = ArithmeticCoder::with_precision(256, precision).unwrap();
        let table = coder.count(&raw).unwrap();
        let encoded = coder.encode(&table, &raw).unwrap();
        prop_assert_eq!(coder.decode(&table, &encoded, raw.len()).unwrap(), raw);
    }
}
