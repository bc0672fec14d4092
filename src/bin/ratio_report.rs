use rangecode::{
    ArithmeticCoder, CarrylessRangeCoder, RangeCoder, Renormalize, Result, UnderflowMode,
};
use std::process::ExitCode;

fn report<C: Renormalize>(coder: &C, label: &str, message: &[u32]) -> Result<bool> {
    let table = coder.count(message)?;
    let encoded = coder.encode(&table, message)?;
    println!("{label}");
    println!(
        "Source size {} encoded size {} ratio {:.6}%",
        message.len(),
        encoded.len(),
        encoded.len() as f64 * 100.0 / message.len().max(1) as f64
    );
    let decoded = coder.decode(&table, &encoded, message.len())?;
    Ok(decoded == message)
}

fn run(path: &str) -> Result<bool> {
    let message: Vec<u32> = std::fs::read(path)?.into_iter().map(u32::from).collect();

    let mut ok = true;
    let arithmetic = ArithmeticCoder::new(256)?;
    ok &= report(&arithmetic, "arithmetic-32", &message)?;
    ok &= report(
        &arithmetic.with_underflow(UnderflowMode::Clamp),
        "arithmetic-32-clamp",
        &message,
    )?;
    ok &= report(&RangeCoder::new(256)?, "range-32", &message)?;
    for bits in 8..=24 {
        let coder = CarrylessRangeCoder::with_min_range_bits(256, bits)?;
        ok &= report(&coder, &format!("carryless-range-32, MIN_RANGE=2^{bits}"), &message)?;
    }
    Ok(ok)
}

fn main() -> ExitCode {
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: ratio_report <file>");
        return ExitCode::FAILURE;
    };
    match run(&path) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => {
            eprintln!("verification failed");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}
