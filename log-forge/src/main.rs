mod args;
mod generator;
mod stream;

use args::CliArgs;
use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};
use stream::{Shape, write_log_file};

fn main() -> std::io::Result<()> {
    let args = CliArgs::parse();
    let mut rng = match args.seed() {
        Some(seed) => StdRng::seed_from_u64(*seed),
        None => StdRng::from_os_rng(),
    };
    let shape = Shape {
        lines: *args.lines(),
        bot_share: *args.bot_share(),
        malformed_share: *args.malformed_share(),
        start_date: *args.start_date(),
        days: *args.days(),
    };

    let malformed = write_log_file(args.output(), shape, &mut rng)?;
    println!(
        "Wrote {} lines ({} malformed) to {}",
        shape.lines,
        malformed,
        args.output().display()
    );
    Ok(())
}
