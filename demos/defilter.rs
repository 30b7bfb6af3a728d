//! Checks the optimized kernels against the reference, then times every kernel on each filter
//! and stride.
//!
//! ```text
//! $ cargo run --release --example defilter -- --iterations 200 --kernel SIMD
//! ```

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

use png_defilter::harness::{self, FilterPattern};
use png_defilter::{unfilter_image, BytesPerPixel, Kernel, ScanlineLayout, UnfilterError};

#[derive(Parser)]
#[command(about, version)]
struct Config {
    /// skip checking the optimized kernels against the reference
    #[arg(long)]
    no_check: bool,
    /// skip the timings
    #[arg(long)]
    no_bench: bool,
    /// width of the timed images, in pixels
    #[arg(long, default_value_t = 256)]
    width: usize,
    /// height of the timed images
    #[arg(long, default_value_t = 256)]
    height: usize,
    /// how often every image is unfiltered
    #[arg(short, long, default_value_t = 1000)]
    iterations: u32,
    /// only time these kernels (Ref, Opt or SIMD), all of them by default
    #[arg(short, long, value_parser = parse_kernel)]
    kernel: Vec<Kernel>,
}

fn parse_kernel(name: &str) -> Result<Kernel, String> {
    Kernel::ALL
        .into_iter()
        .find(|kernel| kernel.name().eq_ignore_ascii_case(name))
        .ok_or_else(|| format!("unknown kernel '{}', expected Ref, Opt or SIMD", name))
}

fn secs(d: Duration) -> String {
    format!("{:2}.{:03} s", d.as_secs(), d.subsec_millis())
}

fn bench(c: &Config, kernel: Kernel) -> Result<(), UnfilterError> {
    let mut total = Duration::ZERO;

    // Unfiltered images are not interesting to time.
    for pattern in &FilterPattern::ALL[1..] {
        let mut pattern_total = Duration::ZERO;

        for bpp in BytesPerPixel::ALL {
            let layout = ScanlineLayout::new(c.width, c.height, bpp);
            let mut image = harness::random_image(c.width, c.height, bpp, *pattern, 0);

            let start = Instant::now();
            for _ in 0..c.iterations {
                unfilter_image(kernel, &mut image, &layout)?;
            }
            let elapsed = start.elapsed();
            pattern_total += elapsed;

            println!(
                "[BENCH] IMPL={:<4}  [{}] [{}:{}]",
                kernel.name(),
                secs(elapsed),
                pattern,
                bpp.into_usize()
            );
        }

        total += pattern_total;
        println!(
            "[BENCH] IMPL={:<4}  [{}] [{}:ALL]",
            kernel.name(),
            secs(pattern_total),
            pattern
        );
    }

    println!(
        "[BENCH] IMPL={:<4}  [{}] [Total]\n",
        kernel.name(),
        secs(total)
    );
    Ok(())
}

fn main() -> ExitCode {
    let c = Config::parse();

    if !c.no_check {
        for kernel in [Kernel::Scalar, Kernel::Simd] {
            println!("[CHECK] IMPL={:<4}", kernel.name());
            match harness::check(kernel) {
                Ok(cases) => println!("[CHECK] IMPL={:<4}  {} images match", kernel.name(), cases),
                Err(failure) => {
                    eprintln!("[ERROR] {}", failure);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    if !c.no_bench {
        let kernels = if c.kernel.is_empty() {
            Kernel::ALL.to_vec()
        } else {
            c.kernel.clone()
        };
        for kernel in kernels {
            if let Err(err) = bench(&c, kernel) {
                eprintln!("[ERROR] {}", err);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}
