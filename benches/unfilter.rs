//! Usage example:
//!
//! ```
//! $ cargo bench --bench=unfilter -- --save-baseline my_baseline
//! ... tweak something, say the Sub filter ...
//! $ cargo bench --bench=unfilter -- filter=Sub --baseline my_baseline
//! ```

use criterion::{criterion_group, criterion_main, Criterion, Throughput};
use png_defilter::harness::{random_image, FilterPattern};
use png_defilter::{unfilter_image, BytesPerPixel, Kernel, ScanlineLayout};

fn unfilter_all(c: &mut Criterion) {
    for &pattern in FilterPattern::ALL[1..].iter() {
        for bpp in BytesPerPixel::ALL {
            bench_unfilter(c, pattern, bpp);
        }
    }
}

criterion_group!(benches, unfilter_all);
criterion_main!(benches);

fn bench_unfilter(c: &mut Criterion, pattern: FilterPattern, bpp: BytesPerPixel) {
    let mut group = c.benchmark_group("unfilter");

    let layout = ScanlineLayout::new(256, 256, bpp);
    let image = random_image(256, 256, bpp, pattern, 0);

    group.throughput(Throughput::Bytes(layout.buffer_len() as u64));
    for kernel in Kernel::ALL {
        group.bench_with_input(
            format!(
                "filter={pattern}/bpp={}/kernel={}",
                bpp.into_usize(),
                kernel.name()
            ),
            &image,
            |b, image| {
                let mut buffer = image.clone();
                b.iter(|| unfilter_image(kernel, &mut buffer, &layout).unwrap());
            },
        );
    }
}
