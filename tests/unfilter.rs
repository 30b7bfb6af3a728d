use png_defilter::harness::{compare, random_image, FilterPattern};
use png_defilter::{
    reverse_filters, unfilter_image, BytesPerPixel, FilterType, Kernel, ScanlineLayout,
    UnfilterError,
};
use rand::{Rng, SeedableRng};

/// Runs every kernel on a copy of `buffer` and returns the common result.
fn unfilter_all(buffer: &[u8], height: usize, bpp: usize, bytes_per_line: usize) -> Vec<u8> {
    let mut results = Kernel::ALL.iter().map(|kernel| {
        let mut copy = buffer.to_vec();
        kernel
            .reverse_filters(&mut copy, height, bpp, bytes_per_line)
            .unwrap();
        (kernel, copy)
    });

    let (_, expected) = results.next().unwrap();
    for (kernel, actual) in results {
        assert_eq!(expected, actual, "{} kernel", kernel.name());
    }
    expected
}

#[test]
fn none_then_sub() {
    let buffer = [0, 10, 20, 30, 40, 1, 5, 5, 5, 5];
    assert_eq!(
        unfilter_all(&buffer, 2, 1, 5),
        [0, 10, 20, 30, 40, 1, 15, 25, 35, 45]
    );
}

#[test]
fn up_on_first_row() {
    let buffer = [2, 1, 2, 3, 2, 1, 1, 1];
    assert_eq!(unfilter_all(&buffer, 2, 1, 4), [2, 1, 2, 3, 2, 2, 3, 4]);
}

#[test]
fn first_row_reads_zeros_above() {
    // Whatever precedes the buffer in memory must not leak into the first row.
    for tag in [FilterType::Up, FilterType::Avg, FilterType::Paeth] {
        for bpp in BytesPerPixel::ALL {
            let layout = ScanlineLayout::new(40, 1, bpp);
            let mut storage = vec![0xFF; layout.bytes_per_line() * 2];
            let (junk, row) = storage.split_at_mut(layout.bytes_per_line());
            junk[0] = FilterType::NoFilter as u8;
            row[0] = tag as u8;
            row[1..]
                .iter_mut()
                .enumerate()
                .for_each(|(i, b)| *b = i as u8);

            let mut alone = row.to_vec();
            reverse_filters(row, 1, bpp.into_usize(), layout.bytes_per_line()).unwrap();
            reverse_filters(&mut alone, 1, bpp.into_usize(), layout.bytes_per_line()).unwrap();
            assert_eq!(row, &alone[..]);

            // With an all zero row above, the same row as second row gives the same pixels.
            let mut second = vec![0; layout.bytes_per_line()];
            second.extend_from_slice(&storage[layout.bytes_per_line()..]);
            second[layout.bytes_per_line() + 1..]
                .iter_mut()
                .enumerate()
                .for_each(|(i, b)| *b = i as u8);
            reverse_filters(&mut second, 2, bpp.into_usize(), layout.bytes_per_line()).unwrap();
            assert_eq!(second[layout.bytes_per_line()..], alone[..], "{:?}", tag);
        }
    }
}

#[test]
fn first_column_reads_zeros_left() {
    // Row above is all 100, every filtered byte is 1.
    for bpp in BytesPerPixel::ALL {
        let bpp = bpp.into_usize();
        let bpl = 3 * bpp + 1;
        for (tag, first_pixel) in [(1u8, 1u8), (3, 51), (4, 101)] {
            let mut buffer = vec![100; bpl * 2];
            buffer[0] = 0;
            buffer[bpl] = tag;
            buffer[bpl + 1..].fill(1);
            let result = unfilter_all(&buffer, 2, bpp, bpl);
            assert!(
                result[bpl + 1..bpl + 1 + bpp]
                    .iter()
                    .all(|&b| b == first_pixel),
                "filter {} bpp {}: {:?}",
                tag,
                bpp,
                &result[bpl..]
            );
        }
    }
}

#[test]
fn avg_truncates() {
    // Second byte of the second row: 0 + (1 + 2) >> 1 == 1, a rounding average would give 2.
    let buffer = [0, 0, 2, 3, 1, 0];
    assert_eq!(unfilter_all(&buffer, 2, 1, 3)[4..], [1, 1]);
}

#[test]
fn tags_are_left_alone() {
    let layout = ScanlineLayout::new(17, 10, BytesPerPixel::Four);
    let image = random_image(17, 10, BytesPerPixel::Four, FilterPattern::Mixed, 3);
    let unfiltered = unfilter_all(&image, 10, 4, layout.bytes_per_line());
    for y in 0..10 {
        let tag = layout.row_range(y).start;
        assert_eq!(image[tag], unfiltered[tag]);
    }
}

#[test]
fn wide_random_images() {
    let mut rng = rand::rngs::StdRng::seed_from_u64(0x504e47);
    for bpp in BytesPerPixel::ALL {
        for _ in 0..8 {
            let width = rng.gen_range(64..700);
            let height = rng.gen_range(1..6);
            let layout = ScanlineLayout::new(width, height, bpp);

            let mut image: Vec<u8> = (0..layout.buffer_len()).map(|_| rng.gen()).collect();
            for y in 0..height {
                image[layout.row_range(y).start] = rng.gen_range(0..5);
            }

            let mut expected = image.clone();
            unfilter_image(Kernel::Reference, &mut expected, &layout).unwrap();
            for kernel in [Kernel::Scalar, Kernel::Simd] {
                let mut actual = image.clone();
                unfilter_image(kernel, &mut actual, &layout).unwrap();
                if let Err(mismatch) = compare(&expected, &actual, &layout) {
                    let name = kernel.name();
                    panic!(
                        "{} kernel, {}x{} {:?}: {}",
                        name, width, height, bpp, mismatch
                    );
                }
            }
        }
    }
}

#[test]
fn rows_at_every_alignment() {
    let layout = ScanlineLayout::new(50, 4, BytesPerPixel::Three);
    let image = random_image(50, 4, BytesPerPixel::Three, FilterPattern::Mixed, 11);
    let mut expected = image.clone();
    unfilter_image(Kernel::Reference, &mut expected, &layout).unwrap();

    for offset in 0..16 {
        let mut storage = vec![0; offset + image.len()];
        storage[offset..].copy_from_slice(&image);
        unfilter_image(Kernel::Simd, &mut storage[offset..], &layout).unwrap();
        assert_eq!(storage[offset..], expected[..], "offset {}", offset);
    }
}

#[test]
fn zero_width() {
    let mut buffer = [0, 1, 2, 3, 4];
    reverse_filters(&mut buffer, 5, 3, 1).unwrap();
    assert_eq!(buffer, [0, 1, 2, 3, 4]);
}

#[test]
fn invalid_parameters() {
    let original = [1, 10, 20, 30, 40, 2, 5, 5, 5, 5];
    let cases = [
        (2, 5, 5, UnfilterError::UnsupportedBpp(5)),
        (0, 1, 5, UnfilterError::ZeroHeight),
        (
            2,
            3,
            5,
            UnfilterError::InvalidLineLength {
                bpp: 3,
                bytes_per_line: 5,
            },
        ),
        (
            3,
            1,
            5,
            UnfilterError::BufferTooSmall {
                expected: 15,
                actual: 10,
            },
        ),
        (2, 1, 3, UnfilterError::UnknownFilter { row: 1, tag: 30 }),
    ];

    for (height, bpp, bytes_per_line, error) in cases {
        for kernel in Kernel::ALL {
            let mut buffer = original;
            assert_eq!(
                kernel.reverse_filters(&mut buffer, height, bpp, bytes_per_line),
                Err(error.clone())
            );
            assert_eq!(
                buffer,
                original,
                "{} kernel touched the buffer",
                kernel.name()
            );
        }
    }
}

#[test]
fn error_messages() {
    assert_eq!(
        UnfilterError::UnknownFilter { row: 3, tag: 9 }.to_string(),
        "Unknown filter type 9 at scanline 3"
    );
    assert_eq!(
        UnfilterError::BufferTooSmall {
            expected: 15,
            actual: 10
        }
        .to_string(),
        "Expected at least 15 bytes, found 10 bytes"
    );
}
