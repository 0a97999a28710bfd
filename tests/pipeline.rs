use histeq_rust::filters::{
    build_histogram, build_mapping, equalize, equalize_into, is_grayscale, to_grayscale,
    GrayscaleStatus, LookupStrategy,
};
use histeq_rust::{EqualizationPipeline, FilterError, PipelineConfig, PixelBuffer};

/// Deterministic color test card with varied alpha and padded rows.
fn test_card(width: u32, height: u32, padding: u32) -> PixelBuffer {
    let stride = width * 4 + padding;
    let mut bytes = vec![0xFFu8; (stride * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let i = (y * stride + x * 4) as usize;
            bytes[i] = ((x * 255) / width.max(1)) as u8;
            bytes[i + 1] = ((y * 255) / height.max(1)) as u8;
            bytes[i + 2] = ((x * 31 + y * 17) % 256) as u8;
            bytes[i + 3] = ((x + y) * 13 % 256) as u8;
        }
    }
    PixelBuffer::from_raw(width, height, stride, 4, bytes).unwrap()
}

fn red_channel(img: &PixelBuffer) -> Vec<u8> {
    img.to_packed_vec().chunks(4).map(|p| p[0]).collect()
}

#[test]
fn end_to_end_two_level_scenario() {
    let bytes = [10u8, 10, 10, 200]
        .iter()
        .flat_map(|&v| [v, v, v, 255])
        .collect();
    let img = PixelBuffer::from_rgba8(2, 2, bytes).unwrap();

    assert_eq!(is_grayscale(&img).unwrap(), GrayscaleStatus::Grayscale);

    let hist = build_histogram(&img).unwrap();
    assert_eq!(hist.count(10), 3);
    assert_eq!(hist.count(200), 1);
    assert_eq!(hist.total(), 4);

    let mapping = build_mapping(&hist).unwrap();
    assert_eq!(mapping.entries(), &[(10, 0), (200, 255)]);

    let out = equalize(&img, &mapping).unwrap();
    assert_eq!(red_channel(&out), vec![0, 0, 0, 255]);
}

#[test]
fn grayscale_conversion_then_classification() {
    let mut img = test_card(17, 9, 6);
    assert_eq!(is_grayscale(&img).unwrap(), GrayscaleStatus::NotGrayscale);
    to_grayscale(&mut img).unwrap();
    assert_eq!(is_grayscale(&img).unwrap(), GrayscaleStatus::Grayscale);
}

#[test]
fn histogram_conserves_pixel_count_on_padded_rows() {
    let mut img = test_card(13, 7, 12);
    to_grayscale(&mut img).unwrap();
    let hist = build_histogram(&img).unwrap();

    assert_eq!(hist.total(), 13 * 7);
    assert_eq!(hist.bins().iter().sum::<u64>(), hist.total());
}

#[test]
fn dense_and_sparse_lookup_identical_on_real_image() {
    let mut img = test_card(32, 24, 4);
    to_grayscale(&mut img).unwrap();
    let mapping = build_mapping(&build_histogram(&img).unwrap()).unwrap();

    let mut dense = PixelBuffer::new(32, 24).unwrap();
    let mut sparse = PixelBuffer::new(32, 24).unwrap();
    equalize_into(&img, &mapping, &mut dense, LookupStrategy::Dense).unwrap();
    equalize_into(&img, &mapping, &mut sparse, LookupStrategy::Sparse).unwrap();

    assert_eq!(dense, sparse);
}

#[test]
fn mapping_is_monotonic_and_starts_at_zero() {
    let mut img = test_card(40, 30, 0);
    to_grayscale(&mut img).unwrap();
    let mapping = build_mapping(&build_histogram(&img).unwrap()).unwrap();

    assert!(mapping.len() > 1);
    assert_eq!(mapping.entries()[0].1, 0);
    for pair in mapping.entries().windows(2) {
        assert!(pair[0].0 < pair[1].0);
        assert!(pair[0].1 <= pair[1].1);
    }
}

#[test]
fn pipeline_preserves_alpha_and_source() {
    let img = test_card(11, 5, 3);
    let report = EqualizationPipeline::new(PipelineConfig {
        lookup: LookupStrategy::Sparse,
        force_conversion: false,
    })
    .run(img.clone())
    .unwrap();

    assert!(report.converted);
    for y in 0..5 {
        for x in 0..11 {
            let src = img.pixel(x, y).unwrap();
            let gray = report.grayscale.pixel(x, y).unwrap();
            let eq = report.equalized.pixel(x, y).unwrap();
            assert_eq!(eq[3], src[3]);
            assert_eq!(gray[3], src[3]);
            assert_eq!(eq[0], report.mapping.map(gray[0]));
        }
    }
    assert_eq!(report.equalized_histogram.total(), report.histogram.total());
}

#[test]
fn equalization_spreads_a_narrow_range() {
    // intensities 100..=115 only
    let bytes = (0..64u32)
        .flat_map(|i| {
            let v = 100 + (i % 16) as u8;
            [v, v, v, 255]
        })
        .collect();
    let img = PixelBuffer::from_rgba8(8, 8, bytes).unwrap();
    let report = EqualizationPipeline::default().run(img).unwrap();

    assert_eq!(report.equalized_histogram.min_intensity(), Some(0));
    assert_eq!(report.equalized_histogram.max_intensity(), Some(255));
    assert!(report.equalized_stats.stddev > report.stats.stddev);
}

#[test]
fn force_conversion_on_grayscale_input_changes_nothing() {
    let bytes = (0..16u8).flat_map(|v| [v * 3, v * 3, v * 3, 200]).collect();
    let img = PixelBuffer::from_rgba8(4, 4, bytes).unwrap();
    let report = EqualizationPipeline::new(PipelineConfig {
        force_conversion: true,
        ..PipelineConfig::default()
    })
    .run(img.clone())
    .unwrap();

    assert!(report.converted);
    assert_eq!(report.grayscale, img);
}

#[test]
fn errors_stop_the_pipeline() {
    let rgb = PixelBuffer::from_raw(2, 1, 6, 3, vec![1, 2, 3, 4, 5, 6]).unwrap();
    assert_eq!(
        EqualizationPipeline::default().run(rgb).unwrap_err(),
        FilterError::InvalidFormat { channels: 3 }
    );

    let empty = PixelBuffer::new(4, 0).unwrap();
    assert_eq!(
        EqualizationPipeline::default().run(empty).unwrap_err(),
        FilterError::EmptyHistogram
    );
}
