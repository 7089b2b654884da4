use spectra_core::fft::{SpectrumAnalyzer, max_magnitude};
use spectra_core::pipeline::{run_battery, run_trials};
use spectra_core::signal::{build_occupancy_signal, normalize_sequence};
use spectra_core::{
    BatteryConfig, Canvas, PipelineConfig, Rgba, SequenceKind, SequenceSource, SpectraError,
    SpectrumTest,
};

fn small_pipeline(output_dir: &std::path::Path) -> PipelineConfig {
    PipelineConfig {
        bucket_count: 128,
        image_width: 128,
        image_height: 64,
        number_line_height: 24,
        output_dir: output_dir.to_path_buf(),
        ..PipelineConfig::default()
    }
}

#[test]
fn battery_writes_every_artifact() {
    let dir = tempfile::tempdir().unwrap();
    let battery = BatteryConfig {
        pipeline: small_pipeline(dir.path()),
        tests: vec![
            SpectrumTest::new(SequenceKind::RandomFibonacci, 20, 60),
            SpectrumTest::new(SequenceKind::UniformWhite, 20, 60),
            SpectrumTest::new(SequenceKind::Primes, 1, 80),
            SpectrumTest::new(SequenceKind::CoinToss, 20, 60),
        ],
    };

    let results = run_battery(&battery);
    assert_eq!(results.len(), 4);
    for result in &results {
        let report = result.as_ref().unwrap();
        assert_eq!(report.mean.len(), 128);
        assert_eq!(report.std_dev.len(), 128);
        for path in &report.artifacts {
            assert!(path.exists(), "{}", path.display());
        }
    }

    for name in ["RandomFibonacci", "UniformWhite", "CoinToss"] {
        let image = image::open(dir.path().join(format!("{name}.avg.png"))).unwrap();
        assert_eq!(image.to_rgba8().dimensions(), (128, 88));
    }
    assert!(dir.path().join("Primes.png").exists());
    assert!(!dir.path().join("Primes.avg.png").exists());
}

#[test]
fn failing_test_does_not_stop_battery() {
    let dir = tempfile::tempdir().unwrap();
    let battery = BatteryConfig {
        pipeline: small_pipeline(dir.path()),
        tests: vec![
            SpectrumTest::new(SequenceKind::UniformWhite, 0, 10),
            SpectrumTest::new(SequenceKind::UniformWhite, 2, 10),
        ],
    };
    let results = run_battery(&battery);
    assert!(matches!(results[0], Err(SpectraError::ZeroTrials(_))));
    assert!(results[1].is_ok());
}

#[test]
fn runs_are_reproducible() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_pipeline(dir.path());
    let test = SpectrumTest::new(SequenceKind::RandomFibonacci, 15, 80);
    let a = run_trials(&config, &test, &test.sequence).unwrap();
    let b = run_trials(&config, &test, &test.sequence).unwrap();
    assert_eq!(a.statistics, b.statistics);
}

#[test]
fn averaged_spectrum_is_mirrored_around_zero_frequency() {
    let dir = tempfile::tempdir().unwrap();
    let config = small_pipeline(dir.path());
    let test = SpectrumTest::new(SequenceKind::UniformWhite, 30, 50);
    let outcome = run_trials(&config, &test, &test.sequence).unwrap();
    let mean = outcome.statistics.mean().unwrap();

    let center = mean.len() / 2;
    assert_eq!(mean[center], 0.0);
    for offset in 1..center {
        assert!((mean[center + offset] - mean[center - offset]).abs() < 1e-9);
    }
}

#[test]
fn trial_spectrum_matches_manual_pipeline() {
    let source = SequenceKind::CoinToss;
    let values = source.generate(0, 40);
    let normalized = normalize_sequence(&values).unwrap();
    let signal: Vec<f64> = build_occupancy_signal(&normalized.samples, 64).unwrap();
    let expected = SpectrumAnalyzer::<f64>::new(64).unwrap().magnitude_spectrum(&signal).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        bucket_count: 64,
        ..small_pipeline(dir.path())
    };
    let test = SpectrumTest::new(source, 1, 40);
    let outcome = run_trials(&config, &test, &test.sequence).unwrap();
    assert_eq!(outcome.first_spectrum, expected);
    assert!(max_magnitude(&expected) > 0.0);
}

#[test]
fn side_by_side_canvases() {
    let red = Rgba::opaque(255, 0, 0);
    let blue = Rgba::opaque(0, 0, 255);
    let mut canvas = Canvas::filled(2, 3, red);
    canvas.append_horizontal(&Canvas::filled(2, 3, blue), false).unwrap();

    let bytes = canvas.to_rgba_bytes();
    assert_eq!(bytes.len(), 4 * 3 * 4);
    for row in bytes.chunks_exact(4 * 4) {
        assert_eq!(row, [255, 0, 0, 255, 255, 0, 0, 255, 0, 0, 255, 255, 0, 0, 255, 255]);
    }
}
