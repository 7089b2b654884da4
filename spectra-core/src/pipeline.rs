//! # Pipeline Module
//!
//! Runs a named test end to end: generate each trial's sequence, build its
//! occupancy signal, transform it, fold the spectrum into the running
//! statistics, and finally render and save the results.
//!
//! Trials can be spread over worker threads. Workers only compute spectra;
//! the accumulator is updated on the calling thread in trial order, so the
//! output is identical to a sequential run.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;
use std::thread;

use rustfft::FftNum;
use rustfft::num_traits::Float;
use tracing::{debug, error, info};

use crate::TestReport;
use crate::canvas::Canvas;
use crate::config::{BatteryConfig, PipelineConfig, Precision, SpectrumTest};
use crate::error::{Result, SpectraError};
use crate::fft::SpectrumAnalyzer;
use crate::graph::{render_samples_1d, render_spectrum};
use crate::sequences::SequenceSource;
use crate::signal::{build_occupancy_signal, normalize_sequence};
use crate::stats::RunningSpectrum;

/// Everything a finished test produced before rendering.
#[derive(Debug, Clone)]
pub struct TrialOutcome {
    pub name: String,
    pub sequence_length: usize,
    /// Spectrum of trial 0 alone.
    pub first_spectrum: Vec<f64>,
    /// Normalized samples of trial 0.
    pub first_samples: Vec<f64>,
    /// Normalized samples of the final trial.
    pub last_samples: Vec<f64>,
    /// Trials whose sequence was constant.
    pub degenerate_trials: usize,
    pub statistics: RunningSpectrum,
}

/// The per-trial unit of work handed to workers.
#[derive(Debug)]
struct TrialSpectrum {
    spectrum: Vec<f64>,
    samples: Vec<f64>,
    degenerate: bool,
}

fn compute_trial<T>(
    analyzer: &SpectrumAnalyzer<T>,
    source: &dyn SequenceSource,
    test: &SpectrumTest,
    trial_index: usize,
) -> Result<TrialSpectrum>
where
    T: FftNum + Float,
{
    let values = source.generate(trial_index as u64, test.sequence_length);
    let normalized = normalize_sequence(&values)?;
    let signal: Vec<T> = build_occupancy_signal(&normalized.samples, analyzer.bucket_count())?;
    let spectrum = analyzer.magnitude_spectrum(&signal)?;
    Ok(TrialSpectrum {
        spectrum,
        samples: normalized.samples,
        degenerate: normalized.degenerate,
    })
}

/// Folds trial results into the outcome, strictly in trial order.
struct Collector {
    outcome: TrialOutcome,
    trials: usize,
}

impl Collector {
    fn new(test: &SpectrumTest) -> Self {
        Self {
            outcome: TrialOutcome {
                name: test.name.clone(),
                sequence_length: test.sequence_length,
                first_spectrum: Vec::new(),
                first_samples: Vec::new(),
                last_samples: Vec::new(),
                degenerate_trials: 0,
                statistics: RunningSpectrum::new(),
            },
            trials: test.trials,
        }
    }

    fn absorb(&mut self, trial_index: usize, trial: TrialSpectrum) -> Result<()> {
        self.outcome.statistics.update(trial_index, &trial.spectrum)?;
        if trial.degenerate {
            self.outcome.degenerate_trials += 1;
        }
        if trial_index == 0 {
            debug!(test = %self.outcome.name, "first trial accumulated");
            self.outcome.first_spectrum = trial.spectrum;
            self.outcome.first_samples = trial.samples.clone();
        }
        if trial_index + 1 == self.trials {
            debug!(test = %self.outcome.name, trials = self.trials, "final trial accumulated");
            self.outcome.last_samples = trial.samples;
        }
        Ok(())
    }
}

/// Runs every trial of `test` and returns the accumulated statistics.
///
/// # Errors
/// * [`SpectraError::ZeroTrials`] if the test has no trials
/// * Any error from normalization, signal building or the transform
pub fn run_trials(
    config: &PipelineConfig,
    test: &SpectrumTest,
    source: &dyn SequenceSource,
) -> Result<TrialOutcome> {
    if test.trials == 0 {
        return Err(SpectraError::ZeroTrials(test.name.clone()));
    }
    match config.precision {
        Precision::Single => run_trials_with::<f32>(config, test, source),
        Precision::Double => run_trials_with::<f64>(config, test, source),
    }
}

fn run_trials_with<T>(
    config: &PipelineConfig,
    test: &SpectrumTest,
    source: &dyn SequenceSource,
) -> Result<TrialOutcome>
where
    T: FftNum + Float,
{
    let analyzer = SpectrumAnalyzer::<T>::new(config.bucket_count)?;
    let mut collector = Collector::new(test);

    let workers = config.workers.min(test.trials);
    if workers <= 1 {
        for trial_index in 0..test.trials {
            let trial = compute_trial(&analyzer, source, test, trial_index)?;
            collector.absorb(trial_index, trial)?;
        }
    } else {
        run_parallel(&analyzer, source, test, workers, &mut collector)?;
    }

    Ok(collector.outcome)
}

fn run_parallel<T>(
    analyzer: &SpectrumAnalyzer<T>,
    source: &dyn SequenceSource,
    test: &SpectrumTest,
    workers: usize,
    collector: &mut Collector,
) -> Result<()>
where
    T: FftNum + Float,
{
    let (job_tx, job_rx) = crossbeam_channel::unbounded::<usize>();
    for trial_index in 0..test.trials {
        // the receiver is still in scope, so this cannot fail
        let _ = job_tx.send(trial_index);
    }
    drop(job_tx);

    thread::scope(|scope| {
        let (result_tx, result_rx) = crossbeam_channel::bounded(workers * 2);
        for _ in 0..workers {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            scope.spawn(move || {
                for trial_index in job_rx.iter() {
                    let trial = compute_trial(analyzer, source, test, trial_index);
                    if result_tx.send((trial_index, trial)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(result_tx);

        // workers finish out of order; hold results until their turn
        let mut pending = BTreeMap::new();
        let mut next = 0;
        for (trial_index, trial) in result_rx.iter() {
            pending.insert(trial_index, trial);
            while let Some(trial) = pending.remove(&next) {
                collector.absorb(next, trial?)?;
                next += 1;
            }
        }

        if next == test.trials {
            Ok(())
        } else {
            Err(SpectraError::WorkerDisconnected {
                expected: test.trials,
                received: next,
            })
        }
    })
}

/// Renders and saves the graphs and report for a finished test.
///
/// Writes into `config.output_dir`:
/// - `<name>.png` - spectrum of the first trial
/// - `<name>.avg.png` - averaged spectrum, only when there was more than one trial
/// - `<name>.json` - the [`TestReport`]
///
/// Each graph carries a number line of the samples it was drawn from when
/// `number_line_height` is non-zero.
pub fn render_artifacts(config: &PipelineConfig, outcome: &TrialOutcome) -> Result<TestReport> {
    fs::create_dir_all(&config.output_dir)?;
    let mut artifacts = Vec::new();

    let first = compose_graph(config, &outcome.first_spectrum, None, &outcome.first_samples)?;
    let path = artifact_path(config, &outcome.name, "png");
    first.save_png(&path)?;
    debug!(path = %path.display(), "saved first trial graph");
    artifacts.push(path);

    let std_dev = outcome.statistics.std_dev().unwrap_or_default();
    if outcome.statistics.trials() > 1 {
        let mean = outcome.statistics.mean().unwrap_or_default();
        let envelope = config.show_std_dev.then_some(std_dev.as_slice());
        let average = compose_graph(config, mean, envelope, &outcome.last_samples)?;
        let path = artifact_path(config, &outcome.name, "avg.png");
        average.save_png(&path)?;
        debug!(path = %path.display(), "saved averaged graph");
        artifacts.push(path);
    }

    let report_path = artifact_path(config, &outcome.name, "json");
    artifacts.push(report_path.clone());
    let report = TestReport {
        name: outcome.name.clone(),
        trials: outcome.statistics.trials(),
        sequence_length: outcome.sequence_length,
        bucket_count: outcome.statistics.len(),
        degenerate_trials: outcome.degenerate_trials,
        mean: outcome.statistics.mean().unwrap_or_default().to_vec(),
        std_dev,
        artifacts,
    };
    report.save_to_file(&report_path)?;

    Ok(report)
}

fn compose_graph(
    config: &PipelineConfig,
    spectrum: &[f64],
    std_dev: Option<&[f64]>,
    samples: &[f64],
) -> Result<Canvas> {
    let mut graph = render_spectrum(
        spectrum,
        std_dev,
        config.image_width,
        config.image_height,
        &config.style,
    );
    if config.number_line_height > 0 {
        let line = render_samples_1d(
            samples,
            config.image_width,
            config.number_line_height,
            &config.style,
        );
        graph.append_vertical(&line, true)?;
    }
    Ok(graph)
}

fn artifact_path(config: &PipelineConfig, name: &str, extension: &str) -> PathBuf {
    config.output_dir.join(format!("{name}.{extension}"))
}

/// Runs one test with its configured generator and saves its artifacts.
pub fn run_test(config: &PipelineConfig, test: &SpectrumTest) -> Result<TestReport> {
    info!(
        test = %test.name,
        trials = test.trials,
        length = test.sequence_length,
        "running test"
    );
    let outcome = run_trials(config, test, &test.sequence)?;
    if outcome.degenerate_trials > 0 {
        info!(
            test = %test.name,
            degenerate = outcome.degenerate_trials,
            "some trials produced constant sequences"
        );
    }
    render_artifacts(config, &outcome)
}

/// Runs every test in the battery, in order.
///
/// A failing test is logged and does not stop the remaining ones.
pub fn run_battery(battery: &BatteryConfig) -> Vec<Result<TestReport>> {
    battery
        .tests
        .iter()
        .map(|test| {
            let result = run_test(&battery.pipeline, test);
            if let Err(err) = &result {
                error!(test = %test.name, %err, "test failed");
            }
            result
        })
        .collect()
}
