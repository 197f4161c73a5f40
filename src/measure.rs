use std::fs;
use std::io;
use std::path::Path;
use std::sync::Mutex;
use std::thread;

use log::warn;
use once_cell::sync::Lazy;

/// File the benchmark table is persisted in.
pub const MEASUREMENT_FILE: &str = "mjerenje.txt";

/// Number of tracked process counts; slot `k` holds the run with `k + 1`
/// processes.
pub const SLOTS: usize = 8;

/// Sink for move-timing measurements.
///
/// The coordinator feeds it the wall-clock of its first `play` call so that
/// runs with different process counts can be compared.
pub trait MeasurementSink {
    fn record(&mut self, process_count: usize, elapsed_ms: u64);
}

/// Sink that discards measurements. Used by tests and tooling that must not
/// touch the measurement file.
pub struct NullSink;

impl MeasurementSink for NullSink {
    fn record(&mut self, _process_count: usize, _elapsed_ms: u64) {}
}

/// Benchmark table persisted as four fixed lines: the machine's cpu count,
/// per-process-count milliseconds, speedups and efficiencies.
#[derive(Debug, Clone, PartialEq)]
pub struct Benchmark {
    cpu_count: usize,
    measurements: [u64; SLOTS],
    speedup: [f64; SLOTS],
    efficiency: [f64; SLOTS],
}

impl Benchmark {
    /// Creates an empty table: zeroed measurements, unit ratios.
    pub fn new() -> Self {
        Benchmark {
            cpu_count: thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            measurements: [0; SLOTS],
            speedup: [1.0; SLOTS],
            efficiency: [1.0; SLOTS],
        }
    }

    /// Loads the table from `path`, falling back to an empty table when the
    /// file is missing or does not parse.
    pub fn load(path: &Path) -> Self {
        fs::read_to_string(path)
            .ok()
            .and_then(|contents| Self::parse(&contents))
            .unwrap_or_else(Benchmark::new)
    }

    fn parse(contents: &str) -> Option<Self> {
        let mut lines = contents.lines();
        let cpu_count = lines.next()?.trim().parse().ok()?;
        let measurements = parse_line(lines.next()?)?;
        let speedup = parse_line(lines.next()?)?;
        let efficiency = parse_line(lines.next()?)?;
        Some(Benchmark {
            cpu_count,
            measurements,
            speedup,
            efficiency,
        })
    }

    /// Records the elapsed time of a run with `process_count` processes and
    /// refreshes the derived ratios of its slot.
    ///
    /// Speedup is measured against the single-process run in slot 0;
    /// efficiency divides it by the process count.
    pub fn record(&mut self, process_count: usize, elapsed_ms: u64) {
        if process_count == 0 || process_count > SLOTS {
            warn!("process count {} out of the table range", process_count);
            return;
        }
        let slot = process_count - 1;
        self.measurements[slot] = elapsed_ms;
        if elapsed_ms == 0 {
            self.speedup[slot] = 0.0;
            self.efficiency[slot] = 0.0;
            return;
        }
        let base = self.measurements[0] as f64;
        self.speedup[slot] = base / elapsed_ms as f64;
        self.efficiency[slot] = base / (elapsed_ms as f64 * process_count as f64);
    }

    /// Writes the table to `path` in its fixed four-line format.
    pub fn write(&self, path: &Path) -> io::Result<()> {
        let mut contents = format!("{}\n", self.cpu_count);
        contents += &join_line(self.measurements.iter().map(|m| m.to_string()));
        contents += &join_line(self.speedup.iter().map(|s| format!("{:.3}", s)));
        contents += &join_line(self.efficiency.iter().map(|e| format!("{:.3}", e)));
        fs::write(path, contents)
    }

    pub fn cpu_count(&self) -> usize {
        self.cpu_count
    }

    pub fn measurements(&self) -> &[u64; SLOTS] {
        &self.measurements
    }

    pub fn speedup(&self) -> &[f64; SLOTS] {
        &self.speedup
    }

    pub fn efficiency(&self) -> &[f64; SLOTS] {
        &self.efficiency
    }
}

impl Default for Benchmark {
    fn default() -> Self {
        Benchmark::new()
    }
}

fn parse_line<T: std::str::FromStr + Copy + Default>(line: &str) -> Option<[T; SLOTS]> {
    let values: Vec<T> = line
        .split_whitespace()
        .map(|token| token.parse().ok())
        .collect::<Option<_>>()?;
    if values.len() != SLOTS {
        return None;
    }
    let mut result = [T::default(); SLOTS];
    result.copy_from_slice(&values);
    Some(result)
}

fn join_line<I: Iterator<Item = String>>(values: I) -> String {
    let mut line = values.collect::<Vec<_>>().join(" ");
    line.push('\n');
    line
}

/// Process-wide benchmark table behind the shared measurement file.
///
/// This is the only sanctioned process-wide mutable state in the crate; the
/// table has a single writer, the coordinator's first `play` call.
static BENCHMARK: Lazy<Mutex<Benchmark>> =
    Lazy::new(|| Mutex::new(Benchmark::load(Path::new(MEASUREMENT_FILE))));

/// Sink that updates the process-wide table and persists it.
pub struct FileSink;

impl MeasurementSink for FileSink {
    fn record(&mut self, process_count: usize, elapsed_ms: u64) {
        let mut benchmark = BENCHMARK.lock().expect("measurement table poisoned");
        benchmark.record(process_count, elapsed_ms);
        if let Err(err) = benchmark.write(Path::new(MEASUREMENT_FILE)) {
            warn!("could not persist measurements: {}", err);
        }
    }
}
