//! Wall-clock timing of analysis stages.
//!
//! Stages are wrapped in [`timed`]; when timing is off the closure runs
//! untouched. Samples live in thread-local storage and are drained by
//! [`collect_report`], which groups them by stage name in first-seen order.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde::Serialize;

/// Environment variable that turns timing on without `--timing`.
pub const TIMING_ENV: &str = "DEPFLOW_TIMING";

/// Aggregated timings for every stage that ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimingReport {
    pub stages: Vec<StageTiming>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageTiming {
    pub name: String,
    pub count: usize,
    #[serde(rename = "total_us", serialize_with = "as_micros")]
    pub total: Duration,
    #[serde(rename = "mean_us", serialize_with = "as_micros")]
    pub mean: Duration,
    #[serde(rename = "max_us", serialize_with = "as_micros")]
    pub max: Duration,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn as_micros<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u128(d.as_micros())
}

thread_local! {
    static SAMPLES: RefCell<Vec<(String, Duration)>> = const { RefCell::new(Vec::new()) };
}

static TIMING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Returns true when `DEPFLOW_TIMING` is set to `1`, `true`, `yes` or `on`.
#[must_use]
pub fn timing_enabled_from_env() -> bool {
    std::env::var(TIMING_ENV)
        .ok()
        .is_some_and(|value| is_truthy(&value))
}

pub fn set_timing_enabled(enabled: bool) {
    TIMING_ENABLED.store(enabled, Ordering::Relaxed);
    if !enabled {
        clear_timings();
    }
}

#[must_use]
pub fn is_timing_enabled() -> bool {
    TIMING_ENABLED.load(Ordering::Relaxed)
}

pub fn clear_timings() {
    SAMPLES.with(|samples| samples.borrow_mut().clear());
}

/// Run `f`, recording its duration under `stage` when timing is enabled.
pub fn timed<R>(stage: &str, f: impl FnOnce() -> R) -> R {
    if !is_timing_enabled() {
        return f();
    }

    let started = Instant::now();
    let result = f();
    record_sample(stage, started.elapsed());
    result
}

/// Drain this thread's samples into a report.
#[must_use]
pub fn collect_report() -> TimingReport {
    let samples = SAMPLES.with(|samples| std::mem::take(&mut *samples.borrow_mut()));

    let mut stages: Vec<StageTiming> = Vec::new();
    for (name, elapsed) in samples {
        if let Some(stage) = stages.iter_mut().find(|s| s.name == name) {
            stage.count += 1;
            stage.total += elapsed;
            stage.max = stage.max.max(elapsed);
        } else {
            stages.push(StageTiming {
                name,
                count: 1,
                total: elapsed,
                mean: Duration::ZERO,
                max: elapsed,
            });
        }
    }
    for stage in &mut stages {
        stage.mean = stage.total / u32::try_from(stage.count).unwrap_or(u32::MAX);
    }

    TimingReport { stages }
}

impl TimingReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Render as a fixed-width table.
    #[must_use]
    pub fn display_table(&self) -> String {
        if self.stages.is_empty() {
            return "No timing samples recorded.".to_string();
        }

        let mut out = String::new();
        out.push_str("stage                        count    total     mean      max\n");
        out.push_str("--------------------------------------------------------------\n");
        for stage in &self.stages {
            out.push_str(&format!(
                "{:<28} {:>6} {:>8} {:>8} {:>8}\n",
                stage.name,
                stage.count,
                format_duration(stage.total),
                format_duration(stage.mean),
                format_duration(stage.max),
            ));
        }
        out
    }
}

fn record_sample(stage: &str, elapsed: Duration) {
    SAMPLES.with(|samples| samples.borrow_mut().push((stage.to_string(), elapsed)));
}

fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();
    if micros >= 1_000_000 {
        format!("{}.{:03}s", micros / 1_000_000, (micros % 1_000_000) / 1_000)
    } else if micros >= 1_000 {
        format!("{}.{:03}ms", micros / 1_000, micros % 1_000)
    } else {
        format!("{micros}µs")
    }
}

fn is_truthy(value: &str) -> bool {
    ["1", "true", "yes", "on"]
        .iter()
        .any(|t| value.eq_ignore_ascii_case(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    static TEST_GUARD: std::sync::Mutex<()> = std::sync::Mutex::new(());

    #[test]
    fn disabled_timing_records_nothing() {
        let _guard = TEST_GUARD.lock().expect("test guard lock");
        set_timing_enabled(false);

        assert_eq!(timed("scc", || 3_u8), 3);
        assert!(collect_report().is_empty());
    }

    #[test]
    fn stages_group_in_first_seen_order() {
        let _guard = TEST_GUARD.lock().expect("test guard lock");
        clear_timings();

        record_sample("scc", Duration::from_micros(300));
        record_sample("condense", Duration::from_micros(50));
        record_sample("scc", Duration::from_micros(100));

        let report = collect_report();
        let names: Vec<_> = report.stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["scc", "condense"]);

        let scc = &report.stages[0];
        assert_eq!(scc.count, 2);
        assert_eq!(scc.total, Duration::from_micros(400));
        assert_eq!(scc.mean, Duration::from_micros(200));
        assert_eq!(scc.max, Duration::from_micros(300));
    }

    #[test]
    fn enabled_timing_records_and_serializes() {
        let _guard = TEST_GUARD.lock().expect("test guard lock");
        set_timing_enabled(true);
        clear_timings();

        timed("topo", || std::thread::sleep(Duration::from_millis(1)));
        let report = collect_report();
        set_timing_enabled(false);

        assert_eq!(report.stages.len(), 1);
        assert!(report.stages[0].total >= Duration::from_millis(1));
        assert!(report.display_table().contains("topo"));

        let json = serde_json::to_value(&report).expect("json");
        assert_eq!(json["stages"][0]["name"], "topo");
        assert!(json["stages"][0]["total_us"].as_u64().is_some());
    }

    #[test]
    fn truthy_values() {
        assert!(is_truthy("YES"));
        assert!(is_truthy("1"));
        assert!(!is_truthy("0"));
        assert!(!is_truthy("off"));
        assert_eq!(format_duration(Duration::from_micros(1_500)), "1.500ms");
    }
}
