//! Runs are reproducible from their run index alone.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;

use nkscape_core::{ExperimentConfig, FileSink, MemorySink, OutputFormat, Simulator, run_experiment};
use nkscape_types::StepRecord;

const EXPERIMENT: &str = r#"
cases:
  - runs: 3
    influence_matrix:
      rows:
        - "x,x,x,,,"
        - ",x,x,x,,"
        - ",,x,x,x,"
        - ",,,x,x,x"
        - "x,,,,x,x"
        - "x,x,,,,x"
    bias: 0.4
    delta: 0.3
    tau: [5, 12]
    agents:
      - { type: myopic, num: 2, power: 2, constraint: 0.6, plan: "(0,1,2)(3,4,5)" }
      - { type: planner, num: 1, power: 1, constraint: 1.0, exhaustive: true, averaging: true, plan: "(0,1)(2,3)(4,5)" }
"#;

fn config() -> ExperimentConfig {
    ExperimentConfig::parse(EXPERIMENT, Path::new(".")).unwrap()
}

fn records_of_run(run_index: u32) -> Vec<StepRecord> {
    let config = config();
    let case = config.cases.first().unwrap();
    let mut sink = MemorySink::new();
    Simulator::new(case, run_index).unwrap().run(&mut sink).unwrap();
    sink.records().copied().collect()
}

fn read_dir_sorted(dir: &Path) -> Vec<(String, Vec<u8>)> {
    let mut files: Vec<(String, Vec<u8>)> = fs::read_dir(dir)
        .unwrap()
        .map(|entry| {
            let entry = entry.unwrap();
            (
                entry.file_name().to_string_lossy().into_owned(),
                fs::read(entry.path()).unwrap(),
            )
        })
        .collect();
    files.sort();
    files
}

#[test]
fn same_run_index_gives_identical_records() {
    assert_eq!(records_of_run(1), records_of_run(1));
}

#[test]
fn different_run_indices_diverge() {
    assert_ne!(records_of_run(0), records_of_run(1));
    assert_ne!(records_of_run(1), records_of_run(2));
}

#[test]
fn a_run_does_not_depend_on_earlier_runs() {
    let config = config();
    let mut sink = MemorySink::new();
    run_experiment(&config, &mut sink).unwrap();
    let third_run: Vec<StepRecord> = sink.records().filter(|r| r.run == 2).copied().collect();
    assert_eq!(third_run, records_of_run(2));
}

#[test]
fn file_output_is_byte_identical_across_experiments() {
    let config = config();
    let first = tempfile::tempdir().unwrap();
    let second = tempfile::tempdir().unwrap();
    for dir in [first.path(), second.path()] {
        let mut sink = FileSink::new(dir, OutputFormat::Tsv);
        run_experiment(&config, &mut sink).unwrap();
    }
    let first_files = read_dir_sorted(first.path());
    assert_eq!(first_files.len(), 2);
    assert_eq!(first_files, read_dir_sorted(second.path()));

    let names: Vec<&str> = first_files.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(
        names,
        [
            "o_n6k2_b0.4d0.3c0.6_nonAveraging_random_myopic.txt",
            "o_n6k2_b0.4d0.3c1.0_averaging_exhaustive_planner.txt",
        ]
    );
}

#[test]
fn file_sink_appends_runs_as_tab_separated_lines() {
    let config = config();
    let dir = tempfile::tempdir().unwrap();
    let mut sink = FileSink::new(dir.path(), OutputFormat::Tsv);
    let summary = run_experiment(&config, &mut sink).unwrap();

    let mut lines = 0_u64;
    for (_, bytes) in read_dir_sorted(dir.path()) {
        let text = String::from_utf8(bytes).unwrap();
        for line in text.lines() {
            assert_eq!(line.split('\t').count(), 8, "{line}");
            lines += 1;
        }
    }
    assert_eq!(lines, summary.records);
}
