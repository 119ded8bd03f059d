use std::env;
use std::fs;
use std::process;

use harmonize::{AnalysisOptions, LabelKind, Score};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: harmonize [--no-validate] [--merge] [--options <file>] [--roman | --segments] <score.yaml> [output.yaml]";

fn fail(message: impl std::fmt::Display) -> ! {
    eprintln!("{}", message);
    process::exit(1);
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    let mut no_validate = false;
    let mut merge = false;
    let mut options_path: Option<&String> = None;
    let mut labels: Option<LabelKind> = None;
    let mut paths: Vec<&String> = Vec::new();

    // Parse flags
    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--no-validate" => no_validate = true,
            "--merge" => merge = true,
            "--roman" => labels = Some(LabelKind::RomanNumerals),
            "--segments" => labels = Some(LabelKind::Segments),
            "--options" => match iter.next() {
                Some(path) => options_path = Some(path),
                None => fail(USAGE),
            },
            flag if flag.starts_with("--") => fail(format!("Unknown flag '{}'\n{}", flag, USAGE)),
            _ => paths.push(arg),
        }
    }

    let (input_path, output_path) = match paths.as_slice() {
        [input] => (*input, None),
        [input, output] => (*input, Some(*output)),
        _ => fail(USAGE),
    };

    // Options file, then command-line overrides
    let mut options = match options_path {
        Some(path) => {
            let text = fs::read_to_string(path)
                .unwrap_or_else(|e| fail(format!("Error reading options '{}': {}", path, e)));
            AnalysisOptions::from_yaml(&text).unwrap_or_else(|e| fail(format!("Options error: {}", e)))
        }
        None => AnalysisOptions::default(),
    };
    if let Some(labels) = labels {
        options.labels = labels;
    }

    // Read input file
    let source = fs::read_to_string(input_path)
        .unwrap_or_else(|e| fail(format!("Error reading file '{}': {}", input_path, e)));
    let score = Score::from_yaml(&source).unwrap_or_else(|e| fail(format!("Parse error: {}", e)));

    if !no_validate {
        if let Err(e) = harmonize::validate(&score) {
            fail(format!("Validation error: {}", e));
        }
    }

    // Analyze
    let analysis =
        harmonize::analyze(&score, &options).unwrap_or_else(|e| fail(format!("Analysis error: {}", e)));

    let output = if merge {
        analysis.merged_into(&score)
    } else {
        Score {
            title: score.title.clone(),
            key: analysis.key,
            parts: vec![analysis.chordified.clone()],
        }
    };
    let yaml = output
        .to_yaml()
        .unwrap_or_else(|e| fail(format!("Output error: {}", e)));

    eprintln!(
        "{} labels, {} skipped",
        analysis.label_count(),
        analysis.skipped.len()
    );

    // Output
    match output_path {
        Some(path) => {
            if let Err(e) = fs::write(path, &yaml) {
                fail(format!("Error writing to '{}': {}", path, e));
            }
            eprintln!("Wrote reduction to {}", path);
        }
        None => {
            print!("{}", yaml);
        }
    }
}
