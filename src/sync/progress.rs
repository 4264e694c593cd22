use indicatif::ProgressStyle;

const TICKS: &[&str] = &["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"];

/// Running: yellow spinner, elapsed time, source label, current step.
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("{spinner:.yellow} [{elapsed:>3}] {prefix} {wide_msg:.dim}")
        .unwrap()
        .tick_strings(TICKS)
}

/// Finished: green check, source label, resolved path.
pub fn ok_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:.green} ✔ {wide_msg}").unwrap()
}

/// Failed: red cross, source label, error chain.
pub fn err_style() -> ProgressStyle {
    ProgressStyle::with_template("{prefix:.red} ✘ {wide_msg:.red}").unwrap()
}
