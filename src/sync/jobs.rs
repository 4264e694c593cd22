use std::collections::HashSet;
use std::path::Path;

use super::source::RepoSource;

/// One source to synchronize from the command line.
#[derive(Clone, Debug)]
pub struct SyncJob {
    pub display: String,
    pub source: RepoSource,
}

/// Build synchronization jobs from command-line locators.
///
/// Blank entries are skipped and repeated locators are kept once, in first-seen
/// order. Locators that differ but share a working-copy name still get one job
/// each; the per-path lock serializes them.
///
/// The display label is the working-copy name when it can be derived, else the
/// raw locator.
pub fn build_jobs(locators: &[String], root: &Path) -> Vec<SyncJob> {
    let mut seen = HashSet::new();
    let mut jobs = Vec::new();

    for loc in locators {
        let loc = loc.trim();
        if loc.is_empty() || !seen.insert(loc.to_string()) {
            continue;
        }
        let source = RepoSource::new(loc);
        let display = match source.local_path(root) {
            Ok(p) => format!("{} → {}", loc, p.display()),
            Err(_) => loc.to_string(),
        };
        jobs.push(SyncJob { display, source });
    }

    jobs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_and_duplicate_locators() {
        let locs = vec![
            "https://example.com/org/repo".to_string(),
            " ".to_string(),
            "https://example.com/org/repo".to_string(),
            "https://example.com/other/repo".to_string(),
        ];
        let jobs = build_jobs(&locs, Path::new("/tmp"));
        let got: Vec<_> = jobs.iter().map(|j| j.source.as_str()).collect();
        assert_eq!(
            got,
            vec!["https://example.com/org/repo", "https://example.com/other/repo"]
        );
        assert_eq!(jobs[0].display, "https://example.com/org/repo → /tmp/repo");
    }
}
