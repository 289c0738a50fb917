//! Problem loading and solution export

use std::fs;
use std::path::{Path, PathBuf};

use tourview_core::{read_tsplib, Problem, ProblemError, Solution};
use tracing::info;

/// Source of a problem to display.
///
/// `Ok(None)` means nothing was selected, which is not an error: the caller
/// keeps whatever it was showing.
pub trait ProblemLoader {
    fn load(&self) -> Result<Option<Problem>, ProblemError>;
}

/// Loads a TSPLIB file chosen by the user, if one was chosen.
#[derive(Debug, Clone, Default)]
pub struct FileProblemLoader {
    path: Option<PathBuf>,
}

impl FileProblemLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A loader standing for a dismissed file dialog
    pub fn no_selection() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl From<Option<PathBuf>> for FileProblemLoader {
    fn from(path: Option<PathBuf>) -> Self {
        Self { path }
    }
}

impl ProblemLoader for FileProblemLoader {
    fn load(&self) -> Result<Option<Problem>, ProblemError> {
        match &self.path {
            Some(path) => read_tsplib(path).map(Some),
            None => Ok(None),
        }
    }
}

/// Wrap `comment` onto several lines.
///
/// Words are kept whole. A line ends after the word that brings it to
/// `max_len` characters or more, so a single long word gets its own line.
pub fn format_comment(comment: &str, max_len: usize) -> String {
    let mut lines = Vec::new();
    let mut line = String::new();
    for word in comment.split_whitespace() {
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
        if line.chars().count() >= max_len {
            lines.push(std::mem::take(&mut line));
        }
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}

/// Write the problem name, comment, tour and tour length, one per line.
pub fn save_solution(path: &Path, problem: &Problem, solution: &Solution) -> std::io::Result<()> {
    let content = format!("{}\n{}\n{}\n", problem.name, problem.comment, solution);
    fs::write(path, content)?;
    info!(path = %path.display(), length = solution.tour_length, "Saved solution");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tourview_core::{Point, PointSet, Tour};

    #[test]
    fn test_format_comment_wraps_on_words() {
        assert_eq!(
            format_comment("Drilling problem with many holes", 10),
            "Drilling problem\nwith many holes"
        );
    }

    #[test]
    fn test_format_comment_short_and_empty() {
        assert_eq!(format_comment("short", 40), "short");
        assert_eq!(format_comment("", 40), "");
        assert_eq!(format_comment("  a   b  ", 40), "a b");
    }

    #[test]
    fn test_format_comment_long_word_alone() {
        assert_eq!(
            format_comment("x supercalifragilistic y", 5),
            "x supercalifragilistic\ny"
        );
    }

    #[test]
    fn test_no_selection_is_not_an_error() {
        assert!(FileProblemLoader::no_selection().load().unwrap().is_none());
        assert!(FileProblemLoader::from(None).path().is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let loader = FileProblemLoader::new("/definitely/not/here.tsp");
        assert!(matches!(loader.load(), Err(ProblemError::Io { .. })));
    }

    #[test]
    fn test_save_solution_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        let problem = Problem::new(
            "pair",
            "two cities",
            PointSet::new(vec![Point::new(1, 0.0, 0.0), Point::new(2, 3.0, 4.0)]),
        );
        let solution = Solution::new(Tour::new(vec![0, 1, 0]), 10.0);
        save_solution(&path, &problem, &solution).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "pair\ntwo cities\n0 1 0\n10\n");
    }
}
