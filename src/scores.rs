//! Loading ranked scores and deriving bar magnitudes.

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use serde::Deserialize;
use std::path::Path;

use crate::widgets::bar_selector::compute_max;
use crate::ScoreFormat;

/// Scores in rank order with the magnitude used to size each bar.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreSet {
    pub scores: Vec<f64>,
    pub magnitudes: Vec<f64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ScoreFile {
    Plain(Vec<f64>),
    Detailed {
        scores: Vec<f64>,
        #[serde(default)]
        magnitudes: Option<Vec<f64>>,
    },
}

impl ScoreSet {
    /// Pair scores with explicit magnitudes. Both must be non-empty, finite and of equal length.
    pub fn new(scores: Vec<f64>, magnitudes: Vec<f64>) -> Result<Self> {
        if scores.is_empty() {
            return Err(eyre!("No scores found"));
        }
        if scores.len() != magnitudes.len() {
            return Err(eyre!(
                "Found {} scores but {} magnitudes",
                scores.len(),
                magnitudes.len()
            ));
        }
        if let Some(i) = scores.iter().position(|s| !s.is_finite()) {
            return Err(eyre!("Score at rank {} is not a finite number", i));
        }
        if let Some(i) = magnitudes.iter().position(|m| !m.is_finite() || *m < 0.0) {
            return Err(eyre!(
                "Magnitude at rank {} must be a finite, non-negative number",
                i
            ));
        }
        Ok(Self { scores, magnitudes })
    }

    /// Scores with magnitudes derived by [`normalize`].
    pub fn from_scores(scores: Vec<f64>) -> Result<Self> {
        let magnitudes = normalize(&scores);
        Self::new(scores, magnitudes)
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        match serde_json::from_str::<ScoreFile>(content)? {
            ScoreFile::Plain(scores) => Self::from_scores(scores),
            ScoreFile::Detailed {
                scores,
                magnitudes: Some(magnitudes),
            } => Self::new(scores, magnitudes),
            ScoreFile::Detailed {
                scores,
                magnitudes: None,
            } => Self::from_scores(scores),
        }
    }

    /// One score per line. Blank lines and `#` comments are skipped.
    pub fn from_text(content: &str) -> Result<Self> {
        let mut scores = Vec::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.split('#').next().unwrap_or_default().trim();
            if line.is_empty() {
                continue;
            }
            let score = line
                .parse::<f64>()
                .map_err(|_| eyre!("Line {}: '{}' is not a number", lineno + 1, line))?;
            scores.push(score);
        }
        Self::from_scores(scores)
    }

    /// Read a score file, detecting the format from the extension unless given.
    pub fn load(path: &Path, format: Option<ScoreFormat>) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let format = format.unwrap_or_else(|| ScoreFormat::from_path(path));
        let set = match format {
            ScoreFormat::Json => Self::from_json_str(&content),
            ScoreFormat::Text => Self::from_text(&content),
        }
        .wrap_err_with(|| format!("Failed to load scores from {}", path.display()))?;
        tracing::info!(path = %path.display(), results = set.len(), "loaded scores");
        Ok(set)
    }

    /// Keep only the first `n` results; 0 keeps everything.
    pub fn truncate(&mut self, n: usize) {
        if n > 0 {
            self.scores.truncate(n);
            self.magnitudes.truncate(n);
        }
    }

    pub fn len(&self) -> usize {
        self.scores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }
}

/// Min-max normalize `scores` into `[0, 1]`. Equal scores all map to 1.
pub fn normalize(scores: &[f64]) -> Vec<f64> {
    let Some(max) = compute_max(scores) else {
        return Vec::new();
    };
    let min = scores.iter().copied().fold(max, f64::min);
    let range = max - min;
    scores
        .iter()
        .map(|s| if range > 0.0 { (s - min) / range } else { 1.0 })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(&[]), Vec::<f64>::new());
        assert_eq!(normalize(&[-10.0, -20.0, -15.0]), vec![1.0, 0.0, 0.5]);
        assert_eq!(normalize(&[3.0, 3.0]), vec![1.0, 1.0]);
    }

    #[test]
    fn test_truncate_zero_keeps_all() {
        let mut set = ScoreSet::from_scores(vec![3.0, 2.0, 1.0]).unwrap();
        set.truncate(0);
        assert_eq!(set.len(), 3);
        set.truncate(2);
        assert_eq!(set.scores, vec![3.0, 2.0]);
        assert_eq!(set.magnitudes, vec![1.0, 0.5]);
    }

    #[test]
    fn test_rejects_non_finite() {
        assert!(ScoreSet::from_text("1.0\nNaN\n").is_err());
        assert!(ScoreSet::new(vec![1.0], vec![-0.5]).is_err());
    }
}
