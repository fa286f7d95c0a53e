//! Output location: the timestamped directory that receives one run's charts.
//!
//! The directory is named from the run start time and created lazily, at most
//! once, the first time an artifact path is requested.

use crate::domain::Ticker;
use chrono::{DateTime, TimeZone};
use std::collections::HashSet;
use std::fmt::Display;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Directory name pattern, formatted from the run start time.
pub const DIR_NAME_FORMAT: &str = "FII-%d-%m-%Y-%H-%M-%S";

/// File name of the combined chart.
pub const COMBINED_CHART_FILE: &str = "grafico_completo.png";

/// Suffix appended to a ticker stem for its own chart.
pub const TICKER_CHART_SUFFIX: &str = "_historico.png";

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Timestamped output directory for one run.
#[derive(Debug)]
pub struct OutputLocation {
    dir: PathBuf,
    creations: usize,
    used_stems: HashSet<String>,
}

impl OutputLocation {
    /// Location under `root`, named from `started_at`. Nothing is created yet.
    pub fn for_run<Tz>(root: impl AsRef<Path>, started_at: &DateTime<Tz>) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: Display,
    {
        Self::at(root.as_ref().join(dir_name(started_at)))
    }

    /// Location at an explicit directory path.
    pub fn at(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            creations: 0,
            used_stems: HashSet::new(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Absolute form of the directory, for the final report.
    pub fn absolute_dir(&self) -> PathBuf {
        std::fs::canonicalize(&self.dir)
            .or_else(|_| std::path::absolute(&self.dir))
            .unwrap_or_else(|_| self.dir.clone())
    }

    /// How many times this run created the directory (0 or 1).
    pub fn creations(&self) -> usize {
        self.creations
    }

    /// Create the directory if this run has not done so yet.
    pub fn ensure_created(&mut self) -> Result<&Path, OutputError> {
        if self.creations == 0 {
            std::fs::create_dir_all(&self.dir).map_err(|source| OutputError::CreateDir {
                path: self.dir.clone(),
                source,
            })?;
            self.creations = 1;
            tracing::debug!(dir = %self.dir.display(), "created output directory");
        }
        Ok(&self.dir)
    }

    /// Path of the combined chart, creating the directory on first use.
    pub fn combined_chart_path(&mut self) -> Result<PathBuf, OutputError> {
        Ok(self.ensure_created()?.join(COMBINED_CHART_FILE))
    }

    /// Path of a per-ticker chart, creating the directory on first use.
    ///
    /// Tickers whose sanitized stems collide get `-2`, `-3`, ... so no chart
    /// of this run overwrites another.
    pub fn ticker_chart_path(&mut self, ticker: &Ticker) -> Result<PathBuf, OutputError> {
        let stem = self.claim_stem(ticker.file_stem());
        Ok(self
            .ensure_created()?
            .join(format!("{stem}{TICKER_CHART_SUFFIX}")))
    }

    fn claim_stem(&mut self, base: String) -> String {
        if self.used_stems.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if self.used_stems.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

/// Directory name for a run started at `started_at`.
pub fn dir_name<Tz>(started_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    started_at.format(DIR_NAME_FORMAT).to_string()
}
