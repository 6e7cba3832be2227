// src/data_input/log_discovery.rs

// Locating log files on disk and recovering dates from their names.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::error::{AnalysisError, Result};

fn flysto_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d{8})-(\d{4})UTC").expect("valid regex"))
}

fn g1000_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"log_(\d{6})_(\d{6})").expect("valid regex"))
}

fn ecu_session_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"session(\d+)_(\d{8})_(\d{6})\.csv$").expect("valid regex"))
}

/// An ECU session export found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcuSessionFile {
    pub path: PathBuf,
    pub session: u32,
    pub started: NaiveDateTime,
}

/// Recovers the flight start from a log file name.
///
/// Understands `N238PS_KBOW-KSPG_20260208-1551UTC.csv` (portal export) and
/// `log_260208_155100_KBOW.csv` (SD-card name).
pub fn date_from_filename(name: &str) -> Option<NaiveDateTime> {
    if let Some(caps) = flysto_name_pattern().captures(name) {
        let stamp = format!("{}{}", &caps[1], &caps[2]);
        if let Ok(dt) = NaiveDateTime::parse_from_str(&format!("{stamp}00"), "%Y%m%d%H%M%S") {
            return Some(dt);
        }
    }
    if let Some(caps) = g1000_name_pattern().captures(name) {
        let stamp = format!("{}{}", &caps[1], &caps[2]);
        if let Ok(dt) = NaiveDateTime::parse_from_str(&stamp, "%y%m%d%H%M%S") {
            return Some(dt);
        }
    }
    None
}

/// Sorted list of `*.csv` files directly inside `dir`.
pub fn list_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(AnalysisError::MissingDirectory(dir.to_path_buf()));
    }
    let entries = fs::read_dir(dir).map_err(|e| AnalysisError::io(dir, e))?;
    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .map(|ext| ext.eq_ignore_ascii_case("csv"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// ECU session exports in `dir`, sorted by file name.
pub fn list_ecu_session_files(dir: &Path) -> Result<Vec<EcuSessionFile>> {
    let mut sessions = Vec::new();
    for path in list_csv_files(dir)? {
        let Some(name) = path.file_name().map(|n| n.to_string_lossy().into_owned()) else {
            continue;
        };
        let Some(caps) = ecu_session_pattern().captures(&name) else {
            continue;
        };
        let Ok(session) = caps[1].parse::<u32>() else {
            continue;
        };
        let stamp = format!("{}{}", &caps[2], &caps[3]);
        let Ok(started) = NaiveDateTime::parse_from_str(&stamp, "%Y%m%d%H%M%S") else {
            continue;
        };
        sessions.push(EcuSessionFile {
            path,
            session,
            started,
        });
    }
    Ok(sessions)
}

/// Finds the export for one ECU session (`DataLog_*_session{N}_*.csv`).
///
/// When several exports exist for the same session the last one by name wins.
pub fn find_ecu_session_file(dir: &Path, session: u32) -> Result<PathBuf> {
    let prefix = "DataLog_";
    let marker = format!("_session{session}_");
    list_csv_files(dir)?
        .into_iter()
        .filter(|p| {
            p.file_name()
                .map(|n| {
                    let n = n.to_string_lossy();
                    n.starts_with(prefix) && n.contains(&marker)
                })
                .unwrap_or(false)
        })
        .last()
        .ok_or_else(|| AnalysisError::NoEcuSession {
            dir: dir.to_path_buf(),
            session,
        })
}
