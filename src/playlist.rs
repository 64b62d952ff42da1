//! Playlist — an ordered file list with a cursor, persisted one path per
//! line with no escaping.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default)]
pub struct Playlist {
    files: Vec<PathBuf>,
    current: usize,
}

impl Playlist {
    pub fn new(files: Vec<PathBuf>) -> Self {
        Self { files, current: 0 }
    }

    /// Load a newline-delimited playlist; blank lines are skipped.
    pub fn load(path: &Path) -> io::Result<Self> {
        let content = fs::read_to_string(path)?;
        let files = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(PathBuf::from)
            .collect();
        Ok(Self::new(files))
    }

    /// Save one path per line.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut out = String::new();
        for file in &self.files {
            out.push_str(&file.display().to_string());
            out.push('\n');
        }
        fs::write(path, out)
    }

    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// File at the cursor.
    pub fn current(&self) -> Option<&Path> {
        self.files.get(self.current).map(PathBuf::as_path)
    }

    /// Move the cursor to `index` if it exists.
    pub fn select(&mut self, index: usize) -> Option<&Path> {
        if index < self.files.len() {
            self.current = index;
        }
        self.files.get(index).map(PathBuf::as_path)
    }

    /// Advance the cursor; None when already at the last entry.
    pub fn next(&mut self) -> Option<&Path> {
        if self.current + 1 < self.files.len() {
            self.current += 1;
            self.current()
        } else {
            None
        }
    }

    /// Step the cursor back; None when already at the first entry.
    pub fn previous(&mut self) -> Option<&Path> {
        if self.current > 0 {
            self.current -= 1;
            self.current()
        } else {
            None
        }
    }
}
