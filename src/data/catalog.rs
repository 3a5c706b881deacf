use std::{fs, io, path::{Path, PathBuf}};

/// One loadable game as listed on the ROM selection page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomEntry {
    pub name: String,
    pub path: PathBuf,
}

impl RomEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Ordered records a list item is bound to. Lists only read through this.
pub trait RecordSource {
    fn record_count(&self) -> usize;
    /// `None` past the end; callers may hold a stale count.
    fn record_label(&self, index: usize) -> Option<&str>;
}

#[derive(Debug, Clone, Default)]
pub struct RomCatalog {
    entries: Vec<RomEntry>,
}

impl RomCatalog {
    /// Entries are kept sorted by display name, case-insensitively.
    pub fn new(mut entries: Vec<RomEntry>) -> Self {
        entries.sort_by_key(|entry| entry.name.to_lowercase());
        Self { entries }
    }

    /// Every file in `dir` whose extension is one of `extensions`, named by
    /// file stem. A missing directory is an empty catalog.
    pub fn scan(dir: &Path, extensions: &[&str]) -> io::Result<Self> {
        let read_dir = match fs::read_dir(dir) {
            Ok(read_dir) => read_dir,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(err) => return Err(err),
        };
        let mut entries = Vec::new();
        for entry in read_dir {
            let path = entry?.path();
            let matches = path
                .extension()
                .is_some_and(|found| extensions.iter().any(|wanted| found.eq_ignore_ascii_case(wanted)));
            if !matches || !path.is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                entries.push(RomEntry::new(stem, path.clone()));
            }
        }
        Ok(Self::new(entries))
    }

    pub fn get(&self, index: usize) -> Option<&RomEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RecordSource for RomCatalog {
    fn record_count(&self) -> usize {
        self.entries.len()
    }

    fn record_label(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|entry| entry.name.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_sorts_by_name_ignoring_case() {
        let catalog = RomCatalog::new(vec![
            RomEntry::new("wario land", "/roms/w.vb"),
            RomEntry::new("Galactic Pinball", "/roms/g.vb"),
            RomEntry::new("mario clash", "/roms/m.vb"),
        ]);
        let names: Vec<_> = (0..catalog.record_count())
            .filter_map(|index| catalog.record_label(index))
            .collect();
        assert_eq!(names, ["Galactic Pinball", "mario clash", "wario land"]);
        assert_eq!(catalog.record_label(3), None);
    }

    #[test]
    fn scan_keeps_matching_files_only() {
        let dir = std::env::temp_dir().join(format!("vr_frontend_roms_{}", std::process::id()));
        fs::create_dir_all(&dir).expect("temp dir");
        for name in ["Red Alarm.vb", "Jack Bros.VB", "Insmouse.vboy", "Nester.bin", "notes.txt"] {
            fs::write(dir.join(name), b"").expect("temp file");
        }

        let catalog = RomCatalog::scan(&dir, &["vb", "vboy", "bin"]).expect("scan succeeds");
        let names: Vec<_> = (0..catalog.len())
            .filter_map(|index| catalog.record_label(index))
            .collect();
        assert_eq!(names, ["Insmouse", "Jack Bros", "Nester", "Red Alarm"]);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn scan_of_missing_dir_is_empty() {
        let catalog = RomCatalog::scan(Path::new("/definitely/not/a/rom/dir"), &["vb"]).expect("missing dir is fine");
        assert!(catalog.is_empty());
    }
}
