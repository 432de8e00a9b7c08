use std::path::{Path, PathBuf};

/// Path removed on drop. Renaming the file away first makes the removal a
/// no-op, which is how finished outputs move into place atomically.
pub(crate) struct ScopedPath(pub PathBuf);

impl Drop for ScopedPath {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.0);
    }
}

/// The crossfade combiner's intermediate files, allocated one merge at a
/// time and removed together when the set goes out of scope.
pub(crate) struct TempSet {
    dir: PathBuf,
    created: Vec<PathBuf>,
    counter: usize,
}

impl TempSet {
    pub(crate) fn new(dir: &Path) -> Self {
        Self {
            dir: dir.to_path_buf(),
            created: vec![],
            counter: 0,
        }
    }

    pub(crate) fn next(&mut self) -> PathBuf {
        let path = self.dir.join(format!(".tmp-crossfade-{}.mp3", self.counter));
        self.counter += 1;
        self.created.push(path.clone());
        path
    }
}

impl Drop for TempSet {
    fn drop(&mut self) {
        for path in &self.created {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Staging location next to the final output; renamed over it on success.
pub(crate) fn staging_path(output: &Path) -> PathBuf {
    let mut name = output.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    output.with_file_name(name)
}
