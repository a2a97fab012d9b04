//! Append-only merged output files, one per log family.

use std::fs::{self, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MergeError, MergeResult};
use crate::family::LogFamily;

/// Directory under the output home that holds the merged files.
pub const LOGS_DIR: &str = "logs";

/// Writer bound to one merged output file.
///
/// Each append opens the file, writes one line and drops the handle before
/// returning, so no handle outlives a single source file.
#[derive(Clone, Debug)]
pub struct MergedOutput {
    family: LogFamily,
    path: PathBuf,
}

impl MergedOutput {
    pub fn new(family: LogFamily, path: impl Into<PathBuf>) -> Self {
        Self {
            family,
            path: path.into(),
        }
    }

    pub fn family(&self) -> LogFamily {
        self.family
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `line` followed by a newline.
    pub fn append_line(&self, line: &str) -> MergeResult<()> {
        let access = |e| MergeError::file_access(&self.path, e);

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(access)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(access)?;

        let mut writer = BufWriter::new(file);
        writeln!(writer, "{line}").map_err(access)?;
        writer.flush().map_err(access)?;

        debug!(family = %self.family, path = %self.path.display(), "appended merged line");
        Ok(())
    }
}

/// The merged outputs of every family under one home directory.
#[derive(Clone, Debug)]
pub struct MergedOutputs {
    mh: MergedOutput,
    mss: MergedOutput,
}

impl MergedOutputs {
    /// Outputs at `<home>/logs/<family>_merged.txt`.
    pub fn under(home: &Path) -> Self {
        let logs = home.join(LOGS_DIR);
        let make = |family: LogFamily| MergedOutput::new(family, logs.join(family.output_file_name()));
        Self {
            mh: make(LogFamily::Mh),
            mss: make(LogFamily::Mss),
        }
    }

    pub fn for_family(&self, family: LogFamily) -> &MergedOutput {
        match family {
            LogFamily::Mh => &self.mh,
            LogFamily::Mss => &self.mss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_follow_home_layout() {
        let outputs = MergedOutputs::under(Path::new("/home/u/.sinalgo"));
        assert_eq!(
            outputs.for_family(LogFamily::Mh).path(),
            Path::new("/home/u/.sinalgo/logs/mh_merged.txt")
        );
        assert_eq!(
            outputs.for_family(LogFamily::Mss).path(),
            Path::new("/home/u/.sinalgo/logs/mss_merged.txt")
        );
    }

    #[test]
    fn append_creates_and_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let outputs = MergedOutputs::under(dir.path());
        let mh = outputs.for_family(LogFamily::Mh);

        mh.append_line("nodeA 200").unwrap();
        mh.append_line("nodeB 150").unwrap();

        let content = fs::read_to_string(mh.path()).unwrap();
        assert_eq!(content, "nodeA 200\nnodeB 150\n");
        assert!(!outputs.for_family(LogFamily::Mss).path().exists());
    }

    #[test]
    fn append_preserves_existing_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mss_merged.txt");
        fs::write(&path, "old 1 1\n").unwrap();

        MergedOutput::new(LogFamily::Mss, &path)
            .append_line("new 2 2")
            .unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "old 1 1\nnew 2 2\n");
    }

    #[test]
    fn append_into_unwritable_location_fails() {
        let dir = tempfile::tempdir().unwrap();
        // A regular file where the logs directory should be.
        let blocker = dir.path().join(LOGS_DIR);
        fs::write(&blocker, "").unwrap();

        let err = MergedOutputs::under(dir.path())
            .for_family(LogFamily::Mh)
            .append_line("x 1")
            .unwrap_err();
        assert!(matches!(err, MergeError::FileAccess { .. }));
    }
}
