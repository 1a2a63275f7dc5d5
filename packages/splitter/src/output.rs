//! Writing extracted elements to the output directory.

use std::collections::HashSet;
use std::fs::{self, DirBuilder, File};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::config::OUTPUT_EXTENSION;
use crate::error::{Result, SplitterError};
use crate::xml::Element;

/// Writes one file per element into a directory.
///
/// An existing file with the same name is replaced. Names repeated within a
/// run are counted and logged, but still overwrite: the last write wins.
#[derive(Debug)]
pub struct OutputWriter {
    dir: PathBuf,
    dir_ready: bool,
    written: HashSet<PathBuf>,
    overwritten: usize,
}

impl OutputWriter {
    /// Create a writer for `dir`. Nothing is touched on disk yet.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            dir_ready: false,
            written: HashSet::new(),
            overwritten: 0,
        }
    }

    /// Directory the files are written to.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of writes that replaced a file written earlier by this writer.
    pub fn overwritten(&self) -> usize {
        self.overwritten
    }

    /// Create the output directory and its parents if needed.
    ///
    /// Only the first call touches the filesystem.
    ///
    /// # Errors
    /// Returns `SplitterError::OutputDirectory` if the directory cannot be created.
    pub fn ensure_dir(&mut self) -> Result<()> {
        if self.dir_ready {
            return Ok(());
        }

        let mut builder = DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::DirBuilderExt;
            builder.mode(0o755);
        }

        builder
            .create(&self.dir)
            .map_err(|source| SplitterError::OutputDirectory {
                path: self.dir.clone(),
                source,
            })?;

        tracing::debug!(dir = %self.dir.display(), "output directory ready");
        self.dir_ready = true;
        Ok(())
    }

    /// Path of the output file for `base_name`, always below the directory.
    ///
    /// The name is appended as text: a leading `/` or drive prefix does not
    /// replace the directory, and separators inside the name lead into
    /// subdirectories.
    ///
    /// # Errors
    /// Returns `SplitterError::OutputNameOutsideDir` if the name contains a
    /// `..` component.
    pub fn output_path(&self, base_name: &str) -> Result<PathBuf> {
        let file_name = format!("{base_name}.{OUTPUT_EXTENSION}");
        let mut path = self.dir.clone();
        for component in Path::new(&file_name).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::ParentDir => {
                    return Err(SplitterError::OutputNameOutsideDir(base_name.to_string()))
                }
                Component::RootDir | Component::Prefix(_) | Component::CurDir => {}
            }
        }
        Ok(path)
    }

    /// Serialize `element` to `<dir>/<base_name>.xml`.
    ///
    /// The content goes to a hidden temporary file next to the target first
    /// and is then renamed into place. Subdirectories named by the base name
    /// are created as needed.
    ///
    /// # Errors
    /// Returns `SplitterError::OutputDirectory` if the directory cannot be
    /// created, `SplitterError::OutputNameOutsideDir` for a name that would
    /// leave it and `SplitterError::Io` if the file cannot be written.
    pub fn write(&mut self, element: &Element, base_name: &str) -> Result<PathBuf> {
        self.ensure_dir()?;

        let output_file = self.output_path(base_name)?;
        if let Some(parent) = output_file.parent() {
            if parent != self.dir {
                fs::create_dir_all(parent)?;
            }
        }

        let file_name = format!("{base_name}.{OUTPUT_EXTENSION}");
        let temp_file = output_file.with_file_name(format!(
            ".{}.tmp",
            output_file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or(file_name)
        ));

        let content = element.to_document()?;
        {
            let mut file = File::create(&temp_file)?;
            file.write_all(&content)?;
            file.sync_all()?;
        }

        // On Windows, rename fails if the destination already exists
        #[cfg(target_os = "windows")]
        if output_file.exists() {
            fs::remove_file(&output_file)?;
        }

        fs::rename(&temp_file, &output_file)?;

        if !self.written.insert(output_file.clone()) {
            self.overwritten += 1;
            tracing::warn!(
                file = %output_file.display(),
                "name already used in this run, overwriting earlier output"
            );
        }
        tracing::debug!(file = %output_file.display(), bytes = content.len(), "wrote output file");

        Ok(output_file)
    }
}
