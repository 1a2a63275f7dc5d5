//! The split run: validate, stream, extract, name, write.

use std::path::PathBuf;

use crate::config::SplitConfig;
use crate::error::{Result, SplitterError};
use crate::naming::{resolve_name, FileCounter};
use crate::output::OutputWriter;
use crate::stream::{extract, Located, SourceStream, TagLocator};
use crate::xml::Element;

/// Lifecycle of a split run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Created, [`XmlSplitter::split`] not called yet.
    Unstarted,
    /// Checking the source and preparing the output directory.
    Validating,
    /// Reading the source and writing one file per match.
    Streaming,
    /// Every match was written.
    Done,
    /// The run stopped at an error; earlier files stay on disk.
    Failed,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitReport {
    /// Directory the files were written to.
    pub output_dir: PathBuf,

    /// Every written path, in the order written. A path repeats when a later
    /// match overwrote it.
    pub files: Vec<PathBuf>,

    /// Number of writes that replaced an output of the same run.
    pub overwritten: usize,
}

impl SplitReport {
    /// Number of matches written.
    pub fn matches(&self) -> usize {
        self.files.len()
    }
}

/// Splits one document into one file per occurrence of the target tag.
///
/// A splitter performs a single run: [`XmlSplitter::split`] consumes it.
///
/// # Example
///
/// ```no_run
/// use xml_splitter::{NamingStrategy, SplitConfig, XmlSplitter};
///
/// let config = SplitConfig::new("catalog.xml", "product")?
///     .with_naming(NamingStrategy::ByAttribute("sku".into()))
///     .with_output_dir("out");
/// let report = XmlSplitter::new(config).split()?;
/// println!("{} files", report.matches());
/// # Ok::<(), xml_splitter::SplitterError>(())
/// ```
#[derive(Debug)]
pub struct XmlSplitter {
    config: SplitConfig,
    state: RunState,
}

impl XmlSplitter {
    /// Create a splitter for `config`. Nothing is read or written yet.
    #[must_use]
    pub fn new(config: SplitConfig) -> Self {
        Self {
            config,
            state: RunState::Unstarted,
        }
    }

    /// The configuration this splitter runs with.
    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run the split.
    ///
    /// Matches are written in document order. A match nested inside another
    /// match is written right after its enclosing match. Every file carries
    /// the namespace declarations its match inherits from the source. The
    /// first error ends the run; files written before it stay on disk.
    ///
    /// # Errors
    /// - `SplitterError::SourceNotFound` before anything is created on disk
    /// - `SplitterError::OutputDirectory` if the output directory cannot be created
    /// - `SplitterError::MalformedInput` / `SplitterError::UnexpectedEof` for broken XML
    /// - `SplitterError::NameResolution` if a match lacks the naming child or attribute
    /// - `SplitterError::OutputNameOutsideDir` if a derived name contains `..`
    /// - `SplitterError::Io` if reading the source or writing a file fails
    #[tracing::instrument(skip(self), fields(source = %self.config.source.display(), tag = %self.config.tag))]
    pub fn split(mut self) -> Result<SplitReport> {
        self.transition(RunState::Validating);
        let result = self.run();
        match &result {
            Ok(report) => {
                self.transition(RunState::Done);
                tracing::info!(
                    files = report.matches(),
                    overwritten = report.overwritten,
                    output_dir = %report.output_dir.display(),
                    "split finished"
                );
            }
            Err(e) => {
                self.transition(RunState::Failed);
                tracing::debug!(error = %e, "split failed");
            }
        }
        result
    }

    fn transition(&mut self, next: RunState) {
        tracing::debug!(from = ?self.state, to = ?next, "state transition");
        self.state = next;
    }

    fn run(&mut self) -> Result<SplitReport> {
        if !self.config.source.exists() {
            return Err(SplitterError::SourceNotFound(self.config.source.clone()));
        }

        let mut sink = Sink {
            writer: OutputWriter::new(&self.config.output_dir),
            counter: FileCounter::new(),
            files: Vec::new(),
        };
        sink.writer.ensure_dir()?;
        let mut stream = SourceStream::open(&self.config.source)?;

        self.transition(RunState::Streaming);
        tracing::info!(naming = %self.config.naming, "splitting");

        let locator = TagLocator::new(self.config.tag.as_str());
        while let Located::Found(matched) = locator.locate_next(&mut stream)? {
            let element = extract(&mut stream, matched)?;
            sink.emit(&element, &self.config)?;

            for nested in element.detached_descendants_named(&self.config.tag) {
                sink.emit(&nested, &self.config)?;
            }
        }

        Ok(SplitReport {
            output_dir: self.config.output_dir.clone(),
            overwritten: sink.writer.overwritten(),
            files: sink.files,
        })
    }
}

/// Per-run naming and writing state.
struct Sink {
    writer: OutputWriter,
    counter: FileCounter,
    files: Vec<PathBuf>,
}

impl Sink {
    fn emit(&mut self, element: &Element, config: &SplitConfig) -> Result<()> {
        let name = resolve_name(element, &config.naming, &mut self.counter)?;
        let path = self.writer.write(element, &name)?;
        self.files.push(path);
        Ok(())
    }
}
