//! XML Splitter - split a large XML document into one file per element.
//!
//! The document is read as a stream. Each occurrence of the target element is
//! materialized on its own, named by a [`NamingStrategy`] and written as a
//! standalone XML file, so memory use is bounded by the largest occurrence
//! rather than by the document.
//!
//! # Example
//!
//! ```
//! use xml_splitter::naming::{resolve_name, FileCounter, NamingStrategy};
//! use xml_splitter::xml::Element;
//!
//! let item = Element::parse_str("<item><id>a</id></item>").unwrap();
//! let strategy = NamingStrategy::ByChildText("id".into());
//! assert_eq!(resolve_name(&item, &strategy, &mut FileCounter::new()).unwrap(), "a");
//! ```
//!
//! # Architecture
//!
//! - [`config`]: Constants, validation and the run configuration
//! - [`error`]: Error types and Result alias
//! - [`xml`]: Extracted element tree and its serialization
//! - [`stream`]: Source stream, tag locator and subtree extractor
//! - [`naming`]: Naming strategies and the file counter
//! - [`output`]: Output directory and file writing
//! - [`splitter`]: The split run
//! - [`cli`]: Command-line interface

pub mod cli;
pub mod config;
pub mod error;
pub mod naming;
pub mod output;
pub mod splitter;
pub mod stream;
pub mod xml;

// Re-export commonly used items
pub use config::SplitConfig;
pub use error::{Result, SplitterError};
pub use naming::NamingStrategy;
pub use splitter::{RunState, SplitReport, XmlSplitter};
