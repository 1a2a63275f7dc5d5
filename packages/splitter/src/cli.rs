//! Command-line interface for the splitter.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::config::SplitConfig;
use crate::error::Result;
use crate::naming::NamingStrategy;
use crate::splitter::XmlSplitter;

/// XML Splitter - split a large XML file into one file per element.
#[derive(Parser)]
#[command(name = "xml-splitter")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split an XML file on every occurrence of a tag.
    Split {
        /// The XML file to split
        file: PathBuf,

        /// Tag to split on (exact, case-sensitive)
        tag: String,

        /// Name each file after the text of this child tag
        #[arg(short = 't', long)]
        name_by_tag_value: Option<String>,

        /// Name each file after this attribute (of the child tag, if given)
        #[arg(short = 'a', long)]
        name_by_attribute_value: Option<String>,

        /// Output directory (default: <temp>/xml_splitter_output/<file name>)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Split {
            file,
            tag,
            name_by_tag_value,
            name_by_attribute_value,
            output,
        } => {
            let config = build_config(file, tag, name_by_tag_value, name_by_attribute_value, output)?;
            split_command(config)
        }
    }
}

/// Turn the parsed arguments into a run configuration.
fn build_config(
    file: PathBuf,
    tag: String,
    name_by_tag_value: Option<String>,
    name_by_attribute_value: Option<String>,
    output: Option<PathBuf>,
) -> Result<SplitConfig> {
    let naming = NamingStrategy::from_options(name_by_tag_value, name_by_attribute_value)?;
    let config = SplitConfig::new(file, tag)?.with_naming(naming);

    Ok(match output {
        Some(dir) => config.with_output_dir(dir),
        None => config,
    })
}

/// Execute the split command.
fn split_command(config: SplitConfig) -> Result<()> {
    println!(
        "{} {} on <{}>",
        style("Splitting").bold(),
        style(config.source.display()).cyan(),
        style(&config.tag).green()
    );
    println!("  Naming: {}", config.naming);
    println!();

    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message("Splitting...");
    pb.enable_steady_tick(std::time::Duration::from_millis(100));

    let report = match XmlSplitter::new(config).split() {
        Ok(report) => report,
        Err(e) => {
            pb.finish_and_clear();
            return Err(e);
        }
    };

    pb.finish_and_clear();

    println!("  Files: {}", report.matches());
    if report.overwritten > 0 {
        println!(
            "  Overwritten: {}",
            style(report.overwritten).yellow().bold()
        );
    }
    println!();
    println!(
        "{} {}",
        style("Saved to:").green().bold(),
        report.output_dir.display()
    );

    Ok(())
}
