//! xmldict CLI - convert an XML document into a JSON dictionary

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use xmldict::{
    CollisionPolicy, DEFAULT_MAX_DEPTH, DictOptions, Error, FieldSet, ParseOptions, SourceKind,
    XmlDocument,
};

#[derive(Parser, Debug)]
#[command(name = "xmldict")]
#[command(about = "Convert an XML document into a JSON dictionary", long_about = None)]
#[command(version)]
struct Cli {
    /// XML file path, or XML text with `--source-kind string`. Reads XML text
    /// from stdin when omitted.
    input: Option<String>,

    /// How INPUT is interpreted: `file` or `string`
    #[arg(short = 'k', long, default_value = "file")]
    source_kind: SourceKind,

    /// Fields copied onto every element (tag, attrib, text, tail, all)
    #[arg(short = 'c', long, value_delimiter = ',')]
    contains: Vec<String>,

    /// Remove tabs and newlines from element text
    #[arg(long)]
    normalize_text: bool,

    /// Collect repeated siblings into one flat list instead of nested pairs
    #[arg(long)]
    flatten: bool,

    /// Drop whitespace between adjacent tags before parsing
    #[arg(long)]
    strip_indentation: bool,

    /// Deepest element nesting accepted
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// TOML file with dictionary options (contains, normalize_text, collision)
    #[arg(long)]
    options: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,
}

impl Cli {
    /// Dictionary options: the options file first, then flags on top.
    fn dict_options(&self) -> Result<DictOptions> {
        let mut options = match &self.options {
            Some(path) => {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read options file {}", path.display()))?;
                toml::from_str(&text)
                    .with_context(|| format!("Invalid options file {}", path.display()))?
            }
            None => DictOptions::default(),
        };

        if !self.contains.is_empty() {
            options.contains = FieldSet::from_tokens(&self.contains)?;
        }
        if self.normalize_text {
            options.normalize_text = true;
        }
        if self.flatten {
            options.collision = CollisionPolicy::Flatten;
        }
        Ok(options)
    }

    fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strip_indentation: self.strip_indentation,
            max_depth: self.max_depth,
        }
    }
}

/// Where the XML comes from: a name for error reports plus the facade input.
fn resolve_input(cli: &Cli) -> Result<(String, String, SourceKind)> {
    match &cli.input {
        Some(input) => {
            let name = match cli.source_kind {
                SourceKind::File => input.clone(),
                SourceKind::String => "<input>".to_string(),
            };
            Ok((name, input.clone(), cli.source_kind))
        }
        None => {
            let mut xml = String::new();
            std::io::stdin()
                .read_to_string(&mut xml)
                .context("Failed to read XML from stdin")?;
            Ok(("<stdin>".to_string(), xml, SourceKind::String))
        }
    }
}

/// The text positions in a tree error refer to.
fn error_source(data: &str, kind: SourceKind, options: &ParseOptions) -> Option<String> {
    let xml = match kind {
        SourceKind::String => data.to_string(),
        SourceKind::File => std::fs::read_to_string(data).ok()?,
    };
    if options.strip_indentation {
        Some(xmldict::strip_indentation(&xml).into_owned())
    } else {
        Some(xml)
    }
}

/// Convert and print. Returns `false` when the document could not be parsed.
fn run(cli: &Cli) -> Result<bool> {
    let dict_options = cli.dict_options()?;
    let parse_options = cli.parse_options();
    let (name, data, kind) = resolve_input(cli)?;

    tracing::debug!(source = %name, kind = %kind, "Converting");

    let document = match XmlDocument::parse_with_options(&data, kind, &parse_options) {
        Ok(document) => document,
        Err(err @ (Error::MalformedDocument(_) | Error::StructureTooDeep { .. })) => {
            match error_source(&data, kind, &parse_options) {
                Some(source) => eprint!("{}", err.render(&name, &source)),
                None => eprintln!("Error: {}", err),
            }
            return Ok(false);
        }
        Err(err) => return Err(err.into()),
    };

    let dictionary = document.dictionary_with(&dict_options);
    let json = if cli.pretty {
        serde_json::to_string_pretty(dictionary)?
    } else {
        serde_json::to_string(dictionary)?
    };
    println!("{}", json);

    tracing::info!(
        source = %name,
        elements = document.root().element_count(),
        "Converted"
    );
    Ok(true)
}

fn main() -> Result<ExitCode> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "xmldict=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    Ok(if run(&cli)? {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
