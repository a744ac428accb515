//! abiscope CLI: build signature registries and decode transactions.
//!
//! # Commands
//! ```text
//! abiscope build       --corpus <dir> --out <registry.json>
//! abiscope decode-call --calldata <hex> (--corpus <dir> | --registry <file>)
//! abiscope decode-log  --topics <hex...> --data <hex> (--corpus <dir> | --registry <file>)
//! abiscope lookup      <selector|topic> (--corpus <dir> | --registry <file>)
//! abiscope info
//! ```

use abiscope_core::RawLog;
use abiscope_evm::EvmDecoder;
use abiscope_observability::init_tracing;
use abiscope_registry::{RegistryBuilder, SignatureRegistry};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

mod cmd_build;
mod cmd_lookup;
mod config;
mod output;

use config::AppConfig;

#[derive(Parser)]
#[command(
    name = "abiscope",
    about = "Decode Ethereum call data and event logs against a library of interface definitions",
    long_about = "
abiscope compiles a directory of ABI JSON documents into a signature registry
(selector -> function, topic -> event variants) and decodes raw call data and
event logs against it.

ENVIRONMENT VARIABLES:
  RUST_LOG    Log filter directives (overrides --verbose and the config file)
",
    version
)]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Where the registry comes from.
#[derive(Args, Debug)]
struct RegistrySource {
    /// Directory of ABI JSON documents to build the registry from
    #[arg(long, conflicts_with = "registry")]
    corpus: Option<PathBuf>,
    /// Prebuilt registry artifact (see `abiscope build`)
    #[arg(long)]
    registry: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a registry from a corpus and save it as a JSON artifact
    Build {
        /// Directory of ABI JSON documents
        #[arg(long)]
        corpus: Option<PathBuf>,
        /// Artifact output path
        #[arg(long)]
        out: PathBuf,
        /// Print the build report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode transaction call data
    #[command(name = "decode-call")]
    DecodeCall {
        /// Raw call data (0x-prefixed hex)
        #[arg(long)]
        calldata: String,
        #[command(flatten)]
        source: RegistrySource,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Decode an event log from raw topics + data
    #[command(name = "decode-log")]
    DecodeLog {
        /// topics[0] = event signature hash, topics[1..] = indexed params
        #[arg(long, num_args = 1.., required = true)]
        topics: Vec<String>,
        /// Non-indexed params (hex, 0x-prefixed)
        #[arg(long, default_value = "0x")]
        data: String,
        #[command(flatten)]
        source: RegistrySource,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the signatures registered for a selector or topic
    Lookup {
        /// 4-byte selector or 32-byte topic, hex
        id: String,
        #[command(flatten)]
        source: RegistrySource,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show build and capability info
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?.with_log_flags(cli.verbose, cli.json_logs);
    init_tracing(&config.log);

    match cli.command {
        Commands::Build { corpus, out, json } => {
            let corpus = corpus
                .or_else(|| config.corpus_dir.clone())
                .ok_or_else(|| anyhow!("no corpus directory: pass --corpus or set corpus_dir"))?;
            cmd_build::run(&config, &corpus, &out, json)
        }

        Commands::DecodeCall { calldata, source, json } => {
            cmd_decode_call(&config, &calldata, &source, json)
        }

        Commands::DecodeLog { topics, data, source, json } => {
            cmd_decode_log(&config, topics, data, &source, json)
        }

        Commands::Lookup { id, source, json } => {
            let registry = load_registry(&config, &source)?;
            cmd_lookup::run(&registry, &id, json)
        }

        Commands::Info => cmd_info(),
    }
}

/// Resolve the registry: flags first, then the config file. An artifact is
/// preferred over a corpus when both are configured.
fn load_registry(config: &AppConfig, source: &RegistrySource) -> Result<SignatureRegistry> {
    let (artifact, corpus) = match (&source.registry, &source.corpus) {
        (None, None) => (config.artifact.clone(), config.corpus_dir.clone()),
        (artifact, corpus) => (artifact.clone(), corpus.clone()),
    };

    if let Some(path) = artifact {
        let registry = SignatureRegistry::load_json(&path)
            .with_context(|| format!("load registry artifact '{}'", path.display()))?;
        info!(path = %path.display(), "registry artifact loaded");
        return Ok(registry);
    }
    if let Some(dir) = corpus {
        let mut builder = RegistryBuilder::with_config(config.builder.clone());
        builder
            .load_directory(&dir)
            .with_context(|| format!("load corpus '{}'", dir.display()))?;
        let registry = builder.build();
        if registry.is_empty() {
            bail!("no functions or events found in '{}'", dir.display());
        }
        return Ok(registry);
    }
    bail!("no registry: pass --corpus <dir> or --registry <file>, or set one in --config")
}

// ─── Command implementations ─────────────────────────────────────────────────

fn cmd_decode_call(
    config: &AppConfig,
    calldata: &str,
    source: &RegistrySource,
    as_json: bool,
) -> Result<()> {
    let registry = load_registry(config, source)?;
    let decoder = EvmDecoder::with_config(config.decoder);

    let decoded = decoder
        .decode_function_input(&registry, calldata)
        .ok_or_else(|| {
            let selector = calldata
                .trim()
                .trim_start_matches("0x")
                .get(..8)
                .unwrap_or("");
            anyhow!("no function registered for selector 0x{selector}")
        })?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        print!("{}", output::render_call(&decoded));
    }
    Ok(())
}

fn cmd_decode_log(
    config: &AppConfig,
    topics: Vec<String>,
    data: String,
    source: &RegistrySource,
    as_json: bool,
) -> Result<()> {
    let registry = load_registry(config, source)?;
    let decoder = EvmDecoder::with_config(config.decoder);

    let raw = RawLog::new(topics, data);
    let decoded = decoder.decode_event_log(&registry, &raw).ok_or_else(|| {
        anyhow!(
            "no event registered for topic {}",
            raw.signature_topic().unwrap_or("<none>")
        )
    })?;

    if as_json {
        println!("{}", serde_json::to_string_pretty(&decoded)?);
    } else {
        print!("{}", output::render_log(&decoded));
    }
    Ok(())
}

fn cmd_info() -> Result<()> {
    println!("abiscope v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("Capabilities:");
    println!("  ✓ Signature registry       (selector → function, topic → event variants)");
    println!("  ✓ Corpus formats           (bare ABI arrays, compiler artifacts with `abi`)");
    println!("  ✓ Call data decoding       (head/tail layout, nested tuples and arrays)");
    println!("  ✓ Event log decoding       (indexed topics + data, variant selection)");
    println!("  ✓ Registry artifacts       (versioned JSON)");
    println!("  ✓ Parallel batch decode    (Rayon)");
    println!();
    println!("Types: address, bool, uintN, intN, bytesN, bytes, string, function,");
    println!("       T[], T[k], tuples (any nesting)");
    Ok(())
}
