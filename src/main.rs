use std::error::Error;
use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lodestone_registry::{BlockStateRegistry, RegistryConfig, initialize};
use lodestone_state::BlockState;

#[derive(Parser)]
#[command(name = "lodestone", about = "Inspect and export the block-state palette")]
struct Cli {
    /// Registry config (TOML); defaults to the embedded datasets
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Block catalog (TOML); overrides the config's catalog
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print palette and index statistics
    Info,
    /// Resolve a block state to its runtime id and palette entry
    Lookup {
        /// Numeric block id
        #[arg(long)]
        id: u32,
        /// Raw data storage, used when no --prop is given
        #[arg(long, default_value_t = 0)]
        meta: u64,
        /// Property assignment `name=value`, repeatable
        #[arg(long = "prop", value_name = "NAME=VALUE")]
        props: Vec<String>,
    },
    /// List persistence names by block id
    Names,
    /// Write the serialized palette blob
    Export {
        /// Output file
        #[arg(long, short)]
        out: PathBuf,
    },
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => RegistryConfig::from_path(path)?,
        None => RegistryConfig::default(),
    };
    if cli.catalog.is_some() {
        config.catalog = cli.catalog.clone();
    }
    let registry = initialize(&config)?;

    match cli.command {
        Command::Info => print_info(registry),
        Command::Lookup { id, meta, props } => {
            let state = if props.is_empty() {
                BlockState::with_meta(id, meta)
            } else {
                let mut state = registry.create_mutable_state(id);
                for assignment in &props {
                    let (name, value) = assignment
                        .split_once('=')
                        .ok_or_else(|| format!("expected NAME=VALUE, got `{assignment}`"))?;
                    state.set_property(name.trim(), value.trim())?;
                }
                state.freeze()
            };
            let registration = registry.registration_of(state);
            println!("state       {state}");
            println!("runtime id  {}", registration.runtime_id);
            if registration.runtime_id == registry.placeholder_runtime_id() {
                println!("            (placeholder)");
            }
            println!("entry       {}", registration.original);
        }
        Command::Names => {
            for (id, name) in registry.persistence_names() {
                println!("{id:>6}  {name}");
            }
        }
        Command::Export { out } => {
            if let Some(parent) = out.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            let blob = registry.blob();
            fs::write(&out, blob.as_bytes())?;
            println!(
                "wrote {} bytes to {} (fingerprint {:08x})",
                blob.len(),
                out.display(),
                blob.fingerprint()
            );
        }
    }
    Ok(())
}

fn print_info(registry: &BlockStateRegistry) {
    let stats = registry.stats();
    let blob = registry.blob();
    println!("palette entries   {}", stats.palette_entries);
    println!("placeholder       {}", registry.placeholder_runtime_id());
    println!("legacy states     {}", stats.cached_states);
    println!("descriptors       {}", stats.originals);
    println!("pending state ids {}", stats.state_id_entries);
    println!("persistence names {}", stats.persistence_names);
    println!("catalog blocks    {}", registry.catalog().len());
    println!("blob              {} bytes, fingerprint {:08x}", blob.len(), blob.fingerprint());
}
