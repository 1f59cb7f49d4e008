//! Settings layout inspector.
//!
//! Builds a settings group through a fresh catalog and prints its byte
//! layout, numbered predicates and the catalog statistics.

use clap::Parser;
use codegen_meta::core::{Catalog, MetaResult};
use codegen_meta::settings::{shared, SettingGroup};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings group to build
    #[arg(long, default_value = shared::GROUP_NAME)]
    group: String,

    /// Print the default settings bytes
    #[arg(long)]
    defaults: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn build(catalog: &mut Catalog, name: &str) -> MetaResult<Option<SettingGroup>> {
    match name {
        shared::GROUP_NAME => shared::define(catalog).map(Some),
        _ => Ok(None),
    }
}

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let mut catalog = Catalog::new();
    let group = match build(&mut catalog, &args.group) {
        Ok(Some(group)) => group,
        Ok(None) => {
            eprintln!("Error: unknown settings group '{}'", args.group);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Error [{}]: {}", e.category(), e);
            std::process::exit(1);
        }
    };

    print!("{}", group);
    if args.defaults {
        let bytes: Vec<String> = group
            .default_bytes()
            .iter()
            .map(|b| format!("0x{:02x}", b))
            .collect();
        println!("Default bytes: [{}]", bytes.join(", "));
    }
    println!();
    print!("{}", catalog.stats());
}
