use std::path::PathBuf;

use clap::Parser;
use ros_z_params::{Builder, ParamParser, ParserBuilder, ParserConfig};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "ros-z-params")]
#[command(about = "Parse ROS 2 parameter files and dump the result")]
struct Cli {
    /// Parameter files, applied in order
    #[arg(required = true, value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Only print the parameters that apply to this fully qualified node
    #[arg(long, value_name = "FQN")]
    node: Option<String>,

    /// Print JSON instead of the table dump
    #[arg(long)]
    json: bool,

    /// Maximum number of parameters per node
    #[arg(long)]
    max_params: Option<usize>,

    /// JSON parser configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Extra value applied after the files, as NODE:PARAM:=YAML
    #[arg(long = "value", value_name = "NODE:PARAM:=YAML")]
    values: Vec<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logger(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("ros_z_params=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact().with_writer(std::io::stderr))
        .init();
}

fn split_value_arg(arg: &str) -> Option<(&str, &str, &str)> {
    let (target, value) = arg.split_once(":=")?;
    let (node, param) = target.rsplit_once(':')?;
    Some((node, param, value))
}

fn load_config(cli: &Cli) -> Result<ParserConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read config {}: {}", path.display(), e))?;
            serde_json::from_str(&text)?
        }
        None => ParserConfig::default(),
    };
    if let Some(max) = cli.max_params {
        config.max_params_per_node = max;
    }
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let config = load_config(&cli)?;
    tracing::debug!(?config, "parser configuration");
    let parser: ParamParser = ParserBuilder::from_config(config).build()?;

    let mut table = parser.new_table()?;
    for file in &cli.files {
        parser.parse_file_into(&mut table, file)?;
        tracing::info!(file = %file.display(), nodes = table.num_nodes(), "applied parameter file");
    }

    for arg in &cli.values {
        let (node, param, value) = split_value_arg(arg)
            .ok_or_else(|| format!("Expected NODE:PARAM:=YAML, got '{}'", arg))?;
        parser.parse_value(&mut table, node, param, value)?;
    }

    match (&cli.node, cli.json) {
        (Some(node), true) => println!("{}", serde_json::to_string_pretty(&table.overrides_for(node))?),
        (Some(node), false) => {
            for (name, value) in table.overrides_for(node) {
                println!("{}: {}", name, value);
            }
        }
        (None, true) => println!("{}", serde_json::to_string_pretty(&table)?),
        (None, false) => print!("{}", table),
    }

    Ok(())
}
