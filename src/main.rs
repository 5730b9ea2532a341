//! Trains a small named-node network on XOR and prints what it learned.
//!
//! Topology and training parameters can be read from JSON files; command
//! line flags override the corresponding values.

use std::cell::RefCell;
use std::path::PathBuf;
use std::rc::Rc;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;

use ferrite_graph::{
    EpochLimit, Example, Network, NetworkBuilder, Pocket, StopOnError, TrainConfig, Trainer,
};

#[derive(Parser)]
#[command(name = "ferrite-graph")]
#[command(about = "Train a feed-forward network on XOR", long_about = None)]
struct Cli {
    /// JSON file holding a TrainConfig
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON file holding a NetworkBuilder (defaults to a 2-2-1 XOR network)
    #[arg(short, long)]
    topology: Option<PathBuf>,

    /// Hidden layer size; may be repeated
    #[arg(long)]
    hidden: Vec<usize>,

    /// Seed for weight initialisation and example sampling
    #[arg(short, long)]
    seed: Option<u64>,

    /// Maximum number of epochs
    #[arg(long)]
    hard_max: Option<usize>,

    /// Stop once MSE falls below this value
    #[arg(long, default_value_t = 0.01)]
    threshold: f64,

    /// Write the best network found to this JSON file
    #[arg(long)]
    save: Option<PathBuf>,

    /// Log filter used when RUST_LOG is not set
    #[arg(short, long, default_value = "info")]
    log_level: String,
}

fn xor_examples() -> Vec<Example> {
    [(0.0, 0.0, 0.0), (0.0, 1.0, 1.0), (1.0, 0.0, 1.0), (1.0, 1.0, 0.0)]
        .iter()
        .map(|&(a, b, y)| Example::from_pairs(&[("a", a), ("b", b)], &[("y", y)]))
        .collect()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&cli.log_level))
        .init();

    let mut config = match cli.config {
        Some(ref path) => TrainConfig::load_json(path)
            .with_context(|| format!("reading training config {}", path.display()))?,
        None => TrainConfig::new(0.5, 0.9),
    };
    let mut builder = match cli.topology {
        Some(ref path) => NetworkBuilder::load_json(path)
            .with_context(|| format!("reading topology {}", path.display()))?,
        None => NetworkBuilder::new().inputs(["a", "b"]).output("y").hidden_layer(2),
    };
    if !cli.hidden.is_empty() {
        builder.hidden_layers = cli.hidden.clone();
    }
    if let Some(seed) = cli.seed {
        builder.seed = Some(seed);
        config.seed = Some(seed);
    }
    if let Some(hard_max) = cli.hard_max {
        config.hard_max = hard_max;
    }

    let mut network = builder.build().context("building network")?;
    info!(
        "network has {} nodes and {} edges",
        network.node_count(),
        network.edge_count()
    );

    let examples = xor_examples();
    let pocket = Rc::new(RefCell::new(Pocket::new("MSE")));
    let hard_max = config.hard_max;
    let mut trainer = Trainer::new(config);
    trainer.add_observer(EpochLimit(hard_max));
    trainer.add_observer(StopOnError::new("MSE", cli.threshold));
    trainer.add_observer(Rc::clone(&pocket));

    let epochs = trainer.train(&mut network, examples.as_slice()).context("training")?;
    info!(
        "stopped after {} epochs; best MSE {} at epoch {:?}",
        epochs,
        pocket.borrow().last_update_error(),
        pocket.borrow().last_update_epoch()
    );

    for example in &examples {
        let outputs = network.forward(&example.inputs)?;
        println!("{:?} -> {:.4}", example.inputs, outputs["y"]);
    }

    if let Some(ref path) = cli.save {
        let best: Network = pocket.borrow_mut().take().unwrap_or(network);
        best.save_json(path)
            .with_context(|| format!("writing network {}", path.display()))?;
        info!("saved network to {}", path.display());
    }
    Ok(())
}
