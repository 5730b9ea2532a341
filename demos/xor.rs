use ferrite_graph::{Example, NetworkBuilder, StopOnError, EpochLimit, TrainConfig, Trainer};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut network = NetworkBuilder::new()
        .inputs(["a", "b"])
        .hidden_layer(2)
        .output("y")
        .seed(7)
        .build()
        .expect("valid topology");

    let examples = vec![
        Example::from_pairs(&[("a", 1.0), ("b", 0.0)], &[("y", 1.0)]),
        Example::from_pairs(&[("a", 1.0), ("b", 1.0)], &[("y", 0.0)]),
        Example::from_pairs(&[("a", 0.0), ("b", 1.0)], &[("y", 1.0)]),
        Example::from_pairs(&[("a", 0.0), ("b", 0.0)], &[("y", 0.0)]),
    ];

    let (tx, rx) = std::sync::mpsc::channel();
    let mut config = TrainConfig::new(0.5, 0.9)
        .with_epoch_size(examples.len())
        .with_seed(7);
    config.progress_tx = Some(tx);

    let printer = std::thread::spawn(move || {
        for stats in rx {
            if stats.epoch % 1000 == 0 {
                println!("Epoch {}: MSE = {:.6}", stats.epoch, stats.errors["MSE"]);
            }
        }
    });

    let mut trainer = Trainer::new(config);
    trainer.add_observer(StopOnError::new("MSE", 0.001));
    trainer.add_observer(EpochLimit(20_000));
    let epochs = trainer.train(&mut network, &examples).expect("training failed");
    drop(trainer);
    printer.join().expect("printer thread panicked");

    println!("Trained for {epochs} epochs");
    for example in &examples {
        let output = network.forward(&example.inputs).expect("forward pass");
        println!("Input: {:?} -> Output: {:.4}", example.inputs, output["y"]);
    }
}
