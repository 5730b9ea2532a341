use approx::assert_abs_diff_eq;
use ferrite_graph::{Network, NetworkBuilder, TraversalOrder, Values};

fn values(pairs: &[(&str, f64)]) -> Values {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

fn deep_network(seed: u64) -> Network {
    NetworkBuilder::new()
        .inputs(["a", "b", "c"])
        .hidden_layer(4)
        .hidden_layer(3)
        .outputs(["y", "z"])
        .seed(seed)
        .build()
        .unwrap()
}

fn half_error(net: &mut Network, inputs: &Values, expected: &Values) -> f64 {
    let actual = net.forward(inputs).unwrap();
    net.reset_tick();
    expected.iter().map(|(k, e)| 0.5 * (e - actual[k]).powi(2)).sum()
}

#[test]
fn single_layer_sigmoid_output() {
    let mut net = Network::with_seed(1);
    net.add_input_node("x1").unwrap();
    net.add_input_node("x2").unwrap();
    net.add_output_node("y").unwrap();
    net.connect("x1", "y").unwrap();
    net.connect("x2", "y").unwrap();
    // bias, x1, x2
    net.set_weights("y", &[0.5, 0.5, 0.5]).unwrap();

    let out = net.forward(&values(&[("x1", 0.0), ("x2", 0.0)])).unwrap();

    assert_eq!(out.len(), 1);
    assert_abs_diff_eq!(out["y"], 0.622_459_3, epsilon = 1e-6);
    assert_abs_diff_eq!(net.node("y").unwrap().raw_value(), 0.5, epsilon = 1e-12);
}

#[test]
fn every_node_fires_once_per_pass() {
    let mut net = deep_network(3);
    let inputs = values(&[("a", 0.1), ("b", 0.2), ("c", 0.3)]);

    net.forward(&inputs).unwrap();
    assert!(net.nodes().all(|n| n.fire_count() == 1));
    assert!(net.nodes().all(|n| !n.awaiting_inputs()));

    net.reset_tick();
    net.forward(&inputs).unwrap();
    assert!(net.nodes().all(|n| n.fire_count() == 2));
}

#[test]
fn traversal_order_does_not_change_values() {
    let inputs = values(&[("a", 0.9), ("b", -0.4), ("c", 0.25)]);
    let expected = values(&[("y", 1.0), ("z", 0.0)]);

    let mut breadth = deep_network(11);
    let mut depth = breadth.clone();
    depth.set_traversal_order(TraversalOrder::DepthFirst);

    let out_b = breadth.forward(&inputs).unwrap();
    let out_d = depth.forward(&inputs).unwrap();
    assert_eq!(out_b, out_d);

    breadth.backward(&out_b, &expected).unwrap();
    depth.backward(&out_d, &expected).unwrap();
    for (b, d) in breadth.nodes().zip(depth.nodes()) {
        assert_eq!(b.output_value(), d.output_value(), "{}", b.name());
        assert_eq!(
            b.training().partial_derivatives(),
            d.training().partial_derivatives(),
            "{}",
            b.name()
        );
    }
}

#[test]
fn connection_order_does_not_change_values() {
    let hidden = ["h1", "h2"];
    let edges = [
        ("x1", "h1"),
        ("x2", "h1"),
        ("x1", "h2"),
        ("x2", "h2"),
        ("h1", "y"),
        ("h2", "y"),
    ];
    let weight = |src: &str, tgt: &str| -> f64 {
        let i = edges.iter().position(|e| *e == (src, tgt)).map_or(0, |p| p + 1);
        (i as f64) * 0.15 - 0.4
    };

    let build = |order: &[(&str, &str)]| -> Network {
        let mut net = Network::with_seed(0);
        net.add_input_node("x1").unwrap();
        net.add_input_node("x2").unwrap();
        for h in hidden {
            net.add_hidden_node(h).unwrap();
        }
        net.add_output_node("y").unwrap();
        for (s, t) in order {
            net.connect(s, t).unwrap();
        }
        for &h in hidden.iter().chain(["y"].iter()) {
            let sources: Vec<String> =
                net.input_sources(h).unwrap().into_iter().map(String::from).collect();
            for s in sources {
                net.set_edge_weight(&s, h, weight(&s, h)).unwrap();
            }
        }
        net
    };

    let mut forward_order = build(&edges);
    let mut reversed: Vec<_> = edges.to_vec();
    reversed.reverse();
    let mut reverse_order = build(&reversed);

    let inputs = values(&[("x1", 0.7), ("x2", 0.2)]);
    let a = forward_order.forward(&inputs).unwrap();
    let b = reverse_order.forward(&inputs).unwrap();
    assert_abs_diff_eq!(a["y"], b["y"], epsilon = 1e-12);
}

#[test]
fn buffers_stay_aligned_with_edges() {
    let mut net = deep_network(5);
    net.add_hidden_node("extra").unwrap();
    net.connect("a", "extra").unwrap();
    net.connect("extra", "y").unwrap();

    for node in net.nodes() {
        assert_eq!(node.weights().len(), node.input_edges().len(), "{}", node.name());
        assert_eq!(node.inputs().len(), node.input_edges().len(), "{}", node.name());
        assert_eq!(node.feedback().len(), node.output_edges().len(), "{}", node.name());
    }
    for edge in net.edges() {
        let source = net.node_by_id(edge.source).unwrap();
        let target = net.node_by_id(edge.target).unwrap();
        assert_eq!(source.output_edges()[edge.source_slot], edge.id);
        assert_eq!(target.input_edges()[edge.target_slot], edge.id);
    }
}

#[test]
fn partials_match_numerical_gradient() {
    let mut net = deep_network(21);
    let inputs = values(&[("a", 0.3), ("b", 0.8), ("c", -0.5)]);
    let expected = values(&[("y", 1.0), ("z", 0.2)]);

    let actual = net.forward(&inputs).unwrap();
    net.backward(&actual, &expected).unwrap();

    let checked = [("a", "hidden 0.2"), ("hidden 0.1", "hidden 1.0"), ("hidden 1.2", "z"), ("bias", "y")];
    let h = 1e-6;
    for (source, target) in checked {
        let slot = net
            .input_sources(target)
            .unwrap()
            .iter()
            .position(|s| *s == source)
            .unwrap();
        let analytic = net.node(target).unwrap().training().partial_derivatives().unwrap()[slot];

        let w = net.edge_weight(source, target).unwrap();
        let mut nudged = net.clone();
        nudged.set_edge_weight(source, target, w + h).unwrap();
        let up = half_error(&mut nudged, &inputs, &expected);
        nudged.set_edge_weight(source, target, w - h).unwrap();
        let down = half_error(&mut nudged, &inputs, &expected);

        assert_abs_diff_eq!(analytic, (up - down) / (2.0 * h), epsilon = 1e-6);
    }
}

#[test]
fn json_round_trip_keeps_behaviour() {
    let mut net = deep_network(8);
    let inputs = values(&[("a", 0.5), ("b", 0.5), ("c", 0.5)]);
    let before = net.forward(&inputs).unwrap();
    net.reset_tick();

    let json = serde_json::to_string(&net).unwrap();
    let mut restored: Network = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.node_count(), net.node_count());
    assert_eq!(restored.input_names(), net.input_names());
    assert_eq!(restored.output_names(), net.output_names());
    let after = restored.forward(&inputs).unwrap();
    for (name, value) in &before {
        assert_abs_diff_eq!(after[name], *value, epsilon = 1e-12);
    }
}

#[test]
fn missing_input_leaves_no_partial_state() {
    let mut net = deep_network(2);
    let err = net.forward(&values(&[("a", 1.0), ("b", 1.0)])).unwrap_err();
    assert_eq!(err, ferrite_graph::NetworkError::MissingInput("c".into()));
    assert!(net.nodes().all(|n| !n.awaiting_inputs()));
    assert!(net.nodes().all(|n| n.fire_count() == 0));
}

#[test]
fn saved_network_loads_from_disk() {
    let mut net = deep_network(13);
    let inputs = values(&[("a", 0.2), ("b", 0.4), ("c", 0.6)]);
    let before = net.forward(&inputs).unwrap();
    net.reset_tick();

    let path = std::env::temp_dir().join(format!("ferrite-graph-net-{}.json", std::process::id()));
    net.save_json(&path).unwrap();
    let mut loaded = Network::load_json(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let after = loaded.forward(&inputs).unwrap();
    for (name, value) in &before {
        assert_abs_diff_eq!(after[name], *value, epsilon = 1e-12);
    }
}
