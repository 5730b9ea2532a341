use approx::assert_abs_diff_eq;
use ferrite_graph::network::BIAS_NAME;
use ferrite_graph::{Network, NetworkError, Values};

fn chain() -> Network {
    let mut net = Network::with_seed(0);
    net.add_input_node("x").unwrap();
    for h in ["h1", "h2", "h3"] {
        net.add_hidden_node(h).unwrap();
    }
    net.add_output_node("y").unwrap();
    net.connect("x", "h1").unwrap();
    net.connect("h1", "h2").unwrap();
    net.connect("h2", "h3").unwrap();
    net.connect("h3", "y").unwrap();
    net
}

#[test]
fn node_names_are_unique() {
    let mut net = Network::with_seed(0);
    net.add_input_node("x").unwrap();
    assert_eq!(net.add_hidden_node("x"), Err(NetworkError::DuplicateNode("x".into())));
    assert_eq!(
        net.add_output_node(BIAS_NAME),
        Err(NetworkError::DuplicateNode(BIAS_NAME.into()))
    );
}

#[test]
fn unknown_names_are_reported() {
    let mut net = chain();
    assert_eq!(net.connect("x", "nope"), Err(NetworkError::UnknownNode("nope".into())));
    assert_eq!(net.set_weights("ghost", &[]), Err(NetworkError::UnknownNode("ghost".into())));
    assert_eq!(net.edge_weight("x", "ghost"), None);
}

#[test]
fn loops_are_rejected_at_connect_time() {
    let mut net = chain();
    let edges = net.edge_count();

    assert_eq!(
        net.connect("h3", "h1"),
        Err(NetworkError::CycleDetected { source_name: "h3".into(), target: "h1".into() })
    );
    assert!(matches!(net.connect("h2", "h2"), Err(NetworkError::CycleDetected { .. })));
    // a shortcut forward is fine
    net.connect("h1", "h3").unwrap();
    assert_eq!(net.edge_count(), edges + 1);
}

#[test]
fn role_constraints_on_connections() {
    let mut net = chain();
    assert!(matches!(
        net.connect("h1", "x"),
        Err(NetworkError::InvalidConnection { reason, .. }) if reason.contains("input")
    ));
    assert!(matches!(
        net.connect("h1", BIAS_NAME),
        Err(NetworkError::InvalidConnection { .. })
    ));
    assert!(matches!(
        net.connect("y", "h2"),
        Err(NetworkError::InvalidConnection { reason, .. }) if reason.contains("output")
    ));
    assert!(matches!(
        net.connect("h1", "h2"),
        Err(NetworkError::InvalidConnection { reason, .. }) if reason.contains("already")
    ));
}

#[test]
fn rejected_connections_leave_buffers_untouched() {
    let mut net = chain();
    let before: Vec<(usize, usize)> = net
        .nodes()
        .map(|n| (n.input_edges().len(), n.output_edges().len()))
        .collect();
    let _ = net.connect("h3", "h1");
    let _ = net.connect("h1", "h2");
    let after: Vec<(usize, usize)> = net
        .nodes()
        .map(|n| (n.input_edges().len(), n.output_edges().len()))
        .collect();
    assert_eq!(before, after);
}

#[test]
fn nodes_without_inputs_or_outputs_still_propagate() {
    let mut net = Network::with_seed(0);
    net.add_input_node("unused").unwrap();
    net.add_input_node("x").unwrap();
    net.add_hidden_node("dangling").unwrap();
    net.add_output_node("y").unwrap();
    net.connect("x", "y").unwrap();

    let inputs: Values = [("unused".to_string(), 1.0), ("x".to_string(), 0.5)].into();
    let actual = net.forward(&inputs).unwrap();
    // the dangling hidden node fires off the bias alone
    assert_eq!(net.node("dangling").unwrap().fire_count(), 1);
    net.backward(&actual, &[("y".to_string(), 1.0)].into()).unwrap();
    assert!(!net.node("dangling").unwrap().awaiting_feedback());
}

#[test]
fn dead_end_successors_do_not_stall_feedback() {
    let mut net = Network::with_seed(4);
    net.add_input_node("x").unwrap();
    net.add_hidden_node("h1").unwrap();
    net.add_hidden_node("dead").unwrap();
    net.add_output_node("y").unwrap();
    net.connect("x", "h1").unwrap();
    net.connect("h1", "dead").unwrap();
    net.connect("h1", "y").unwrap();

    let inputs: Values = [("x".to_string(), 0.6)].into();
    let expected: Values = [("y".to_string(), 1.0)].into();
    let mut first: Option<Vec<f64>> = None;
    for tick in 1..=3 {
        let actual = net.forward(&inputs).unwrap();
        net.backward(&actual, &expected).unwrap();

        let h1 = net.node("h1").unwrap();
        assert!(!h1.awaiting_feedback(), "tick {tick}");
        assert!(!net.node("dead").unwrap().awaiting_feedback(), "tick {tick}");

        // only the edge into y counts towards h1's error
        let y = net.node("y").unwrap();
        let s = h1.output_value();
        let from_y = y.delta() * net.edge_weight("h1", "y").unwrap();
        assert_eq!(h1.feedback()[0], 0.0);
        assert_abs_diff_eq!(h1.delta(), from_y * s * (1.0 - s), epsilon = 1e-12);

        // same example every tick, so the epoch sum grows linearly
        let partials = h1.training().partial_derivatives().unwrap().to_vec();
        let once = first.get_or_insert_with(|| partials.clone());
        for (p, o) in partials.iter().zip(once.iter()) {
            assert_abs_diff_eq!(*p, o * tick as f64, epsilon = 1e-12);
        }
        // the dead end itself learns nothing
        assert!(net.node("dead").unwrap().training().partial_derivatives().is_none());
    }
}

#[test]
fn chains_of_dead_ends_are_skipped() {
    let mut net = chain();
    net.add_hidden_node("d1").unwrap();
    net.add_hidden_node("d2").unwrap();
    net.connect("h2", "d1").unwrap();
    net.connect("d1", "d2").unwrap();

    let inputs: Values = [("x".to_string(), 0.3)].into();
    let expected: Values = [("y".to_string(), 0.0)].into();
    for _ in 0..2 {
        let actual = net.forward(&inputs).unwrap();
        net.backward(&actual, &expected).unwrap();
        assert!(net.nodes().all(|n| !n.awaiting_feedback()));
        assert!(net.node("h1").unwrap().training().partial_derivatives().is_some());
    }
}
