// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Two nodes built from the default configuration exchanging demo rounds

use std::sync::Arc;

use wt20::config::Wt20Config;
use wt20::link::loopback::{CompletionMode, LoopbackRadio};
use wt20::prelude::*;

struct Pair {
    a: Node<LoopbackRadio, MemoryPins>,
    b: Node<LoopbackRadio, MemoryPins>,
    radio_b: Arc<LoopbackRadio>,
    known: Vec<Address>,
}

fn pair_from_defaults() -> Pair {
    let config = Wt20Config::default();
    let known = config.node.known_addresses().unwrap();
    let link = config.link.to_link_config().unwrap();

    let (radio_a, radio_b) = LoopbackRadio::pair(known[0], known[1]);
    let mut a = Node::new(
        ProtocolEngine::new(radio_a, link.clone()),
        MemoryPins::new(),
        config.node.led_pin,
    )
    .unwrap();
    let mut b = Node::new(
        ProtocolEngine::new(Arc::clone(&radio_b), link),
        MemoryPins::new(),
        config.node.led_pin,
    )
    .unwrap();
    a.start(&known).unwrap();
    b.start(&known).unwrap();

    Pair {
        a,
        b,
        radio_b,
        known,
    }
}

#[test]
fn nodes_pick_each_other_as_peer() {
    let pair = pair_from_defaults();
    assert_eq!(pair.a.peer(), Some(pair.known[1]));
    assert_eq!(pair.b.peer(), Some(pair.known[0]));
    assert_eq!(pair.a.state(), EngineState::Ready);
}

#[test]
fn rounds_toggle_led_and_deliver_payloads() {
    let mut pair = pair_from_defaults();
    let led_pin = Wt20Config::default().node.led_pin;

    for round in 0..3 {
        pair.a.send_round(round).unwrap();
    }

    let handled = pair.b.service_all().unwrap();
    assert_eq!(handled.len(), 6);

    let texts: Vec<String> = handled
        .iter()
        .filter_map(|d| match d {
            Dispatch::Payload { source, text, .. } => {
                assert_eq!(*source, pair.known[0]);
                Some(text.clone())
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        texts,
        vec!["Hello, message 0", "Hello, message 1", "Hello, message 2"]
    );

    assert_eq!(
        pair.b.led().history(led_pin),
        &[PinLevel::High, PinLevel::Low, PinLevel::High]
    );
    assert!(pair.a.led().history(led_pin).is_empty());

    let stats = pair.a.stats();
    assert_eq!(stats.gate.delivered, 6);
    assert_eq!(pair.b.stats().mailbox.received, 6);
}

#[test]
fn failed_delivery_surfaces_to_sender() {
    let mut pair = pair_from_defaults();
    pair.radio_b.set_completion_mode(CompletionMode::Fail);

    assert!(matches!(
        pair.b.send_round(0),
        Err(NodeError::Protocol(ProtocolError::Link(_)))
    ));
    assert_eq!(pair.b.stats().gate.failed, 1);

    pair.radio_b.set_completion_mode(CompletionMode::Immediate);
    pair.b.send_round(1).unwrap();
    let handled = pair.a.service_all().unwrap();
    assert!(handled.contains(&Dispatch::Payload {
        source: pair.known[1],
        text: "Hello, message 1".to_string(),
        bytes: b"Hello, message 1".to_vec(),
    }));
}

#[test]
fn stopped_node_rejects_sends() {
    let mut pair = pair_from_defaults();
    pair.a.stop().unwrap();

    assert_eq!(pair.a.state(), EngineState::Uninitialized);
    assert_eq!(pair.a.send_round(0), Err(NodeError::NoPeer));
    assert!(pair.b.service_all().unwrap().is_empty());
}
