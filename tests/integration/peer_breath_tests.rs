//! Peer polling, the breath animation, and light arbitration between the
//! breath and presence renderers.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use drinkmon::app::breath::BreathTask;
use drinkmon::app::events::AppEvent;
use drinkmon::app::light::{LightArbitration, LightBus};
use drinkmon::app::peer_poll::PeerPollTask;
use drinkmon::app::presence::PresenceTask;
use drinkmon::app::state::{DeviceState, MAX_PEERS, OFF, Rgb};
use drinkmon::config::DeviceConfig;
use drinkmon::error::RemoteError;

use crate::mock_hw::{ManualClock, MockLight, MockRegistry, MockSensor, RecordingSink};

const RED: Rgb = (255, 0, 0);
const BLUE: Rgb = (0, 0, 255);
const GREEN: Rgb = (0, 255, 0);

#[test]
fn poll_failure_clears_peers_and_success_replaces_them() {
    let config = DeviceConfig::default();
    let handles = DeviceState::new(OFF).split();
    let registry = MockRegistry::new();
    let sink = RecordingSink::new();
    let mut poll = PeerPollTask::new(
        Rc::new(RefCell::new(registry.clone())),
        handles.peers,
        sink.clone(),
        &config,
    );

    registry.set_peers(Ok(vec![RED, BLUE]));
    assert_eq!(poll.tick(), Ok(2));
    assert_eq!(handles.view.peer_colors().as_slice(), &[RED, BLUE]);

    registry.set_peers(Err(RemoteError::Timeout));
    assert_eq!(poll.tick(), Err(RemoteError::Timeout));
    assert!(handles.view.peer_colors().is_empty());

    registry.set_peers(Ok(vec![GREEN]));
    assert_eq!(poll.tick(), Ok(1));
    assert_eq!(handles.view.peer_colors().as_slice(), &[GREEN]);

    assert_eq!(
        sink.events(),
        vec![
            AppEvent::PeersUpdated { count: 2 },
            AppEvent::PeerPollFailed(RemoteError::Timeout),
            AppEvent::PeersUpdated { count: 1 },
        ]
    );
    assert_eq!(registry.list_calls(), 3);
}

#[test]
fn oversized_peer_list_is_truncated_in_order() {
    let config = DeviceConfig::default();
    let handles = DeviceState::new(OFF).split();
    let registry = MockRegistry::new();
    let mut poll = PeerPollTask::new(
        Rc::new(RefCell::new(registry.clone())),
        handles.peers,
        RecordingSink::new(),
        &config,
    );

    let many: Vec<Rgb> = (0..40u8).map(|i| (i, 0, 0)).collect();
    registry.set_peers(Ok(many.clone()));
    assert_eq!(poll.tick(), Ok(MAX_PEERS));
    assert_eq!(handles.view.peer_colors().as_slice(), &many[..MAX_PEERS]);
}

#[test]
fn breath_alternates_full_pulses_between_peers() {
    let config = DeviceConfig::default();
    let handles = DeviceState::new(OFF).split();
    handles.peers.replace(&[RED, BLUE]);

    let clock = ManualClock::new();
    let light = MockLight::new();
    let bus = Rc::new(LightBus::new(
        light.clone(),
        config.light_arbitration,
        handles.view.clone(),
    ));
    let mut breath = BreathTask::new(bus, handles.view.clone(), clock.clone(), &config);

    let mut expect = |at: u64, color: Rgb, bright: f32| {
        clock.set(at);
        assert_eq!(breath.tick(), Duration::from_millis(20));
        let (c, b) = light.last().unwrap();
        assert_eq!(c, color, "colour at {at} ms");
        assert!((b - bright).abs() < 1e-3, "brightness {b} at {at} ms");
    };

    expect(0, RED, 0.0);
    expect(1000, RED, 1.0);
    expect(2000, BLUE, 0.0);
    expect(3000, BLUE, 1.0);
    expect(5000, RED, 1.0);
    expect(7000, BLUE, 1.0);
}

#[test]
fn breath_without_peers_turns_off_and_idles() {
    let config = DeviceConfig::default();
    let handles = DeviceState::new(OFF).split();
    let light = MockLight::new();
    let bus = Rc::new(LightBus::new(
        light.clone(),
        config.light_arbitration,
        handles.view.clone(),
    ));
    let mut breath = BreathTask::new(bus, handles.view.clone(), ManualClock::new(), &config);

    assert_eq!(breath.tick(), Duration::from_millis(200));
    assert_eq!(light.last(), Some((OFF, 0.0)));
}

/// Presence then breath on the same tick boundary, with an open session
/// and known peers.
fn contended_frame(policy: LightArbitration) -> Vec<(Rgb, f32)> {
    let own: Rgb = (9, 9, 9);
    let mut config = DeviceConfig::with_color(own);
    config.light_arbitration = policy;

    let handles = DeviceState::new(own).split();
    handles.peers.replace(&[RED]);

    let clock = ManualClock::new();
    let light = MockLight::new();
    let sensor = MockSensor::new();
    let bus = Rc::new(LightBus::new(light.clone(), policy, handles.view.clone()));

    let mut presence = PresenceTask::new(
        sensor.clone(),
        bus.clone(),
        Rc::new(RefCell::new(MockRegistry::new())),
        handles.session,
        clock.clone(),
        RecordingSink::new(),
        &config,
    );
    let mut breath = BreathTask::new(bus, handles.view.clone(), clock.clone(), &config);

    sensor.set_distance(500);
    presence.tick(); // opens the session
    light.clear();

    clock.set(1000);
    presence.tick();
    breath.tick();
    light.frames()
}

#[test]
fn last_writer_wins_lets_breath_overwrite_presence() {
    let frames = contended_frame(LightArbitration::LastWriterWins);
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0], ((9, 9, 9), 1.0));
    assert_eq!(frames.last().map(|f| f.0), Some(RED));
}

#[test]
fn session_priority_keeps_presence_on_the_light() {
    let frames = contended_frame(LightArbitration::SessionPriority);
    assert_eq!(frames, vec![((9, 9, 9), 1.0)]);
}
