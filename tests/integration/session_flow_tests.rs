//! Presence and button tasks driving the session lifecycle against mocks.

use std::cell::RefCell;
use std::rc::Rc;

use drinkmon::app::button::{ButtonOutcome, ButtonTask};
use drinkmon::app::events::{AppEvent, EndReason};
use drinkmon::app::light::{LightArbitration, LightBus};
use drinkmon::app::presence::{PresenceOutcome, PresenceTask};
use drinkmon::app::state::{DeviceState, OFF, Rgb, StateView};
use drinkmon::config::DeviceConfig;
use drinkmon::error::RemoteError;

use crate::mock_hw::{
    ManualClock, MockButton, MockLight, MockRegistry, MockSensor, RecordingSink,
};

const OWN: Rgb = (10, 200, 30);

type Presence = PresenceTask<MockSensor, MockLight, MockRegistry, ManualClock, RecordingSink>;
type Button = ButtonTask<MockButton, MockRegistry, ManualClock, RecordingSink>;

struct Rig {
    clock: ManualClock,
    sensor: MockSensor,
    light: MockLight,
    button: MockButton,
    registry: MockRegistry,
    sink: RecordingSink,
    view: StateView,
    presence: Presence,
    button_task: Button,
}

impl Rig {
    fn new() -> Self {
        Self::with_config(DeviceConfig::with_color(OWN))
    }

    fn with_config(config: DeviceConfig) -> Self {
        let clock = ManualClock::new();
        let sensor = MockSensor::new();
        let light = MockLight::new();
        let button = MockButton::new();
        let registry = MockRegistry::new();
        let sink = RecordingSink::new();

        let handles = DeviceState::new(config.own_color).split();
        let shared = Rc::new(RefCell::new(registry.clone()));
        let bus = Rc::new(LightBus::new(
            light.clone(),
            LightArbitration::LastWriterWins,
            handles.view.clone(),
        ));

        let presence = PresenceTask::new(
            sensor.clone(),
            bus,
            shared.clone(),
            handles.session.clone(),
            clock.clone(),
            sink.clone(),
            &config,
        );
        let button_task = ButtonTask::new(
            button.clone(),
            shared,
            handles.session,
            clock.clone(),
            sink.clone(),
            &config,
        );

        Self {
            clock,
            sensor,
            light,
            button,
            registry,
            sink,
            view: handles.view,
            presence,
            button_task,
        }
    }

    fn sample(&mut self, at_ms: u64, mm: u16) -> PresenceOutcome {
        self.clock.set(at_ms);
        self.sensor.set_distance(mm);
        self.presence.tick()
    }

    fn press(&mut self, at_ms: u64) -> ButtonOutcome {
        self.clock.set(at_ms);
        self.button.press();
        self.button_task.tick()
    }

    fn release(&mut self, at_ms: u64) -> ButtonOutcome {
        self.clock.set(at_ms);
        self.button.release();
        self.button_task.tick()
    }
}

#[test]
fn presence_then_absence_ends_after_timeout() {
    let mut rig = Rig::new();

    for k in 0..=70u64 {
        let mm = if k < 3 { 150 } else { 50 };
        let out = rig.sample(k * 1000, mm);
        let expected = match k {
            0 => PresenceOutcome::Started,
            1 | 2 => PresenceOutcome::Refreshed,
            3..=62 => PresenceOutcome::Grace,
            63 => PresenceOutcome::Ended,
            _ => PresenceOutcome::Idle,
        };
        assert_eq!(out, expected, "sample {k}");
        assert_eq!(rig.view.is_active(), (0..63).contains(&k), "sample {k}");
    }

    assert_eq!(rig.registry.start_calls(), vec![OWN]);
    assert_eq!(rig.registry.end_calls(), vec!["session-1".to_string()]);
    assert_eq!(
        rig.sink.count(|e| matches!(
            e,
            AppEvent::SessionEnded {
                reason: EndReason::Timeout,
                ..
            }
        )),
        1
    );
}

#[test]
fn light_reflects_state_before_the_transition() {
    let mut rig = Rig::new();

    rig.sample(0, 150);
    assert_eq!(rig.light.last(), Some((OFF, 0.0)));
    assert!(rig.view.is_active());

    rig.sample(1000, 150);
    assert_eq!(rig.light.last(), Some((OWN, 1.0)));

    // Ending tick still shows the session it is about to close.
    rig.sample(62_001, 50);
    assert!(!rig.view.is_active());
    assert_eq!(rig.light.last(), Some((OWN, 1.0)));

    rig.sample(63_000, 50);
    assert_eq!(rig.light.last(), Some((OFF, 0.0)));
}

#[test]
fn threshold_is_strictly_greater() {
    let mut rig = Rig::new();
    assert_eq!(rig.sample(0, 100), PresenceOutcome::Idle);
    assert_eq!(rig.sample(1000, 101), PresenceOutcome::Started);
}

#[test]
fn failed_start_never_activates() {
    let mut rig = Rig::new();
    rig.registry.fail_next_start(RemoteError::Timeout);

    assert_eq!(rig.sample(0, 500), PresenceOutcome::StartFailed);
    assert!(!rig.view.is_active());
    assert!(rig.view.session().id().is_none());
    assert!(
        rig.sink
            .events()
            .contains(&AppEvent::SessionStartFailed(RemoteError::Timeout))
    );

    // Retried on the next tick with presence.
    assert_eq!(rig.sample(1000, 500), PresenceOutcome::Started);
    assert_eq!(rig.registry.start_calls().len(), 2);
}

#[test]
fn unavailable_sensor_counts_as_absence() {
    let mut rig = Rig::new();
    rig.sample(0, 300);

    rig.clock.set(30_000);
    rig.sensor.set_unavailable();
    assert_eq!(rig.presence.tick(), PresenceOutcome::Grace);

    rig.clock.set(60_001);
    assert_eq!(rig.presence.tick(), PresenceOutcome::Ended);
}

#[test]
fn refresh_keeps_a_long_session_open() {
    let mut rig = Rig::new();
    rig.sample(0, 300);
    // Gaps just under the timeout, but presence on every sample.
    for k in 1..20u64 {
        assert_eq!(rig.sample(k * 59_000, 300), PresenceOutcome::Refreshed);
    }
    assert!(rig.view.is_active());
    assert!(rig.registry.end_calls().is_empty());
}

#[test]
fn button_ends_an_open_session() {
    let mut rig = Rig::new();
    rig.sample(0, 300);
    assert!(rig.view.is_active());

    assert_eq!(rig.press(500), ButtonOutcome::Ended);
    assert!(!rig.view.is_active());
    assert_eq!(rig.registry.end_calls(), vec!["session-1".to_string()]);
    assert!(rig.sink.events().iter().any(|e| matches!(
        e,
        AppEvent::SessionEnded {
            reason: EndReason::Button,
            ..
        }
    )));

    // Someone is still there: the next presence tick opens a fresh session.
    assert_eq!(rig.sample(1000, 300), PresenceOutcome::Started);
    assert_eq!(rig.view.session().id().map(|id| id.as_str().to_owned()), Some("session-2".into()));
}

#[test]
fn button_without_session_is_a_no_op() {
    let mut rig = Rig::new();
    assert_eq!(rig.press(0), ButtonOutcome::NoSession);
    assert!(rig.registry.end_calls().is_empty());
    assert!(rig.sink.events().is_empty());
}

#[test]
fn button_bounces_are_debounced() {
    let mut rig = Rig::new();

    assert_eq!(rig.press(0), ButtonOutcome::NoSession);
    assert_eq!(rig.release(20), ButtonOutcome::NoEdge);

    rig.sample(40, 300);
    assert!(rig.view.is_active());

    // Second edge 100 ms after the accepted one: ignored.
    assert_eq!(rig.press(100), ButtonOutcome::Debounced);
    assert!(rig.view.is_active());
    assert_eq!(rig.release(120), ButtonOutcome::NoEdge);

    // Holding is not a new edge.
    assert_eq!(rig.press(200), ButtonOutcome::Ended);
    assert_eq!(rig.press(220), ButtonOutcome::NoEdge);
    assert_eq!(rig.registry.end_calls().len(), 1);
}

#[test]
fn button_read_error_counts_as_released() {
    let mut rig = Rig::new();
    rig.sample(0, 300);

    rig.button.fail_reads(true);
    assert_eq!(rig.press(500), ButtonOutcome::NoEdge);
    assert!(rig.view.is_active());
    assert!(rig.registry.end_calls().is_empty());

    // Held through the fault: the first good read is a fresh press edge.
    rig.button.fail_reads(false);
    rig.clock.set(520);
    assert_eq!(rig.button_task.tick(), ButtonOutcome::Ended);
    assert!(!rig.view.is_active());
}

#[test]
fn failed_end_call_still_closes_locally() {
    let mut rig = Rig::new();
    rig.registry.fail_ends(Some(RemoteError::Status(404)));
    rig.sample(0, 300);

    assert_eq!(rig.press(1000), ButtonOutcome::Ended);
    assert!(!rig.view.is_active());

    let events = rig.sink.events();
    let failed = events
        .iter()
        .position(|e| matches!(e, AppEvent::SessionEndFailed { .. }))
        .unwrap();
    let ended = events
        .iter()
        .position(|e| matches!(e, AppEvent::SessionEnded { .. }))
        .unwrap();
    assert!(failed < ended);
}

#[test]
fn shorter_timeout_is_honoured() {
    let mut config = DeviceConfig::with_color(OWN);
    config.session_end_timeout_secs = 5;
    let mut rig = Rig::with_config(config);

    rig.sample(0, 300);
    assert_eq!(rig.sample(5_000, 0), PresenceOutcome::Grace);
    assert_eq!(rig.sample(5_001, 0), PresenceOutcome::Ended);
}
