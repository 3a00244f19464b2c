//! Mock adapters for integration tests.
//!
//! Every mock is a cheap `Clone` handle over shared interior state: one
//! copy moves into the task under test, the test keeps the other to script
//! inputs and inspect the recorded history.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use drinkmon::app::events::AppEvent;
use drinkmon::app::ports::{
    EventSink, LightPort, ManualInput, PresenceSensor, SessionRegistry, TimePort,
};
use drinkmon::app::state::{Rgb, SessionId};
use drinkmon::error::{ActuatorError, RemoteError, SensorError};

// ── Clock ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct ManualClock(Rc<Cell<u64>>);

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, ms: u64) {
        self.0.set(ms);
    }

    pub fn advance(&self, ms: u64) {
        self.0.set(self.0.get() + ms);
    }
}

impl TimePort for ManualClock {
    fn now_ms(&self) -> u64 {
        self.0.get()
    }
}

// ── Distance sensor ───────────────────────────────────────────

#[derive(Clone)]
pub struct MockSensor(Rc<Cell<Result<u16, SensorError>>>);

impl MockSensor {
    pub fn new() -> Self {
        Self(Rc::new(Cell::new(Err(SensorError::NotPresent))))
    }

    pub fn set_distance(&self, mm: u16) {
        self.0.set(Ok(mm));
    }

    pub fn set_unavailable(&self) {
        self.0.set(Err(SensorError::BusFailed));
    }
}

impl PresenceSensor for MockSensor {
    fn read_distance_mm(&mut self) -> Result<u16, SensorError> {
        self.0.get()
    }
}

// ── Light ─────────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct MockLight(Rc<RefCell<Vec<(Rgb, f32)>>>);

impl MockLight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> Vec<(Rgb, f32)> {
        self.0.borrow().clone()
    }

    pub fn last(&self) -> Option<(Rgb, f32)> {
        self.0.borrow().last().copied()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

impl LightPort for MockLight {
    fn set(&mut self, color: Rgb, brightness: f32) -> Result<(), ActuatorError> {
        self.0.borrow_mut().push((color, brightness));
        Ok(())
    }
}

// ── Button ────────────────────────────────────────────────────

/// Active-level button.  `fail_reads(true)` makes every read return a bus
/// error regardless of the level.
#[derive(Clone, Default)]
pub struct MockButton {
    pressed: Rc<Cell<bool>>,
    faulty: Rc<Cell<bool>>,
}

impl MockButton {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn press(&self) {
        self.pressed.set(true);
    }

    pub fn release(&self) {
        self.pressed.set(false);
    }

    pub fn fail_reads(&self, on: bool) {
        self.faulty.set(on);
    }
}

impl ManualInput for MockButton {
    fn is_pressed(&mut self) -> Result<bool, SensorError> {
        if self.faulty.get() {
            return Err(SensorError::BusFailed);
        }
        Ok(self.pressed.get())
    }
}

// ── Session registry ──────────────────────────────────────────

#[derive(Default)]
struct RegistryState {
    next_id: u32,
    start_failures: VecDeque<RemoteError>,
    end_result: Option<RemoteError>,
    peers: Option<Result<Vec<Rgb>, RemoteError>>,
    start_calls: Vec<Rgb>,
    end_calls: Vec<String>,
    list_calls: u32,
}

/// Scripted registry.  Starts succeed with `session-1`, `session-2`, …
/// unless a failure is queued; ends succeed unless `fail_ends` is set; the
/// peer list is whatever was last scripted (empty by default).
#[derive(Clone, Default)]
pub struct MockRegistry(Rc<RefCell<RegistryState>>);

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_start(&self, e: RemoteError) {
        self.0.borrow_mut().start_failures.push_back(e);
    }

    pub fn fail_ends(&self, e: Option<RemoteError>) {
        self.0.borrow_mut().end_result = e;
    }

    pub fn set_peers(&self, peers: Result<Vec<Rgb>, RemoteError>) {
        self.0.borrow_mut().peers = Some(peers);
    }

    pub fn start_calls(&self) -> Vec<Rgb> {
        self.0.borrow().start_calls.clone()
    }

    pub fn end_calls(&self) -> Vec<String> {
        self.0.borrow().end_calls.clone()
    }

    pub fn list_calls(&self) -> u32 {
        self.0.borrow().list_calls
    }
}

impl SessionRegistry for MockRegistry {
    fn start(&mut self, color: Rgb) -> Result<SessionId, RemoteError> {
        let mut s = self.0.borrow_mut();
        s.start_calls.push(color);
        if let Some(e) = s.start_failures.pop_front() {
            return Err(e);
        }
        s.next_id += 1;
        Ok(SessionId::new(&format!("session-{}", s.next_id)).unwrap())
    }

    fn end(&mut self, id: &SessionId) -> Result<(), RemoteError> {
        let mut s = self.0.borrow_mut();
        s.end_calls.push(id.as_str().to_owned());
        match s.end_result {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn list_active_peers(&mut self) -> Result<Vec<Rgb>, RemoteError> {
        let mut s = self.0.borrow_mut();
        s.list_calls += 1;
        s.peers.clone().unwrap_or(Ok(Vec::new()))
    }
}

// ── Event sink ────────────────────────────────────────────────

#[derive(Clone, Default)]
pub struct RecordingSink(Rc<RefCell<Vec<AppEvent>>>);

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<AppEvent> {
        self.0.borrow().clone()
    }

    pub fn count(&self, pred: impl Fn(&AppEvent) -> bool) -> usize {
        self.0.borrow().iter().filter(|e| pred(*e)).count()
    }
}

impl EventSink for RecordingSink {
    fn emit(&mut self, event: &AppEvent) {
        self.0.borrow_mut().push(event.clone());
    }
}
