//! Task composition on a single-threaded cooperative executor.
//!
//! ```text
//!  ┌───────────────────────────────────────────────────────────────┐
//!  │  futures_lite::future::block_on                               │
//!  │  ┌─────────────────────────────────────────────────────────┐  │
//!  │  │  edge_executor::LocalExecutor                           │  │
//!  │  │                                                         │  │
//!  │  │  ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌───────────┐  │  │
//!  │  │  │ Presence │ │ Button   │ │ Peer poll │ │ Breath    │  │  │
//!  │  │  │ 1 s ⏱    │ │ 20 ms ⏱  │ │ 30 s ⏱    │ │ 20/200 ms │  │  │
//!  │  │  └────┬─────┘ └────┬─────┘ └─────┬─────┘ └─────┬─────┘  │  │
//!  │  │       │ session    │ session     │ peers       │ light  │  │
//!  │  │       ▼            ▼             ▼             ▼        │  │
//!  │  │           DeviceState  ·  LightBus  ·  Registry         │  │
//!  │  └─────────────────────────────────────────────────────────┘  │
//!  └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! Exactly one task runs at a time and only yields at its timer, so no tick
//! ever observes another task's half-finished update.  Relative tick order
//! between tasks is unspecified.

use core::cell::RefCell;
use std::rc::Rc;

use edge_executor::LocalExecutor;
use log::info;

use crate::app::breath::BreathTask;
use crate::app::button::ButtonTask;
use crate::app::events::AppEvent;
use crate::app::light::LightBus;
use crate::app::peer_poll::PeerPollTask;
use crate::app::ports::{
    EventSink, LightPort, ManualInput, PresenceSensor, SessionRegistry, TimePort,
};
use crate::app::presence::PresenceTask;
use crate::app::state::{DeviceState, StateView};
use crate::config::DeviceConfig;

/// Device-side capabilities the tasks drive.
pub struct ControllerHardware<S, L, B> {
    pub sensor: S,
    pub light: L,
    pub button: B,
}

/// The four tasks, wired to one [`DeviceState`] and ready to spawn.
pub struct Scheduler<S, L, B, R, C, E>
where
    S: PresenceSensor,
    L: LightPort,
    B: ManualInput,
    R: SessionRegistry,
    C: TimePort,
    E: EventSink,
{
    presence: PresenceTask<S, L, R, C, E>,
    button: ButtonTask<B, R, C, E>,
    peer_poll: PeerPollTask<R, E>,
    breath: BreathTask<L, C>,
    view: StateView,
    light: Rc<LightBus<L>>,
    registry: Rc<RefCell<R>>,
    sink: E,
}

impl<S, L, B, R, C, E> Scheduler<S, L, B, R, C, E>
where
    S: PresenceSensor,
    L: LightPort,
    B: ManualInput,
    R: SessionRegistry,
    C: TimePort + Clone,
    E: EventSink + Clone,
{
    pub fn new(
        config: &DeviceConfig,
        hw: ControllerHardware<S, L, B>,
        registry: R,
        clock: C,
        sink: E,
    ) -> Self {
        let handles = DeviceState::new(config.own_color).split();
        let registry = Rc::new(RefCell::new(registry));
        let light = Rc::new(LightBus::new(
            hw.light,
            config.light_arbitration,
            handles.view.clone(),
        ));

        let presence = PresenceTask::new(
            hw.sensor,
            light.clone(),
            registry.clone(),
            handles.session.clone(),
            clock.clone(),
            sink.clone(),
            config,
        );
        let button = ButtonTask::new(
            hw.button,
            registry.clone(),
            handles.session,
            clock.clone(),
            sink.clone(),
            config,
        );
        let peer_poll = PeerPollTask::new(registry.clone(), handles.peers, sink.clone(), config);
        let breath = BreathTask::new(light.clone(), handles.view.clone(), clock, config);

        Self {
            presence,
            button,
            peer_poll,
            breath,
            view: handles.view,
            light,
            registry,
            sink,
        }
    }

    /// Read-only view of the shared state.
    pub fn view(&self) -> StateView {
        self.view.clone()
    }

    /// The light bus both renderers share.
    pub fn light(&self) -> Rc<LightBus<L>> {
        self.light.clone()
    }

    /// The registry all three remote-calling tasks share.
    pub fn registry(&self) -> Rc<RefCell<R>> {
        self.registry.clone()
    }

    /// Detach all four tasks onto `executor`.
    pub fn spawn_on<'a, const N: usize>(mut self, executor: &LocalExecutor<'a, N>)
    where
        S: 'a,
        L: 'a,
        B: 'a,
        R: 'a,
        C: 'a,
        E: 'a,
    {
        self.sink.emit(&AppEvent::Started {
            own_color: self.view.own_color(),
        });

        executor.spawn(self.presence.run()).detach();
        executor.spawn(self.button.run()).detach();
        executor.spawn(self.peer_poll.run()).detach();
        executor.spawn(self.breath.run()).detach();

        info!("Scheduler: 4 tasks spawned");
    }

    /// Spawn everything and drive the executor.  Never returns in normal
    /// operation; the controller runs until power-off or reset.
    pub fn run(self) {
        let executor: LocalExecutor<'_, 8> = LocalExecutor::new();
        self.spawn_on(&executor);
        futures_lite::future::block_on(executor.run(core::future::pending::<()>()));
    }
}
