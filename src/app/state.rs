//! Shared device state and its per-writer handles.
//!
//! One [`DeviceState`] is created at boot and split into handles:
//!
//! ```text
//!                  ┌────────────────────────────────┐
//!  SessionWriter ─▶│ session: Inactive | Active{..} │◀─┐
//!  (Presence,      ├────────────────────────────────┤  │ StateView
//!   Button)        │ peers:   [Rgb; ≤ MAX_PEERS]    │◀─┤ (Breath, LightBus,
//!  PeerWriter ────▶├────────────────────────────────┤  │  Presence render)
//!  (Peer Poll)     │ own_color (immutable)          │◀─┘
//!                  └────────────────────────────────┘
//! ```
//!
//! Each cell is an `embassy-sync` blocking mutex over a `RefCell` with the
//! no-op raw mutex: the executor is single-threaded, and the closure-scoped
//! `lock` makes it impossible to hold a borrow across an `.await`.

use core::cell::RefCell;
use core::fmt;
use std::rc::Rc;

use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::blocking_mutex::raw::NoopRawMutex;

/// Colour as (R, G, B) tuple, each 0–255.
pub type Rgb = (u8, u8, u8);

/// All channels dark.
pub const OFF: Rgb = (0, 0, 0);

/// Peer colours kept from one poll.
pub const MAX_PEERS: usize = 32;

/// Last poll result, replaced wholesale.
pub type PeerColors = heapless::Vec<Rgb, MAX_PEERS>;

/// Registry-issued session token.  Any non-empty token is kept whole so the
/// session it names can always be closed again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionId(String);

impl SessionId {
    /// `None` if the token is empty.
    pub fn new(token: &str) -> Option<Self> {
        if token.is_empty() {
            return None;
        }
        Some(Self(token.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session lifecycle.  `Active` always carries its token.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Inactive,
    Active {
        id: SessionId,
        /// Last tick presence was confirmed (monotonic ms).
        last_refresh_ms: u64,
    },
}

impl Session {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }

    pub fn id(&self) -> Option<&SessionId> {
        match self {
            Self::Active { id, .. } => Some(id),
            Self::Inactive => None,
        }
    }

    pub fn last_refresh_ms(&self) -> Option<u64> {
        match self {
            Self::Active { last_refresh_ms, .. } => Some(*last_refresh_ms),
            Self::Inactive => None,
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Storage
// ───────────────────────────────────────────────────────────────

type Shared<T> = Mutex<NoopRawMutex, RefCell<T>>;

struct Inner {
    session: Shared<Session>,
    peers: Shared<PeerColors>,
    own_color: Rgb,
}

/// The single source of truth, before it is split into handles.
pub struct DeviceState {
    inner: Rc<Inner>,
}

/// Write handles plus a read view, produced by [`DeviceState::split`].
pub struct StateHandles {
    pub session: SessionWriter,
    pub peers: PeerWriter,
    pub view: StateView,
}

impl DeviceState {
    pub fn new(own_color: Rgb) -> Self {
        Self {
            inner: Rc::new(Inner {
                session: Mutex::new(RefCell::new(Session::Inactive)),
                peers: Mutex::new(RefCell::new(PeerColors::new())),
                own_color,
            }),
        }
    }

    /// Consume the state and hand out exactly one [`PeerWriter`].
    pub fn split(self) -> StateHandles {
        StateHandles {
            session: SessionWriter {
                inner: self.inner.clone(),
            },
            peers: PeerWriter {
                inner: self.inner.clone(),
            },
            view: StateView { inner: self.inner },
        }
    }
}

// ───────────────────────────────────────────────────────────────
// Handles
// ───────────────────────────────────────────────────────────────

/// Read-only access to every field.
#[derive(Clone)]
pub struct StateView {
    inner: Rc<Inner>,
}

impl StateView {
    pub fn own_color(&self) -> Rgb {
        self.inner.own_color
    }

    pub fn session(&self) -> Session {
        self.inner.session.lock(|s| s.borrow().clone())
    }

    pub fn is_active(&self) -> bool {
        self.inner.session.lock(|s| s.borrow().is_active())
    }

    /// Copy of the current peer list.
    pub fn peer_colors(&self) -> PeerColors {
        self.inner.peers.lock(|p| p.borrow().clone())
    }

    pub fn has_peers(&self) -> bool {
        self.inner.peers.lock(|p| !p.borrow().is_empty())
    }
}

/// Writer for the session fields, shared by the presence and button tasks.
#[derive(Clone)]
pub struct SessionWriter {
    inner: Rc<Inner>,
}

impl SessionWriter {
    pub fn own_color(&self) -> Rgb {
        self.inner.own_color
    }

    pub fn session(&self) -> Session {
        self.inner.session.lock(|s| s.borrow().clone())
    }

    pub fn is_active(&self) -> bool {
        self.inner.session.lock(|s| s.borrow().is_active())
    }

    /// Open a session.  Replaces any previous one.
    pub fn begin(&self, id: SessionId, now_ms: u64) {
        self.inner.session.lock(|s| {
            *s.borrow_mut() = Session::Active {
                id,
                last_refresh_ms: now_ms,
            };
        });
    }

    /// Renew an open session.  Returns `false` if none is open.
    pub fn refresh(&self, now_ms: u64) -> bool {
        self.inner.session.lock(|s| match &mut *s.borrow_mut() {
            Session::Active { last_refresh_ms, .. } => {
                *last_refresh_ms = now_ms;
                true
            }
            Session::Inactive => false,
        })
    }

    /// Close the session, returning its token if one was open.
    pub fn close(&self) -> Option<SessionId> {
        self.inner.session.lock(|s| {
            match core::mem::take(&mut *s.borrow_mut()) {
                Session::Active { id, .. } => Some(id),
                Session::Inactive => None,
            }
        })
    }
}

/// Sole writer of the peer list; exactly one exists.
pub struct PeerWriter {
    inner: Rc<Inner>,
}

impl PeerWriter {
    /// Replace the list with `colors`, keeping at most [`MAX_PEERS`].
    /// Returns the number of colours that did not fit.
    pub fn replace(&self, colors: &[Rgb]) -> usize {
        let keep = colors.len().min(MAX_PEERS);
        let mut next = PeerColors::new();
        // Cannot fail: `keep` is bounded by capacity.
        let _ = next.extend_from_slice(&colors[..keep]);
        self.inner.peers.lock(|p| *p.borrow_mut() = next);
        colors.len() - keep
    }

    /// Drop everything (fail-closed poll result).
    pub fn clear(&self) {
        self.inner.peers.lock(|p| p.borrow_mut().clear());
    }
}
