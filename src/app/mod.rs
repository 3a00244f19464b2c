//! Application core: the shared device state and the four tasks that own it.
//!
//! All interaction with hardware and the network happens through **port
//! traits** defined in [`ports`], keeping this layer testable on the host
//! with mock adapters.

pub mod breath;
pub mod button;
pub mod events;
pub mod light;
pub mod peer_poll;
pub mod ports;
pub mod presence;
pub mod session;
pub mod state;
