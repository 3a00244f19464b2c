//! Session lifecycle shared by the presence and button tasks.
//!
//! Both tasks close a session through [`end_session`], so a manual end and
//! a timeout end are indistinguishable to the registry.

use core::cell::RefCell;
use std::rc::Rc;

use log::{info, warn};

use super::events::{AppEvent, EndReason};
use super::ports::{EventSink, SessionRegistry};
use super::state::{Rgb, SessionWriter};

/// The registry as shared between tasks.  Calls are synchronous, so a
/// borrow never outlives a tick.
pub type SharedRegistry<R> = Rc<RefCell<R>>;

/// Ask the registry for a session and open it locally on success.
///
/// Returns `true` if a session is now open.  Failure leaves state untouched.
pub fn start_session<R, E>(
    writer: &SessionWriter,
    registry: &RefCell<R>,
    sink: &mut E,
    color: Rgb,
    now_ms: u64,
) -> bool
where
    R: SessionRegistry,
    E: EventSink,
{
    let result = registry.borrow_mut().start(color);
    match result {
        Ok(id) => {
            info!("Session started: {}", id);
            writer.begin(id.clone(), now_ms);
            sink.emit(&AppEvent::SessionStarted { id });
            true
        }
        Err(e) => {
            warn!("Session start failed: {}", e);
            sink.emit(&AppEvent::SessionStartFailed(e));
            false
        }
    }
}

/// Tell the registry the session is over, then close it locally whatever
/// the registry said.
///
/// Returns `false` if there was no open session.
pub fn end_session<R, E>(
    writer: &SessionWriter,
    registry: &RefCell<R>,
    sink: &mut E,
    reason: EndReason,
) -> bool
where
    R: SessionRegistry,
    E: EventSink,
{
    let Some(id) = writer.session().id().cloned() else {
        return false;
    };

    let result = registry.borrow_mut().end(&id);
    if let Err(error) = result {
        warn!("Session end call failed ({}), closing locally", error);
        sink.emit(&AppEvent::SessionEndFailed {
            id: id.clone(),
            error,
        });
    }

    writer.close();
    info!("Session ended ({:?}): {}", reason, id);
    sink.emit(&AppEvent::SessionEnded { id, reason });
    true
}
