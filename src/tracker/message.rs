//! # Tracker Messages
//!
//! Requests sent from a [`TrackerClient`](super::TrackerClient) to the
//! [`TrackerActor`](super::TrackerActor). Each carries a one-shot channel for
//! its answer.

use crate::error::TrackerError;
use crate::hub::OrderObserver;
use crate::model::{Order, OrderCreate, OrderDetail, OrderId, OrderSnapshot, OrderState};
use crate::picker::PickerState;
use std::fmt;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the actor.
pub type Response<T> = oneshot::Sender<Result<T, TrackerError>>;

pub enum TrackerRequest {
    /// Customer checkout: allocate an id and place the order.
    Submit {
        params: OrderCreate,
        respond_to: Response<OrderId>,
    },
    /// Picker checks out the oldest placed order.
    Advance { respond_to: Response<OrderDetail> },
    /// Picker archives the order it is working on.
    Complete { respond_to: Response<OrderId> },
    Snapshot { respond_to: Response<OrderSnapshot> },
    Oldest {
        state: OrderState,
        respond_to: Response<Option<OrderId>>,
    },
    /// Full record in whatever state directory holds it, archived ones included.
    Get {
        id: OrderId,
        respond_to: Response<Option<Order>>,
    },
    PickerState { respond_to: Response<PickerState> },
    Register {
        observer: Box<dyn OrderObserver>,
        respond_to: Response<bool>,
    },
}

impl fmt::Debug for TrackerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackerRequest::Submit { params, .. } => f.debug_struct("Submit").field("params", params).finish(),
            TrackerRequest::Advance { .. } => f.write_str("Advance"),
            TrackerRequest::Complete { .. } => f.write_str("Complete"),
            TrackerRequest::Snapshot { .. } => f.write_str("Snapshot"),
            TrackerRequest::Oldest { state, .. } => f.debug_struct("Oldest").field("state", state).finish(),
            TrackerRequest::Get { id, .. } => f.debug_struct("Get").field("id", id).finish(),
            TrackerRequest::PickerState { .. } => f.write_str("PickerState"),
            TrackerRequest::Register { observer, .. } => {
                f.debug_struct("Register").field("observer", &observer.name()).finish()
            }
        }
    }
}
