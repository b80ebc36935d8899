use crate::error::{Result, TrackerError};
use crate::hub::{ChannelObserver, OrderObserver};
use crate::model::{
    Order, OrderCreate, OrderDetail, OrderId, OrderLines, OrderSnapshot, OrderState, TrackerUpdate,
};
use crate::picker::PickerState;
use crate::tracker::message::{Response, TrackerRequest};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Handle to the tracker actor.
///
/// Cheap to clone: it only holds the sending half of the request queue. Pass
/// a clone to every customer session, to the picker and to every view that
/// wants to observe the order map.
#[derive(Clone)]
pub struct TrackerClient {
    sender: mpsc::Sender<TrackerRequest>,
}

impl TrackerClient {
    /// Wraps the sending half of the tracker's request queue.
    pub fn new(sender: mpsc::Sender<TrackerRequest>) -> Self {
        Self { sender }
    }

    /// Places an order. The caller has already validated stock and identity.
    #[instrument(skip(self, lines), fields(line_count = lines.len()))]
    pub async fn submit(&self, owner: &str, lines: OrderLines) -> Result<OrderId> {
        debug!("Sending request");
        let params = OrderCreate {
            owner: owner.to_string(),
            lines,
        };
        self.request(|respond_to| TrackerRequest::Submit { params, respond_to })
            .await
    }

    /// Checks out the oldest placed order for picking.
    #[instrument(skip(self))]
    pub async fn advance(&self) -> Result<OrderDetail> {
        debug!("Sending request");
        self.request(|respond_to| TrackerRequest::Advance { respond_to })
            .await
    }

    /// Archives the order the picker is working on.
    #[instrument(skip(self))]
    pub async fn complete(&self) -> Result<OrderId> {
        debug!("Sending request");
        self.request(|respond_to| TrackerRequest::Complete { respond_to })
            .await
    }

    /// Current id → state map of every order not yet collected.
    pub async fn snapshot(&self) -> Result<OrderSnapshot> {
        self.request(|respond_to| TrackerRequest::Snapshot { respond_to })
            .await
    }

    /// Smallest id currently in `state`.
    pub async fn oldest(&self, state: OrderState) -> Result<Option<OrderId>> {
        self.request(|respond_to| TrackerRequest::Oldest { state, respond_to })
            .await
    }

    /// Full record of `id` from whichever state directory holds it.
    #[instrument(skip(self))]
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        debug!("Sending request");
        self.request(|respond_to| TrackerRequest::Get { id, respond_to })
            .await
    }

    /// Whether the picker is idle or working on an order.
    pub async fn picker_state(&self) -> Result<PickerState> {
        self.request(|respond_to| TrackerRequest::PickerState { respond_to })
            .await
    }

    /// Registers an observer. It receives the current state before this returns.
    pub async fn register(&self, observer: impl OrderObserver + 'static) -> Result<bool> {
        let observer: Box<dyn OrderObserver> = Box::new(observer);
        self.request(|respond_to| TrackerRequest::Register {
            observer,
            respond_to,
        })
        .await
    }

    /// Registers a channel-backed observer and returns its receiving end.
    pub async fn subscribe(&self, name: &str) -> Result<mpsc::UnboundedReceiver<TrackerUpdate>> {
        let (observer, receiver) = ChannelObserver::new(name);
        self.register(observer).await?;
        Ok(receiver)
    }

    async fn request<T>(&self, build: impl FnOnce(Response<T>) -> TrackerRequest) -> Result<T> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| TrackerError::ActorClosed)?;
        response.await.map_err(|_| TrackerError::ActorDropped)?
    }
}
