use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::hub::NotificationHub;
use crate::index::OrderIndex;
use crate::lifecycle::bootstrap::prepare_layout;
use crate::model::{Order, OrderCreate, OrderDetail, OrderId, OrderState, TrackerUpdate};
use crate::picker::PickerWorkflow;
use crate::store::{IdAllocator, OrderStore};
use crate::tracker::client::TrackerClient;
use crate::tracker::message::TrackerRequest;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The task that owns every piece of tracker state.
///
/// **Concurrency Model**:
/// Customer sessions and the picker all talk to one `TrackerActor` through
/// cloned [`TrackerClient`]s. The actor handles one request at a time, so the
/// counter, the record directories and the index are always changed together
/// and never observed half-way. Observers are notified before the request is
/// answered.
pub struct TrackerActor {
    receiver: mpsc::Receiver<TrackerRequest>,
    allocator: IdAllocator,
    store: OrderStore,
    index: OrderIndex,
    hub: NotificationHub,
    picker: PickerWorkflow,
    active: Option<OrderDetail>,
}

impl TrackerActor {
    /// Builds the actor from the on-disk layout and returns it with its client.
    ///
    /// Missing directories are created first. The index is rebuilt from the
    /// record directories. If an order was left in progress, the picker
    /// resumes it.
    pub async fn open(config: &TrackerConfig) -> Result<(Self, TrackerClient)> {
        prepare_layout(config).await?;
        let store = OrderStore::new(config);
        let allocator = IdAllocator::new(config.counter_path());
        let mut index = OrderIndex::new();
        index.initialize(&store).await?;

        let last_allocated = allocator.peek().await?;
        let newest_live = index.snapshot().iter().last().map(|(id, _)| id);
        let newest_archived = store.highest_id(OrderState::Done).await?;
        if let Some(newest) = newest_live.max(newest_archived) {
            if newest.0 > last_allocated {
                warn!(
                    counter = last_allocated,
                    newest = %newest,
                    "Order counter is behind the stored records; colliding ids will be burned"
                );
            }
        }

        let (picker, active) = match index.oldest(OrderState::InProgress) {
            Some(id) => {
                let order = store.read(id, OrderState::InProgress).await?;
                info!(order_id = %id, "Picker resumes order left in progress");
                (PickerWorkflow::resume(id), Some(OrderDetail::from(order)))
            }
            None => (PickerWorkflow::new(), None),
        };

        let (sender, receiver) = mpsc::channel(config.channel_capacity);
        let actor = Self {
            receiver,
            allocator,
            store,
            index,
            hub: NotificationHub::new(),
            picker,
            active,
        };
        Ok((actor, TrackerClient::new(sender)))
    }

    /// Runs the event loop until every client has been dropped.
    pub async fn run(mut self) {
        info!(size = self.index.len(), picker = %self.picker.state(), "Tracker started");

        while let Some(msg) = self.receiver.recv().await {
            debug!(request = ?msg, "Request");
            match msg {
                TrackerRequest::Submit { params, respond_to } => {
                    let result = self.submit(params).await;
                    if let Err(e) = &result {
                        warn!(error = %e, "Submit failed");
                    }
                    let _ = respond_to.send(result);
                }
                TrackerRequest::Advance { respond_to } => {
                    let result = self.advance().await;
                    if let Err(e) = &result {
                        warn!(error = %e, "Advance failed");
                    }
                    let _ = respond_to.send(result);
                }
                TrackerRequest::Complete { respond_to } => {
                    let result = self.complete().await;
                    if let Err(e) = &result {
                        warn!(error = %e, "Complete failed");
                    }
                    let _ = respond_to.send(result);
                }
                TrackerRequest::Snapshot { respond_to } => {
                    let _ = respond_to.send(Ok(self.index.snapshot()));
                }
                TrackerRequest::Oldest { state, respond_to } => {
                    let _ = respond_to.send(Ok(self.index.oldest(state)));
                }
                TrackerRequest::Get { id, respond_to } => {
                    let result = self.get(id).await;
                    debug!(order_id = %id, found = matches!(result, Ok(Some(_))), "Get");
                    let _ = respond_to.send(result);
                }
                TrackerRequest::PickerState { respond_to } => {
                    let _ = respond_to.send(Ok(self.picker.state()));
                }
                TrackerRequest::Register {
                    observer,
                    respond_to,
                } => {
                    let current = self.current_update();
                    let kept = self.hub.register(observer, &current);
                    let _ = respond_to.send(Ok(kept));
                }
            }
        }

        info!(size = self.index.len(), observers = self.hub.len(), "Shutdown");
    }

    async fn submit(&mut self, params: OrderCreate) -> Result<OrderId> {
        if params.lines.is_empty() {
            return Err(TrackerError::InvalidOrder("order has no lines".to_string()));
        }
        if let Some((product, _)) = params.lines.iter().find(|(_, q)| **q == 0) {
            return Err(TrackerError::InvalidOrder(format!(
                "zero quantity for product {product}"
            )));
        }

        let id = self.allocator.next().await?;
        let order = Order::new(id, params.owner, params.lines);
        if let Err(e) = self.store.create(&order).await {
            warn!(order_id = %id, error = %e, "Order id burned");
            return Err(e);
        }
        self.index.apply(id, OrderState::Placed);
        info!(order_id = %id, owner = %order.owner, items = order.item_count(), size = self.index.len(), "Placed");
        self.publish();
        Ok(id)
    }

    async fn advance(&mut self) -> Result<OrderDetail> {
        self.picker.ensure_idle()?;
        let id = self
            .index
            .oldest(OrderState::Placed)
            .ok_or(TrackerError::NoOrderAvailable)?;

        let order = match self
            .store
            .transition(id, OrderState::Placed, OrderState::InProgress)
            .await
        {
            Ok(order) => order,
            Err(e) => {
                if self.reconcile(id, &e).await {
                    self.publish();
                }
                return Err(e);
            }
        };
        self.index.apply(id, OrderState::InProgress);
        self.picker.begin(id)?;

        let detail = OrderDetail::from(order);
        self.active = Some(detail.clone());
        info!(order_id = %id, owner = %detail.owner, "Picking started");
        self.publish();
        Ok(detail)
    }

    async fn complete(&mut self) -> Result<OrderId> {
        let id = self.picker.ensure_working()?;
        if let Err(e) = self
            .store
            .transition(id, OrderState::InProgress, OrderState::Done)
            .await
        {
            if self.reconcile(id, &e).await {
                if self.index.state_of(id) != Some(OrderState::InProgress) {
                    self.picker.finish()?;
                    self.active = None;
                    warn!(order_id = %id, "Picker released order missing from progress");
                }
                self.publish();
            }
            return Err(e);
        }
        self.index.apply(id, OrderState::Done);
        self.picker.finish()?;
        self.active = None;
        info!(order_id = %id, size = self.index.len(), "Collected");
        self.publish();
        Ok(id)
    }

    /// Realigns the index entry for `id` with the store after a failed
    /// transition. Returns whether the index changed.
    ///
    /// A missing record is looked up in every state directory. A corrupt one
    /// leaves the live view, as it would on the next startup scan.
    async fn reconcile(&mut self, id: OrderId, error: &TrackerError) -> bool {
        let found = match error {
            TrackerError::NotFound { .. } => match self.store.locate(id).await {
                Ok(found) => found,
                Err(e) => {
                    warn!(order_id = %id, error = %e, "Cannot locate record, index left as is");
                    return false;
                }
            },
            TrackerError::CorruptRecord { .. } => None,
            _ => return false,
        };

        let before = self.index.state_of(id);
        match found {
            Some(state) => self.index.apply(id, state),
            None => self.index.remove(id),
        }
        let after = self.index.state_of(id);
        if before != after {
            warn!(order_id = %id, ?before, ?after, "Index realigned with store");
        }
        before != after
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>> {
        match self.store.locate(id).await? {
            Some(state) => self.store.read(id, state).await.map(Some),
            None => Ok(None),
        }
    }

    fn current_update(&self) -> TrackerUpdate {
        TrackerUpdate {
            snapshot: self.index.snapshot(),
            detail: self.active.clone(),
        }
    }

    fn publish(&mut self) {
        let update = self.current_update();
        self.hub.notify_all(&update);
    }
}
