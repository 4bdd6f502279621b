use std::collections::HashMap;
use std::fmt::{Debug, Display};
use std::hash::Hash;

use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument, warn};

// =============================================================================
// 1. THE ABSTRACTION
// =============================================================================

/// Errors produced by the actor plumbing or by an entity's own hooks.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Item already exists: {0}")]
    AlreadyExists(String),
    #[error("Rejected: {0}")]
    Rejected(String),
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped")]
    ActorDropped,
}

/// Trait that any record must implement to be owned by a [`ResourceActor`].
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type CreateParams: Send + Sync + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    fn id(&self) -> &Self::Id;

    /// Builds the record from its creation parameters.
    ///
    /// `seq` is the next value of the actor's monotonic sequence. Entities that
    /// generate their own identity use it as the id; entities keyed by a foreign
    /// id (queue entries) use it as an ordinal instead.
    fn from_create_params(seq: u64, params: Self::CreateParams) -> Result<Self, FrameworkError>;

    /// Runs right before insertion. `existing` is the number of records already held.
    fn on_create(&mut self, _existing: usize) -> Result<(), FrameworkError> {
        Ok(())
    }

    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, FrameworkError>;
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Create {
        params: T::CreateParams,
        respond_to: Response<T::Id>,
    },
    Get {
        id: T::Id,
        respond_to: Response<Option<T>>,
    },
    List {
        respond_to: Response<Vec<T>>,
    },
    Delete {
        id: T::Id,
        respond_to: Response<()>,
    },
    Action {
        id: T::Id,
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

/// Single task owning a keyed collection. Every write to one record is applied
/// by this task alone, so per-record updates are atomic.
pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    store: HashMap<T::Id, T>,
    next_seq_fn: Box<dyn Fn() -> u64 + Send + Sync>,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(
        buffer_size: usize,
        next_seq_fn: impl Fn() -> u64 + Send + Sync + 'static,
    ) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            store: HashMap::new(),
            next_seq_fn: Box::new(next_seq_fn),
        };
        (actor, ResourceClient::new(sender))
    }

    #[instrument(name = "resource_actor", skip(self), fields(entity = std::any::type_name::<T>()))]
    pub async fn run(mut self) {
        debug!("Actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Create { params, respond_to } => {
                    let _ = respond_to.send(self.handle_create(params));
                }
                ResourceRequest::Get { id, respond_to } => {
                    let _ = respond_to.send(Ok(self.store.get(&id).cloned()));
                }
                ResourceRequest::List { respond_to } => {
                    let _ = respond_to.send(Ok(self.store.values().cloned().collect()));
                }
                ResourceRequest::Delete { id, respond_to } => {
                    let result = match self.store.remove(&id) {
                        Some(_) => Ok(()),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    let _ = respond_to.send(result);
                }
                ResourceRequest::Action { id, action, respond_to } => {
                    let result = match self.store.get_mut(&id) {
                        Some(item) => item.handle_action(action),
                        None => Err(FrameworkError::NotFound(id.to_string())),
                    };
                    if let Err(e) = &result {
                        warn!(id = %id, error = %e, "Action failed");
                    }
                    let _ = respond_to.send(result);
                }
            }
        }
        debug!("Actor stopped");
    }

    fn handle_create(&mut self, params: T::CreateParams) -> Result<T::Id, FrameworkError> {
        let seq = (self.next_seq_fn)();
        let mut item = T::from_create_params(seq, params)?;
        let id = item.id().clone();
        if self.store.contains_key(&id) {
            return Err(FrameworkError::AlreadyExists(id.to_string()));
        }
        item.on_create(self.store.len())?;
        self.store.insert(id.clone(), item);
        Ok(id)
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub(crate) fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    async fn request<R>(
        &self,
        build: impl FnOnce(Response<R>) -> ResourceRequest<T>,
    ) -> Result<R, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn create(&self, params: T::CreateParams) -> Result<T::Id, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Create { params, respond_to }).await
    }

    pub async fn get(&self, id: T::Id) -> Result<Option<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Get { id, respond_to }).await
    }

    pub async fn list(&self) -> Result<Vec<T>, FrameworkError> {
        self.request(|respond_to| ResourceRequest::List { respond_to }).await
    }

    pub async fn delete(&self, id: T::Id) -> Result<(), FrameworkError> {
        self.request(|respond_to| ResourceRequest::Delete { id, respond_to }).await
    }

    pub async fn perform_action(&self, id: T::Id, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        self.request(|respond_to| ResourceRequest::Action { id, action, respond_to }).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq)]
    struct Ticket {
        id: u64,
        label: String,
        ahead: usize,
        punched: bool,
    }

    #[derive(Debug)]
    struct TicketCreate {
        key: Option<u64>,
        label: String,
    }

    #[derive(Debug)]
    enum TicketAction {
        Punch,
    }

    impl Entity for Ticket {
        type Id = u64;
        type CreateParams = TicketCreate;
        type Action = TicketAction;
        type ActionResult = bool;

        fn id(&self) -> &u64 {
            &self.id
        }

        fn from_create_params(seq: u64, params: TicketCreate) -> Result<Self, FrameworkError> {
            if params.label.is_empty() {
                return Err(FrameworkError::Rejected("empty label".into()));
            }
            Ok(Self {
                id: params.key.unwrap_or(seq),
                label: params.label,
                ahead: 0,
                punched: false,
            })
        }

        fn on_create(&mut self, existing: usize) -> Result<(), FrameworkError> {
            self.ahead = existing;
            Ok(())
        }

        fn handle_action(&mut self, action: TicketAction) -> Result<bool, FrameworkError> {
            match action {
                TicketAction::Punch if self.punched => Ok(false),
                TicketAction::Punch => {
                    self.punched = true;
                    Ok(true)
                }
            }
        }
    }

    fn spawn_tickets() -> ResourceClient<Ticket> {
        let counter = Arc::new(AtomicU64::new(1));
        let next_seq = move || counter.fetch_add(1, Ordering::SeqCst);
        let (actor, client) = ResourceActor::new(10, next_seq);
        tokio::spawn(actor.run());
        client
    }

    fn ticket(label: &str) -> TicketCreate {
        TicketCreate { key: None, label: label.into() }
    }

    #[tokio::test]
    async fn test_create_get_and_action() {
        let client = spawn_tickets();

        let first = client.create(ticket("a")).await.unwrap();
        let second = client.create(ticket("b")).await.unwrap();
        assert_eq!((first, second), (1, 2));

        assert!(client.perform_action(first, TicketAction::Punch).await.unwrap());
        assert!(!client.perform_action(first, TicketAction::Punch).await.unwrap());

        let stored = client.get(second).await.unwrap().unwrap();
        assert_eq!(stored.ahead, 1);
        assert!(!stored.punched);
        assert_eq!(client.get(99).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_duplicate_and_rejected_creates() {
        let client = spawn_tickets();

        client.create(TicketCreate { key: Some(7), label: "x".into() }).await.unwrap();
        let dup = client.create(TicketCreate { key: Some(7), label: "y".into() }).await;
        assert_eq!(dup, Err(FrameworkError::AlreadyExists("7".into())));

        let empty = client.create(ticket("")).await;
        assert!(matches!(empty, Err(FrameworkError::Rejected(_))));
        assert_eq!(client.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_and_missing_action() {
        let client = spawn_tickets();
        let id = client.create(ticket("a")).await.unwrap();

        client.delete(id).await.unwrap();
        assert_eq!(client.delete(id).await, Err(FrameworkError::NotFound(id.to_string())));
        assert_eq!(
            client.perform_action(id, TicketAction::Punch).await,
            Err(FrameworkError::NotFound(id.to_string()))
        );
    }

    #[tokio::test]
    async fn test_closed_actor_reports_error() {
        let (actor, client) = ResourceActor::<Ticket>::new(1, || 1);
        drop(actor);
        assert_eq!(client.list().await, Err(FrameworkError::ActorClosed));
    }
}
