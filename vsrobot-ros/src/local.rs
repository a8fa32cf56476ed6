//! In-process loopback transport.
//!
//! Useful for tests and simulations: odometry is injected with
//! [`LocalSession::publish_odometry`] and velocity commands are observed with
//! [`LocalSession::listen_twist`].

use std::{
    collections::HashMap,
    fmt,
    sync::{
        atomic::{AtomicBool, AtomicU64, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use flume::{Receiver, RecvTimeoutError, Sender, TrySendError};
use parking_lot::Mutex;
use tracing::{debug, trace, warn};
use vsrobot::Error;

use crate::{
    config::DEFAULT_MASTER_URI,
    transport::{remapping_arg, MASTER_ARG_PREFIX},
    Connector, OdometryCallback, OdometrySample, Session, Subscription, Twist, TwistPublisher,
};

const DISPATCH_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// A bounded queue that drops the oldest message when full.
#[derive(Debug)]
struct Inbox<T> {
    id: u64,
    tx: Sender<T>,
    // Used only to discard the oldest message.
    rx: Receiver<T>,
}

impl<T> Inbox<T> {
    fn new(id: u64, queue_size: usize) -> (Self, Receiver<T>) {
        let (tx, rx) = flume::bounded(queue_size.max(1));
        (
            Self {
                id,
                tx,
                rx: rx.clone(),
            },
            rx,
        )
    }

    fn push(&self, mut message: T) -> bool {
        loop {
            match self.tx.try_send(message) {
                Ok(()) => return true,
                Err(TrySendError::Full(m)) => {
                    if self.rx.try_recv().is_ok() {
                        trace!(id = self.id, "queue full, dropped the oldest message");
                    }
                    message = m;
                }
                Err(TrySendError::Disconnected(_)) => return false,
            }
        }
    }
}

#[derive(Debug, Default)]
struct Topics {
    odometry: HashMap<String, Vec<Inbox<OdometrySample>>>,
    twist: HashMap<String, Vec<Sender<Twist>>>,
    advertised: HashMap<String, usize>,
}

/// Loopback [`Session`]: publishers and subscribers of the same session talk
/// to each other directly.
pub struct LocalSession {
    master_uri: String,
    topics: Arc<Mutex<Topics>>,
    next_id: AtomicU64,
}

impl fmt::Debug for LocalSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalSession")
            .field("master_uri", &self.master_uri)
            .finish_non_exhaustive()
    }
}

impl LocalSession {
    pub fn new(master_uri: &str) -> Self {
        Self {
            master_uri: master_uri.to_owned(),
            topics: Arc::new(Mutex::new(Topics::default())),
            next_id: AtomicU64::new(0),
        }
    }

    /// Delivers `sample` to every subscriber of `topic`, and returns how many
    /// subscribers there were.
    pub fn publish_odometry(&self, topic: &str, sample: OdometrySample) -> usize {
        let topics = self.topics.lock();
        topics
            .odometry
            .get(topic)
            .map_or(0, |inboxes| inboxes.iter().filter(|i| i.push(sample)).count())
    }

    /// Returns a receiver of every twist published on `topic` from now on.
    pub fn listen_twist(&self, topic: &str) -> Receiver<Twist> {
        let (tx, rx) = flume::unbounded();
        self.topics
            .lock()
            .twist
            .entry(topic.to_owned())
            .or_default()
            .push(tx);
        rx
    }

    pub fn subscriber_count(&self, topic: &str) -> usize {
        self.topics.lock().odometry.get(topic).map_or(0, Vec::len)
    }

    pub fn publisher_count(&self, topic: &str) -> usize {
        self.topics
            .lock()
            .advertised
            .get(topic)
            .copied()
            .unwrap_or(0)
    }
}

impl Session for LocalSession {
    fn master_uri(&self) -> String {
        self.master_uri.clone()
    }

    fn advertise(&self, topic: &str, queue_size: usize) -> Result<Box<dyn TwistPublisher>, Error> {
        debug!(topic, queue_size, "advertise");
        *self
            .topics
            .lock()
            .advertised
            .entry(topic.to_owned())
            .or_default() += 1;
        Ok(Box::new(LocalPublisher {
            topic: topic.to_owned(),
            topics: self.topics.clone(),
        }))
    }

    fn subscribe(
        &self,
        topic: &str,
        queue_size: usize,
        callback: OdometryCallback,
    ) -> Result<Box<dyn Subscription>, Error> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (inbox, rx) = Inbox::new(id, queue_size);
        let is_done = Arc::new(AtomicBool::new(false));
        let is_done_clone = is_done.clone();
        let handle = thread::Builder::new()
            .name(format!("vsrobot-local-dispatch-{id}"))
            .spawn(move || {
                while !is_done_clone.load(Ordering::Relaxed) {
                    match rx.recv_timeout(DISPATCH_POLL_INTERVAL) {
                        Ok(sample) => callback(sample),
                        Err(RecvTimeoutError::Timeout) => {}
                        Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| Error::Connection {
                message: format!("failed to spawn dispatch thread for {topic}: {e}"),
            })?;
        self.topics
            .lock()
            .odometry
            .entry(topic.to_owned())
            .or_default()
            .push(inbox);
        debug!(topic, queue_size, id, "subscribe");
        Ok(Box::new(LocalSubscription {
            id,
            topic: topic.to_owned(),
            topics: self.topics.clone(),
            is_done,
            handle: Some(handle),
        }))
    }
}

struct LocalPublisher {
    topic: String,
    topics: Arc<Mutex<Topics>>,
}

impl TwistPublisher for LocalPublisher {
    fn publish(&self, twist: Twist) -> Result<(), Error> {
        let mut topics = self.topics.lock();
        if let Some(listeners) = topics.twist.get_mut(&self.topic) {
            listeners.retain(|tx| tx.send(twist).is_ok());
        }
        Ok(())
    }
}

impl Drop for LocalPublisher {
    fn drop(&mut self) {
        let mut topics = self.topics.lock();
        if let Some(count) = topics.advertised.get_mut(&self.topic) {
            *count = count.saturating_sub(1);
        }
    }
}

struct LocalSubscription {
    id: u64,
    topic: String,
    topics: Arc<Mutex<Topics>>,
    is_done: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl Subscription for LocalSubscription {}

impl Drop for LocalSubscription {
    fn drop(&mut self) {
        self.is_done.store(true, Ordering::Relaxed);
        if let Some(inboxes) = self.topics.lock().odometry.get_mut(&self.topic) {
            inboxes.retain(|inbox| inbox.id != self.id);
        }
        if let Some(handle) = self.handle.take() {
            // Joining from the dispatch thread itself would never return.
            if handle.thread().id() != thread::current().id() && handle.join().is_err() {
                warn!(topic = %self.topic, "odometry callback panicked");
            }
        }
        debug!(topic = %self.topic, id = self.id, "unsubscribed");
    }
}

/// [`Connector`] for [`LocalSession`]s. Plays the role of the process-wide
/// middleware state: at most one session, created on first connect.
#[derive(Debug, Default)]
pub struct LocalConnector {
    session: Mutex<Option<Arc<LocalSession>>>,
}

impl LocalConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a connector whose session is already running.
    pub fn with_session(session: Arc<LocalSession>) -> Self {
        Self {
            session: Mutex::new(Some(session)),
        }
    }

    pub fn session(&self) -> Option<Arc<LocalSession>> {
        self.session.lock().clone()
    }
}

impl Connector for LocalConnector {
    fn current(&self) -> Option<Arc<dyn Session>> {
        self.session().map(|s| s as Arc<dyn Session>)
    }

    fn connect(&self, args: &[String]) -> Result<Arc<dyn Session>, Error> {
        let mut session = self.session.lock();
        if let Some(s) = &*session {
            return Ok(s.clone());
        }
        let master_uri = remapping_arg(args, MASTER_ARG_PREFIX).unwrap_or(DEFAULT_MASTER_URI);
        debug!(master_uri, "starting local session");
        let s = Arc::new(LocalSession::new(master_uri));
        *session = Some(s.clone());
        Ok(s)
    }
}
