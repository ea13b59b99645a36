use crossbeam::channel::{unbounded, Receiver, Sender};
use simplelog::debug;

/// A push stream towards a single listener, in the manner of a platform event channel.
///
/// Events sent while nobody listens are dropped. Attaching a new listener replaces the
/// previous one. Receivers can live on any thread.
pub struct EventChannel<T> {
    name: String,
    sink: Option<Sender<T>>,
}

impl<T> EventChannel<T> {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            sink: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attaches a listener and returns the receiving end of the stream.
    pub fn listen(&mut self) -> Receiver<T> {
        let (sender, receiver) = unbounded();
        self.sink = Some(sender);
        debug!("Listener attached to {}", self.name);
        receiver
    }

    pub fn cancel(&mut self) {
        if self.sink.take().is_some() {
            debug!("Listener detached from {}", self.name);
        }
    }

    pub fn has_listener(&self) -> bool {
        self.sink.is_some()
    }

    pub fn send(&mut self, event: T) {
        if let Some(sink) = &self.sink {
            if sink.send(event).is_err() {
                // The receiver was dropped
                self.cancel();
            }
        }
    }
}
