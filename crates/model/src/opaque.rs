use std::any::Any;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::sync::Arc;

/// A provider-native copy of a model turn.
///
/// Some providers need more than text and tool calls to continue a
/// conversation. Gemini, for example, attaches thought signatures to its
/// function calls and expects them back verbatim in the next request. A
/// provider wraps its own wire message in an `OpaqueMessage`, and later
/// unwraps it with [`OpaqueMessage::downcast_ref`] when building the next
/// request. Other providers simply ignore it.
///
/// Two opaque messages are equal when their ids are equal.
#[derive(Clone)]
pub struct OpaqueMessage {
    id: Arc<str>,
    payload: Arc<dyn Any + Send + Sync>,
}

impl OpaqueMessage {
    /// Wraps `payload` under an id that is unique within the conversation.
    #[inline]
    pub fn new<ID, T>(id: ID, payload: T) -> Self
    where
        ID: AsRef<str>,
        T: Send + Sync + 'static,
    {
        Self {
            id: Arc::from(id.as_ref()),
            payload: Arc::new(payload),
        }
    }

    /// Returns the id of this message.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the payload if it has type `T`.
    #[inline]
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.payload.downcast_ref()
    }
}

impl Debug for OpaqueMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueMessage").field(&self.id).finish()
    }
}

impl PartialEq for OpaqueMessage {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for OpaqueMessage {}

impl Hash for OpaqueMessage {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
