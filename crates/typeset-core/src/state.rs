//! Type-erased lexer state.
//!
//! Each language tokenizer declares its own strongly typed state struct. The engine threads
//! those values from line to line without knowing their type, so it stores them as a
//! [`LexerState`]: a boxed value that still supports deep equality, deep cloning, hashing by
//! value (the cache fingerprint) and JSON serialization.

use rustc_hash::FxHasher;
use serde::{Serialize, Serializer};
use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Requirements for a language's state type.
pub trait StateValue: Clone + Eq + Hash + fmt::Debug + Serialize + Send + Sync + 'static {}

impl<T> StateValue for T where T: Clone + Eq + Hash + fmt::Debug + Serialize + Send + Sync + 'static
{}

trait ErasedState: fmt::Debug + Send + Sync {
    fn clone_box(&self) -> Box<dyn ErasedState>;
    fn eq_dyn(&self, other: &dyn ErasedState) -> bool;
    fn hash_dyn(&self, hasher: &mut dyn Hasher);
    fn to_json(&self) -> serde_json::Value;
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: StateValue> ErasedState for T {
    fn clone_box(&self) -> Box<dyn ErasedState> {
        Box::new(self.clone())
    }

    fn eq_dyn(&self, other: &dyn ErasedState) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self == other)
    }

    fn hash_dyn(&self, mut hasher: &mut dyn Hasher) {
        TypeId::of::<T>().hash(&mut hasher);
        self.hash(&mut hasher);
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Opaque per-line lexer state.
///
/// Cloning is deep: every line owns an independent copy.
pub struct LexerState(Box<dyn ErasedState>);

impl LexerState {
    /// Wrap a typed language state.
    pub fn new<T: StateValue>(value: T) -> Self {
        Self(Box::new(value))
    }

    /// The state of a stateless tokenizer.
    pub fn unit() -> Self {
        Self::new(())
    }

    /// Returns `true` if the wrapped value is a `T`.
    pub fn is<T: StateValue>(&self) -> bool {
        self.0.as_any().is::<T>()
    }

    /// Borrow the wrapped value as a `T`.
    pub fn downcast_ref<T: StateValue>(&self) -> Option<&T> {
        self.0.as_any().downcast_ref::<T>()
    }

    /// Mutably borrow the wrapped value as a `T`.
    pub fn downcast_mut<T: StateValue>(&mut self) -> Option<&mut T> {
        self.0.as_any_mut().downcast_mut::<T>()
    }

    /// Value hash of the state, used as the line cache fingerprint.
    ///
    /// Two states that compare equal always have the same fingerprint.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = FxHasher::default();
        self.0.hash_dyn(&mut hasher);
        hasher.finish()
    }

    /// Serialize the state to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        self.0.to_json()
    }
}

impl Default for LexerState {
    fn default() -> Self {
        Self::unit()
    }
}

impl Clone for LexerState {
    fn clone(&self) -> Self {
        Self(self.0.clone_box())
    }
}

impl PartialEq for LexerState {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_dyn(&*other.0)
    }
}

impl Eq for LexerState {}

impl Hash for LexerState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_u64(self.fingerprint());
    }
}

impl fmt::Debug for LexerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl Serialize for LexerState {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.to_json().serialize(serializer)
    }
}
