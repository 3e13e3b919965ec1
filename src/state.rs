use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use derive_ex::derive_ex;
use serde::{Deserialize, Serialize};
use slabmap::SlabMap;

use crate::Subscription;


/// Similar to `Rc<RefCell<T>>`, but with added functionality to observe changes.
///
/// The value is only ever replaced as a whole, by [`submit`](Self::submit) or [`set`](Self::set).
/// Every replacement notifies the listeners registered with [`subscribe`](Self::subscribe).
///
/// Listeners may change the state again. Such a change is applied at once,
/// and the listeners are notified of it after the current round, with the latest value.
#[derive_ex(Clone, bound())]
pub struct State<T: 'static>(Rc<StateNode<T>>);

impl<T: 'static> State<T> {
    /// Create a new `State` with the given initial value.
    pub fn new(value: T) -> Self {
        Self(Rc::new(StateNode {
            value: RefCell::new(Rc::new(value)),
            listeners: RefCell::new(SlabMap::new()),
            notifying: Cell::new(false),
            dirty: Cell::new(false),
        }))
    }

    /// Gets a clone of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        T::clone(&**self.0.value.borrow())
    }

    /// Calls `f` with a reference to the current value.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&**self.0.value.borrow())
    }

    /// Replaces the value with the result of `f` applied to the current value, then notifies the listeners.
    ///
    /// Panics if called from `f`.
    pub fn submit(&self, f: impl FnOnce(&T) -> T) {
        let value = f(&**self.0.value.borrow());
        self.set(value);
    }

    /// Sets the value of the state and notifies the listeners.
    pub fn set(&self, value: T) {
        *self.0.value.borrow_mut() = Rc::new(value);
        self.0.schedule_notify();
    }

    /// Registers `f` to be called with the new value after every change.
    pub fn subscribe(&self, f: impl Fn(&T) + 'static) -> Subscription {
        let key = self.0.listeners.borrow_mut().insert(Rc::new(f));
        Subscription::from_weak_fn(Rc::downgrade(&self.0), move |node: &StateNode<T>| {
            node.listeners.borrow_mut().remove(key);
        })
    }

    pub fn listener_count(&self) -> usize {
        self.0.listeners.borrow().len()
    }
}
impl<T: Default + 'static> Default for State<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
impl<T: std::fmt::Debug + 'static> std::fmt::Debug for State<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0.value.try_borrow() {
            Ok(value) => std::fmt::Debug::fmt(&**value, f),
            Err(_) => write!(f, "<borrowed>"),
        }
    }
}
impl<T> Serialize for State<T>
where
    T: Serialize + 'static,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::ser::Serializer,
    {
        match self.0.value.try_borrow() {
            Ok(value) => T::serialize(&**value, serializer),
            Err(_) => Err(serde::ser::Error::custom("borrowed")),
        }
    }
}
impl<'de, T> Deserialize<'de> for State<T>
where
    T: Deserialize<'de> + 'static,
{
    fn deserialize<D>(deserializer: D) -> Result<State<T>, D::Error>
    where
        D: serde::de::Deserializer<'de>,
    {
        T::deserialize(deserializer).map(|value| State::new(value))
    }
}

type Listener<T> = Rc<dyn Fn(&T)>;

struct StateNode<T: 'static> {
    value: RefCell<Rc<T>>,
    listeners: RefCell<SlabMap<Listener<T>>>,
    notifying: Cell<bool>,
    dirty: Cell<bool>,
}
impl<T: 'static> StateNode<T> {
    fn schedule_notify(&self) {
        if self.notifying.replace(true) {
            self.dirty.set(true);
            return;
        }
        let _guard = NotifyGuard(&self.notifying);
        loop {
            self.dirty.set(false);
            self.notify_raw();
            if !self.dirty.get() {
                break;
            }
        }
    }
    fn notify_raw(&self) {
        let value = self.value.borrow().clone();
        let listeners: Vec<Listener<T>> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener(&*value);
        }
    }
}

struct NotifyGuard<'a>(&'a Cell<bool>);

impl Drop for NotifyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
