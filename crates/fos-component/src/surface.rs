//! Dispatch surface
//!
//! The handle reachable from a bound element: call it without a method name
//! to get the instance, or with one to invoke that method.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{Component, ComponentError, OptionValue, Options, dispatch};

/// Result of calling a dispatch surface
pub enum Dispatched<C> {
    Instance(Rc<RefCell<C>>),
    Value(OptionValue),
}

impl<C> Dispatched<C> {
    pub fn into_instance(self) -> Option<Rc<RefCell<C>>> {
        match self {
            Self::Instance(instance) => Some(instance),
            Self::Value(_) => None,
        }
    }

    pub fn into_value(self) -> Option<OptionValue> {
        match self {
            Self::Value(value) => Some(value),
            Self::Instance(_) => None,
        }
    }
}

impl<C> fmt::Debug for Dispatched<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Instance(_) => f.write_str("Instance(..)"),
            Self::Value(v) => f.debug_tuple("Value").field(v).finish(),
        }
    }
}

/// Dispatch surface bound to one instance
pub struct DispatchSurface<C: Component> {
    instance: Rc<RefCell<C>>,
}

impl<C: Component> DispatchSurface<C> {
    pub(crate) fn new(instance: Rc<RefCell<C>>) -> Self {
        Self { instance }
    }

    /// Get-or-call entry point
    pub fn call(&self, method: Option<&str>, options: &Options) -> Result<Dispatched<C>, ComponentError> {
        match method {
            None => Ok(Dispatched::Instance(self.instance())),
            Some(name) => self.invoke(name, options).map(Dispatched::Value),
        }
    }

    pub fn instance(&self) -> Rc<RefCell<C>> {
        Rc::clone(&self.instance)
    }

    /// Invoke `method` on the instance
    ///
    /// Fails with `InstanceBorrowed` when the instance is already borrowed,
    /// e.g. from one of its own event listeners while a method runs.
    pub fn invoke(&self, method: &str, options: &Options) -> Result<OptionValue, ComponentError> {
        let mut instance = self
            .instance
            .try_borrow_mut()
            .map_err(|_| ComponentError::InstanceBorrowed { component: C::NAME })?;
        dispatch(&mut *instance, method, options)
    }

    /// Name of the component that owns this surface
    pub fn constructor(&self) -> &'static str {
        C::NAME
    }
}

impl<C: Component> Clone for DispatchSurface<C> {
    fn clone(&self) -> Self {
        Self::new(self.instance())
    }
}

impl<C: Component> fmt::Debug for DispatchSurface<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchSurface")
            .field("constructor", &C::NAME)
            .finish()
    }
}
