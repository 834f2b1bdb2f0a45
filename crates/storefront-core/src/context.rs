//! Typed provider map passed down from the root view.
//!
//! Stores are owned by the root and handed to consumers through a
//! [`LocalContext`] rather than living in globals.

use std::any::{type_name, Any, TypeId};
use std::rc::Rc;

use crate::error::CoreError;
use crate::map::HashMap;

#[derive(Default, Clone)]
pub struct LocalContext {
    values: HashMap<TypeId, Rc<dyn Any>>,
}

impl LocalContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Provides `value`, replacing any previous value of the same type.
    pub fn provide<T: 'static>(&mut self, value: T) -> &mut Self {
        let value: Rc<dyn Any> = Rc::new(value);
        self.values.insert(TypeId::of::<T>(), value);
        self
    }

    pub fn get<T: 'static>(&self) -> Option<Rc<T>> {
        self.values
            .get(&TypeId::of::<T>())
            .cloned()
            .and_then(|value| value.downcast::<T>().ok())
    }

    pub fn require<T: 'static>(&self) -> Result<Rc<T>, CoreError> {
        self.get::<T>().ok_or(CoreError::MissingContext {
            type_name: type_name::<T>(),
        })
    }

    pub fn contains<T: 'static>(&self) -> bool {
        self.values.contains_key(&TypeId::of::<T>())
    }
}
