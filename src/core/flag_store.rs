// src/core/flag_store.rs

use crate::models::{DynamicFlagValue, Flags, Operation};
use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

/// Source of the flag values an operation runs with.
pub trait FlagSource: fmt::Debug {
    /// The flags parsed at process start.
    fn initial_flags(&self) -> Rc<Flags>;

    /// The flags as seen by `operation`, its overrides layered on top.
    fn operation_flags(&self, operation: &Operation) -> Rc<Flags>;
}

/// Owns the parsed flags and the per-operation views derived from them.
///
/// Views are computed on first request and cached by operation name for the
/// lifetime of the store. Entries are never invalidated: replacing the
/// initial flags afterwards does not affect views that were already handed out.
/// The cache uses a `RefCell`, so the store is meant for a single caller thread.
#[derive(Debug)]
pub struct FlagStore {
    initial_flags: Rc<Flags>,
    operation_flags: RefCell<HashMap<String, Rc<Flags>>>,
}

impl FlagStore {
    pub fn new(initial_flags: Flags) -> Self {
        Self {
            initial_flags: Rc::new(initial_flags),
            operation_flags: RefCell::new(HashMap::new()),
        }
    }

    /// Swaps the initial flags. Views cached before the call are kept as they are.
    #[cfg(test)]
    fn replace_initial_flags(&mut self, flags: Flags) {
        self.initial_flags = Rc::new(flags);
    }

    fn enhance_flags(&self, operation: &Operation) -> Rc<Flags> {
        if operation.predefined_flags.is_empty() {
            return Rc::clone(&self.initial_flags);
        }

        let mut flags = Flags::clone(&self.initial_flags);
        for predefined in &operation.predefined_flags {
            flags.insert(DynamicFlagValue::string(
                &predefined.name,
                &predefined.value,
            ));
        }

        log::trace!(
            "Derived flags for operation '{}' with {} override(s)",
            operation.name,
            operation.predefined_flags.len()
        );
        Rc::new(flags)
    }
}

impl FlagSource for FlagStore {
    fn initial_flags(&self) -> Rc<Flags> {
        Rc::clone(&self.initial_flags)
    }

    fn operation_flags(&self, operation: &Operation) -> Rc<Flags> {
        if let Some(cached) = self.operation_flags.borrow().get(&operation.name) {
            return Rc::clone(cached);
        }

        let flags = self.enhance_flags(operation);
        self.operation_flags
            .borrow_mut()
            .insert(operation.name.clone(), Rc::clone(&flags));
        flags
    }
}
