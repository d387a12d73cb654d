//! Shared mutable state that plugins read and mutate.
//!
//! The [`Workspace`] is owned by the host and handed to plugins as an
//! `Rc<Workspace>`. It uses single-threaded interior mutability and is
//! therefore neither `Send` nor `Sync`: code running on another thread
//! cannot obtain it except through the
//! [`Dispatcher`](crate::dispatcher::Dispatcher).
//!
//! Optional domain capabilities (the paper model, individual effects) are
//! stored by type and looked up with [`Workspace::capability`] or
//! [`Workspace::effect`]; absence is an ordinary `None`.

use std::any::{Any, TypeId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::effect::{Effect, Tool};

type CapabilityMap = HashMap<TypeId, Arc<dyn Any + Send + Sync>>;

/// Raised when selecting a tool that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("tool '{name}' is not registered in the workspace")]
pub struct UnknownTool {
    /// Name that was requested.
    pub name: String,
}

/// Host-owned state shared by every plugin in a run.
#[derive(Default)]
pub struct Workspace {
    effects: RefCell<Vec<Arc<dyn Effect>>>,
    tools: RefCell<Vec<Arc<dyn Tool>>>,
    current_tool: RefCell<Option<Arc<dyn Tool>>>,
    capabilities: RefCell<CapabilityMap>,
}

impl Workspace {
    /// Creates an empty workspace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an effect to the toolbar list and makes it queryable by type.
    pub fn add_effect<E: Effect>(&self, effect: Arc<E>) {
        self.effects
            .borrow_mut()
            .push(Arc::clone(&effect) as Arc<dyn Effect>);
        self.insert_capability(effect);
    }

    /// Returns the registered effects in registration order.
    #[must_use]
    pub fn effects(&self) -> Vec<Arc<dyn Effect>> {
        self.effects.borrow().clone()
    }

    /// Looks up an effect by its concrete type.
    #[must_use]
    pub fn effect<E: Effect>(&self) -> Option<Arc<E>> {
        self.capability::<E>()
    }

    /// Adds a tool to the toolbox. The first tool added becomes current.
    pub fn add_tool(&self, tool: Arc<dyn Tool>) {
        let mut current = self.current_tool.borrow_mut();
        if current.is_none() {
            *current = Some(Arc::clone(&tool));
        }
        self.tools.borrow_mut().push(tool);
    }

    /// Returns the registered tools in registration order.
    #[must_use]
    pub fn tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.borrow().clone()
    }

    /// Returns the currently active tool.
    #[must_use]
    pub fn current_tool(&self) -> Option<Arc<dyn Tool>> {
        self.current_tool.borrow().clone()
    }

    /// Activates the tool called `name`.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownTool`] when no registered tool has that name.
    pub fn select_tool(&self, name: &str) -> Result<(), UnknownTool> {
        let tool = self
            .tools
            .borrow()
            .iter()
            .find(|tool| tool.name() == name)
            .cloned()
            .ok_or_else(|| UnknownTool {
                name: name.to_owned(),
            })?;
        tracing::debug!(
            target: "orimath_plugins::workspace",
            event = "tool_selected",
            tool = name,
            "tool selected"
        );
        *self.current_tool.borrow_mut() = Some(tool);
        Ok(())
    }

    /// Stores a capability, replacing any previous value of the same type.
    pub fn insert_capability<T: Any + Send + Sync>(&self, capability: Arc<T>) {
        self.capabilities
            .borrow_mut()
            .insert(TypeId::of::<T>(), capability);
    }

    /// Looks up an optional capability by type.
    #[must_use]
    pub fn capability<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        let entry = self.capabilities.borrow().get(&TypeId::of::<T>()).cloned()?;
        entry.downcast::<T>().ok()
    }
}

impl fmt::Debug for Workspace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let effects: Vec<String> = self
            .effects
            .borrow()
            .iter()
            .map(|effect| effect.name().to_owned())
            .collect();
        let tools: Vec<String> = self
            .tools
            .borrow()
            .iter()
            .map(|tool| tool.name().to_owned())
            .collect();
        f.debug_struct("Workspace")
            .field("effects", &effects)
            .field("tools", &tools)
            .field("capabilities", &self.capabilities.borrow().len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
