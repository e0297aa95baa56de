//! In-memory todo store.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

/// A todo item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique, assigned by the store in increasing order
    pub id: u64,
    /// Item text
    pub text: String,
    /// Completion flag
    pub completed: bool,
}

/// Fields to change on an existing todo. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TodoUpdate {
    /// New text
    pub text: Option<String>,
    /// New completion flag
    pub completed: Option<bool>,
}

#[derive(Debug)]
struct Table {
    todos: BTreeMap<u64, Todo>,
    next_id: u64,
}

const SEED: [&str; 4] = [
    "Learn axum",
    "Refactor the API proxy",
    "Write README.md",
    "Have a coffee",
];

/// Mutex-guarded todo map. Iteration follows id order, which is creation
/// order.
#[derive(Debug)]
pub struct TodoStore {
    table: Mutex<Table>,
}

impl Default for TodoStore {
    fn default() -> Self {
        Self::seeded()
    }
}

impl TodoStore {
    /// Creates a store with no todos.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            table: Mutex::new(Table {
                todos: BTreeMap::new(),
                next_id: 1,
            }),
        }
    }

    /// Creates a store with four sample todos, the first two completed.
    #[must_use]
    pub fn seeded() -> Self {
        let store = Self::empty();
        for (index, text) in SEED.iter().enumerate() {
            let todo = store.create(*text);
            if index < 2 {
                store.update(
                    todo.id,
                    TodoUpdate {
                        completed: Some(true),
                        ..TodoUpdate::default()
                    },
                );
            }
        }
        store
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns every todo in creation order.
    #[must_use]
    pub fn get_all(&self) -> Vec<Todo> {
        self.lock().todos.values().cloned().collect()
    }

    /// Looks up a todo.
    #[must_use]
    pub fn find_by_id(&self, id: u64) -> Option<Todo> {
        self.lock().todos.get(&id).cloned()
    }

    /// Adds an open todo and returns it.
    pub fn create(&self, text: impl Into<String>) -> Todo {
        let mut table = self.lock();
        let todo = Todo {
            id: table.next_id,
            text: text.into(),
            completed: false,
        };
        table.next_id += 1;
        table.todos.insert(todo.id, todo.clone());
        todo
    }

    /// Applies `update` and returns the result, or `None` for an unknown id.
    pub fn update(&self, id: u64, update: TodoUpdate) -> Option<Todo> {
        let mut table = self.lock();
        let todo = table.todos.get_mut(&id)?;
        if let Some(text) = update.text {
            todo.text = text;
        }
        if let Some(completed) = update.completed {
            todo.completed = completed;
        }
        Some(todo.clone())
    }

    /// Removes a todo. Returns `false` for an unknown id.
    pub fn remove(&self, id: u64) -> bool {
        self.lock().todos.remove(&id).is_some()
    }
}
