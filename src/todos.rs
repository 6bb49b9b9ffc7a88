use serde::{Deserialize, Serialize};

use crate::domain::{Todo, TodoId};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoList {
    items: Vec<Todo>,
}

impl TodoList {
    pub fn from_items(items: Vec<Todo>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Todo] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn open_count(&self) -> usize {
        self.items.iter().filter(|todo| !todo.completed).count()
    }

    /// Newest todos go first. Blank text is ignored.
    pub fn add(&self, text: &str) -> TodoList {
        if text.trim().is_empty() {
            return self.clone();
        }

        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.push(Todo {
            id: TodoId::fresh(),
            text: text.to_string(),
            completed: false,
        });
        items.extend(self.items.iter().cloned());
        TodoList { items }
    }

    pub fn toggle(&self, id: &TodoId) -> TodoList {
        let items = self
            .items
            .iter()
            .map(|todo| {
                if &todo.id == id {
                    Todo {
                        completed: !todo.completed,
                        ..todo.clone()
                    }
                } else {
                    todo.clone()
                }
            })
            .collect();
        TodoList { items }
    }

    pub fn delete(&self, id: &TodoId) -> TodoList {
        let items = self
            .items
            .iter()
            .filter(|todo| &todo.id != id)
            .cloned()
            .collect();
        TodoList { items }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_prepends_open_todo() {
        let list = TodoList::default().add("first").add("second");
        assert_eq!(list.len(), 2);
        assert_eq!(list.items()[0].text, "second");
        assert_eq!(list.items()[1].text, "first");
        assert!(list.items().iter().all(|todo| !todo.completed));
        assert_ne!(list.items()[0].id, list.items()[1].id);
    }

    #[test]
    fn test_add_ignores_blank_text() {
        let list = TodoList::default().add("").add("   \t");
        assert!(list.is_empty());
    }

    #[test]
    fn test_toggle_flips_only_target() {
        let list = TodoList::default().add("a").add("b");
        let target = list.items()[1].id.clone();

        let toggled = list.toggle(&target);
        assert!(!toggled.items()[0].completed);
        assert!(toggled.items()[1].completed);
        assert_eq!(toggled.open_count(), 1);

        let back = toggled.toggle(&target);
        assert_eq!(back, list);
    }

    #[test]
    fn test_unknown_ids_are_noops() {
        let list = TodoList::default().add("a");
        let ghost = TodoId::new("ghost");
        assert_eq!(list.toggle(&ghost), list);
        assert_eq!(list.delete(&ghost), list);
    }

    #[test]
    fn test_delete_removes_todo() {
        let list = TodoList::default().add("a").add("b");
        let target = list.items()[0].id.clone();
        let remaining = list.delete(&target);
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining.items()[0].text, "a");
    }
}
