//! Domain types for the checklist feature.
//!
//! Todos and categories are plain values; [`TodoState`] owns them in
//! insertion-ordered, id-keyed collections and is only ever changed by the
//! reducer.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use uuid::Uuid;

/// Color given to categories created without one.
pub const DEFAULT_COLOR_HEX: &str = "#007AFF";

/// How far ahead [`TodoFilter::DueSoon`] looks.
pub const DUE_SOON_WINDOW_DAYS: i64 = 3;

macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random id
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an id from a UUID
            #[must_use]
            pub const fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Returns the inner UUID
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a todo, assigned before it is persisted
    TodoId
}

uuid_id! {
    /// Unique identifier for a category
    CategoryId
}

/// A single todo item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    /// Unique identifier, never changes
    pub id: TodoId,
    /// Title of the todo
    pub title: String,
    /// Whether the todo is completed
    pub is_completed: bool,
    /// When the todo was created
    pub created_at: DateTime<Utc>,
    /// Optional due date
    pub due_date: Option<DateTime<Utc>>,
    /// Optional reminder
    pub reminder_date: Option<DateTime<Utc>>,
    /// Free-form notes
    pub notes: Option<String>,
    /// Weak reference to a category
    pub category_id: Option<CategoryId>,
}

impl Todo {
    /// Creates a new, not yet completed, todo
    #[must_use]
    pub fn new(id: TodoId, title: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            title: title.into(),
            is_completed: false,
            created_at,
            due_date: None,
            reminder_date: None,
            notes: None,
            category_id: None,
        }
    }

    /// Sets the category
    #[must_use]
    pub const fn with_category(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Sets the due date
    #[must_use]
    pub const fn with_due_date(mut self, due_date: DateTime<Utc>) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// A named group of todos
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Unique identifier, never changes
    pub id: CategoryId,
    /// Display name
    pub name: String,
    /// Display color, `#RRGGBB`
    pub color_hex: String,
    /// Optional symbol name
    pub icon_name: Option<String>,
}

impl Category {
    /// Creates a category with the default color and no icon
    #[must_use]
    pub fn new(id: CategoryId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            color_hex: DEFAULT_COLOR_HEX.to_string(),
            icon_name: None,
        }
    }
}

/// Values that carry a stable identity
pub trait Identifiable {
    /// Identity type
    type Id: Copy + Eq + Hash + std::fmt::Debug;

    /// Returns the identity
    fn id(&self) -> Self::Id;
}

impl Identifiable for Todo {
    type Id = TodoId;

    fn id(&self) -> TodoId {
        self.id
    }
}

impl Identifiable for Category {
    type Id = CategoryId;

    fn id(&self) -> CategoryId {
        self.id
    }
}

/// Ordered collection with at most one element per id
///
/// Order is insertion order and is meaningful for display. Lookups are
/// linear, which is fine for list sizes a person maintains by hand.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<T>", into = "Vec<T>")]
pub struct IdentifiedVec<T: Identifiable + Clone> {
    items: Vec<T>,
}

impl<T: Identifiable + Clone> IdentifiedVec<T> {
    /// Creates an empty collection
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Builds a collection keeping the first occurrence of every id
    pub fn from_iter_dedup(iter: impl IntoIterator<Item = T>) -> Self {
        let mut collection = Self::new();
        for item in iter {
            collection.push(item);
        }
        collection
    }

    /// Number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if there are no elements
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of the element with `id`
    #[must_use]
    pub fn index_of(&self, id: T::Id) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Returns true if an element with `id` exists
    #[must_use]
    pub fn contains(&self, id: T::Id) -> bool {
        self.index_of(id).is_some()
    }

    /// Element with `id`
    #[must_use]
    pub fn get(&self, id: T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Mutable element with `id`
    pub fn get_mut(&mut self, id: T::Id) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Inserts at position 0; refuses (returns false) if the id is present
    pub fn insert_front(&mut self, item: T) -> bool {
        if self.contains(item.id()) {
            return false;
        }
        self.items.insert(0, item);
        true
    }

    /// Appends; refuses (returns false) if the id is present
    pub fn push(&mut self, item: T) -> bool {
        if self.contains(item.id()) {
            return false;
        }
        self.items.push(item);
        true
    }

    /// Removes the element with `id`
    pub fn remove(&mut self, id: T::Id) -> Option<T> {
        let index = self.index_of(id)?;
        Some(self.items.remove(index))
    }

    /// Removes the elements at `offsets`
    ///
    /// All targets are resolved against the collection before anything is
    /// removed. Out-of-range and repeated offsets are skipped. Removed
    /// elements are returned in ascending offset order.
    pub fn remove_at_offsets(&mut self, offsets: &[usize]) -> Vec<T> {
        let mut targets: Vec<usize> = offsets
            .iter()
            .copied()
            .filter(|&offset| offset < self.items.len())
            .collect();
        targets.sort_unstable();
        targets.dedup();

        let ids: Vec<T::Id> = targets.iter().map(|&offset| self.items[offset].id()).collect();

        ids.into_iter().filter_map(|id| self.remove(id)).collect()
    }

    /// Replaces the element with the same id, keeping its position
    ///
    /// Returns the previous value, or `None` (and changes nothing) if the
    /// id is absent.
    pub fn replace(&mut self, item: T) -> Option<T> {
        let slot = self.get_mut(item.id())?;
        Some(std::mem::replace(slot, item))
    }

    /// Keeps only the elements matching `keep`
    pub fn retain(&mut self, keep: impl FnMut(&T) -> bool) {
        self.items.retain(keep);
    }

    /// Iterates in order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterates mutably in order
    ///
    /// Ids must not be changed through this iterator.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Ids in order
    #[must_use]
    pub fn ids(&self) -> Vec<T::Id> {
        self.items.iter().map(Identifiable::id).collect()
    }

    /// Elements as a slice
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<T: Identifiable + Clone> Default for IdentifiedVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identifiable + Clone> FromIterator<T> for IdentifiedVec<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::from_iter_dedup(iter)
    }
}

impl<T: Identifiable + Clone> From<Vec<T>> for IdentifiedVec<T> {
    fn from(items: Vec<T>) -> Self {
        Self::from_iter_dedup(items)
    }
}

impl<T: Identifiable + Clone> From<IdentifiedVec<T>> for Vec<T> {
    fn from(collection: IdentifiedVec<T>) -> Self {
        collection.items
    }
}

impl<'a, T: Identifiable + Clone> IntoIterator for &'a IdentifiedVec<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Which todos are shown
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TodoFilter {
    /// Everything
    #[default]
    All,
    /// Not completed
    Active,
    /// Completed
    Completed,
    /// In the given category
    Category(CategoryId),
    /// Due on the current (UTC) day
    DueToday,
    /// Not completed and due within the next few days
    DueSoon,
}

impl TodoFilter {
    /// Returns true if `todo` passes this filter at time `now`
    #[must_use]
    pub fn matches(&self, todo: &Todo, now: DateTime<Utc>) -> bool {
        match self {
            Self::All => true,
            Self::Active => !todo.is_completed,
            Self::Completed => todo.is_completed,
            Self::Category(id) => todo.category_id == Some(*id),
            Self::DueToday => todo
                .due_date
                .is_some_and(|due| due.date_naive() == now.date_naive()),
            Self::DueSoon => {
                let horizon = now + Duration::days(DUE_SOON_WINDOW_DAYS);
                !todo.is_completed
                    && todo.due_date.is_some_and(|due| due >= now && due <= horizon)
            },
        }
    }
}

/// Presentation order for todos
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    /// Newest first
    #[default]
    CreatedDate,
    /// Earliest due first, undated last
    DueDate,
    /// Case-insensitive alphabetical
    Title,
}

/// Persistence status of the last optimistic change to a todo
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    /// Applied locally, waiting for storage
    Pending,
    /// Storage returned the latest change
    Confirmed,
    /// Storage rejected the latest change; the local value is kept
    Failed(String),
}

/// Per-todo bookkeeping for optimistic changes
///
/// `generation` counts the update requests issued for the todo. Only the
/// response to the most recent request may change state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEntry {
    /// Generation of the most recent request
    pub generation: u64,
    /// Status of that request
    pub status: SyncStatus,
}

/// Partial update of a todo
///
/// `None` leaves a field untouched. For optional fields `Some(None)` clears
/// the value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoChanges {
    /// New title
    pub title: Option<String>,
    /// New completion flag
    pub is_completed: Option<bool>,
    /// New due date
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New reminder
    pub reminder_date: Option<Option<DateTime<Utc>>>,
    /// New notes
    pub notes: Option<Option<String>>,
    /// New category link
    pub category_id: Option<Option<CategoryId>>,
}

impl TodoChanges {
    /// Returns true if no field is provided
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.is_completed.is_none()
            && self.due_date.is_none()
            && self.reminder_date.is_none()
            && self.notes.is_none()
            && self.category_id.is_none()
    }

    /// Writes the provided fields over `todo`
    pub fn apply_to(self, todo: &mut Todo) {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(is_completed) = self.is_completed {
            todo.is_completed = is_completed;
        }
        if let Some(due_date) = self.due_date {
            todo.due_date = due_date;
        }
        if let Some(reminder_date) = self.reminder_date {
            todo.reminder_date = reminder_date;
        }
        if let Some(notes) = self.notes {
            todo.notes = notes;
        }
        if let Some(category_id) = self.category_id {
            todo.category_id = category_id;
        }
    }
}

/// State of the checklist feature
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TodoState {
    /// Todos in display order
    pub todos: IdentifiedVec<Todo>,
    /// Known categories
    pub categories: IdentifiedVec<Category>,
    /// Text field for the next todo
    pub new_todo_text: String,
    /// Category given to new todos
    pub selected_category_id: Option<CategoryId>,
    /// True while the initial load is running
    pub is_loading: bool,
    /// Snapshot of the todo being edited
    pub editing_todo: Option<Todo>,
    /// Active filter
    pub filter: TodoFilter,
    /// Active sort order
    pub sort_order: SortOrder,
    /// Optimistic update bookkeeping, by todo
    pub sync: HashMap<TodoId, SyncEntry>,
    /// Last reported failure (if any)
    pub last_error: Option<String>,
}

impl TodoState {
    /// Creates a new empty state
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of todos
    #[must_use]
    pub fn count(&self) -> usize {
        self.todos.len()
    }

    /// Returns the number of completed todos
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.todos.iter().filter(|t| t.is_completed).count()
    }

    /// Returns the number of todos still open
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.count() - self.completed_count()
    }

    /// Returns the todos linked to `category_id`, in display order
    #[must_use]
    pub fn todos_in_category(&self, category_id: CategoryId) -> Vec<&Todo> {
        self.todos
            .iter()
            .filter(|t| t.category_id == Some(category_id))
            .collect()
    }

    /// Sync status of a todo, if it was ever changed optimistically
    #[must_use]
    pub fn sync_status(&self, id: TodoId) -> Option<&SyncStatus> {
        self.sync.get(&id).map(|entry| &entry.status)
    }

    /// Todos passing `filter`, ordered by `sort_order`
    ///
    /// Storage order is left untouched; ties keep storage order.
    #[must_use]
    pub fn visible_todos(&self, now: DateTime<Utc>) -> Vec<&Todo> {
        let mut visible: Vec<&Todo> = self
            .todos
            .iter()
            .filter(|todo| self.filter.matches(todo, now))
            .collect();

        match self.sort_order {
            SortOrder::CreatedDate => visible.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            SortOrder::DueDate => visible.sort_by(|a, b| match (a.due_date, b.due_date) {
                (Some(a), Some(b)) => a.cmp(&b),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            }),
            SortOrder::Title => {
                visible.sort_by_cached_key(|todo| todo.title.to_lowercase());
            },
        }

        visible
    }

    /// Starts a new optimistic request for `id` and returns its generation
    pub(crate) fn begin_sync(&mut self, id: TodoId) -> u64 {
        let entry = self.sync.entry(id).or_insert(SyncEntry {
            generation: 0,
            status: SyncStatus::Pending,
        });
        entry.generation += 1;
        entry.status = SyncStatus::Pending;
        entry.generation
    }

    /// Returns true if `generation` is the latest request issued for `id`
    pub(crate) fn is_current(&self, id: TodoId, generation: u64) -> bool {
        self.sync
            .get(&id)
            .is_some_and(|entry| entry.generation == generation)
    }

    /// Records the outcome of the current request for `id`
    pub(crate) fn finish_sync(&mut self, id: TodoId, status: SyncStatus) {
        if let Some(entry) = self.sync.get_mut(&id) {
            entry.status = status;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, hour, 0, 0).single().unwrap_or_default()
    }

    fn todo(title: &str, created_hour: u32) -> Todo {
        Todo::new(TodoId::new(), title, at(created_hour))
    }

    #[test]
    fn todo_id_display() {
        let id = TodoId::new();
        assert_eq!(id.to_string(), id.as_uuid().to_string());
    }

    #[test]
    fn category_defaults() {
        let category = Category::new(CategoryId::new(), "Work");
        assert_eq!(category.color_hex, DEFAULT_COLOR_HEX);
        assert_eq!(category.icon_name, None);
    }

    #[test]
    fn identified_vec_refuses_duplicates() {
        let first = todo("a", 1);
        let mut copy = first.clone();
        copy.title = "b".to_string();

        let mut todos = IdentifiedVec::new();
        assert!(todos.push(first.clone()));
        assert!(!todos.push(copy.clone()));
        assert!(!todos.insert_front(copy));
        assert_eq!(todos.as_slice(), &[first]);
    }

    #[test]
    fn identified_vec_from_iter_keeps_first() {
        let a = todo("a", 1);
        let b = todo("b", 2);
        let mut a2 = a.clone();
        a2.title = "a2".to_string();

        let todos: IdentifiedVec<Todo> = vec![a.clone(), b.clone(), a2].into_iter().collect();
        assert_eq!(todos.as_slice(), &[a, b]);
    }

    #[test]
    fn identified_vec_remove_at_offsets_resolves_first() {
        let items: Vec<Todo> = (0..5).map(|i| todo("same", i)).collect();
        let mut todos = IdentifiedVec::from_iter_dedup(items.clone());

        let removed = todos.remove_at_offsets(&[3, 1, 3, 99]);

        assert_eq!(removed, vec![items[1].clone(), items[3].clone()]);
        assert_eq!(todos.ids(), vec![items[0].id, items[2].id, items[4].id]);
    }

    #[test]
    fn identified_vec_replace_keeps_position() {
        let a = todo("a", 1);
        let b = todo("b", 2);
        let mut todos = IdentifiedVec::from_iter_dedup([a.clone(), b.clone()]);

        let mut renamed = a.clone();
        renamed.title = "renamed".to_string();
        assert_eq!(todos.replace(renamed.clone()), Some(a));
        assert_eq!(todos.as_slice(), &[renamed, b]);

        assert_eq!(todos.replace(todo("missing", 3)), None);
        assert_eq!(todos.len(), 2);
    }

    #[test]
    fn changes_apply_only_provided_fields() {
        let mut item = todo("Draft", 1).with_due_date(at(5));
        item.notes = Some("keep".to_string());

        TodoChanges {
            title: Some("Final".to_string()),
            due_date: Some(None),
            ..TodoChanges::default()
        }
        .apply_to(&mut item);

        assert_eq!(item.title, "Final");
        assert_eq!(item.due_date, None);
        assert_eq!(item.notes.as_deref(), Some("keep"));
        assert!(!item.is_completed);
        assert!(TodoChanges::default().is_empty());
    }

    #[test]
    fn filters() {
        let now = at(10);
        let mut done = todo("done", 1);
        done.is_completed = true;
        let today = todo("today", 2).with_due_date(at(23));
        let soon = todo("soon", 3).with_due_date(now + Duration::days(2));
        let later = todo("later", 4).with_due_date(now + Duration::days(10));
        let overdue = todo("overdue", 5).with_due_date(now - Duration::hours(1));

        let all = [&done, &today, &soon, &later, &overdue];
        let titles = |filter: TodoFilter| -> Vec<&str> {
            all.iter()
                .filter(|t| filter.matches(t, now))
                .map(|t| t.title.as_str())
                .collect()
        };

        assert_eq!(titles(TodoFilter::Completed), vec!["done"]);
        assert_eq!(titles(TodoFilter::Active).len(), 4);
        assert_eq!(titles(TodoFilter::DueToday), vec!["today", "overdue"]);
        assert_eq!(titles(TodoFilter::DueSoon), vec!["today", "soon"]);
    }

    #[test]
    fn visible_todos_sorts_without_reordering_storage() {
        let now = at(12);
        let b = todo("banana", 1).with_due_date(at(20));
        let a = todo("Apple", 2);
        let c = todo("cherry", 3).with_due_date(at(15));

        let mut state = TodoState::new();
        state.todos = IdentifiedVec::from_iter_dedup([b.clone(), a.clone(), c.clone()]);

        let titles = |state: &TodoState| -> Vec<String> {
            state.visible_todos(now).iter().map(|t| t.title.clone()).collect()
        };

        assert_eq!(titles(&state), vec!["cherry", "Apple", "banana"]);

        state.sort_order = SortOrder::DueDate;
        assert_eq!(titles(&state), vec!["cherry", "banana", "Apple"]);

        state.sort_order = SortOrder::Title;
        assert_eq!(titles(&state), vec!["Apple", "banana", "cherry"]);

        assert_eq!(state.todos.ids(), vec![b.id, a.id, c.id]);
    }

    #[test]
    fn counts() {
        let category = CategoryId::new();
        let mut done = todo("done", 1).with_category(Some(category));
        done.is_completed = true;

        let mut state = TodoState::new();
        state.todos = IdentifiedVec::from_iter_dedup([done, todo("open", 2)]);

        assert_eq!(state.count(), 2);
        assert_eq!(state.completed_count(), 1);
        assert_eq!(state.active_count(), 1);
        assert_eq!(state.todos_in_category(category).len(), 1);
    }

    #[test]
    fn sync_generations() {
        let id = TodoId::new();
        let mut state = TodoState::new();

        assert_eq!(state.begin_sync(id), 1);
        assert_eq!(state.begin_sync(id), 2);
        assert!(!state.is_current(id, 1));
        assert!(state.is_current(id, 2));

        state.finish_sync(id, SyncStatus::Confirmed);
        assert_eq!(state.sync_status(id), Some(&SyncStatus::Confirmed));
    }
}
