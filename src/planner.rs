use std::fmt;

use log::{debug, error};

use crate::{
    config::Config,
    domain::{BlockId, PresetId, TimeBlock, TodoId},
    presets::PresetBook,
    schedule::{Schedule, ScheduleRules},
    storage::{self, FileStore, KeyValueStore},
    todos::TodoList,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    UpdateBlock(TimeBlock),
    SplitBlock(BlockId),
    DeleteBlock(BlockId),
    AddTodo(String),
    ToggleTodo(TodoId),
    DeleteTodo(TodoId),
    SavePreset(String),
    LoadPreset(PresetId),
    DeletePreset(PresetId),
    SelectItem(Option<BlockId>),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlannerState {
    pub schedule: Schedule,
    pub todos: TodoList,
    pub presets: PresetBook,
    pub selected: Option<BlockId>,
}

impl PlannerState {
    pub fn selected_block(&self) -> Option<&TimeBlock> {
        self.selected.as_ref().and_then(|id| self.schedule.find(id))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Notice {
    LastBlock,
    ProtectedPreset,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::LastBlock => f.write_str("cannot delete the last block of the day"),
            Notice::ProtectedPreset => f.write_str("the default preset cannot be deleted"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Unchanged,
    Refused(Notice),
}

/// Applies one intent to a state and returns the next state. Intents that
/// do not apply yield an equal state.
pub fn reduce(state: &PlannerState, intent: &Intent, rules: &ScheduleRules) -> PlannerState {
    let mut next = state.clone();

    match intent {
        Intent::UpdateBlock(block) => {
            next.schedule = state.schedule.update_block(block, rules);
        }
        Intent::SplitBlock(id) => {
            next.schedule = state.schedule.split_block(id, rules);
        }
        Intent::DeleteBlock(id) => {
            next.schedule = state.schedule.delete_block(id);
        }
        Intent::AddTodo(text) => {
            next.todos = state.todos.add(text);
        }
        Intent::ToggleTodo(id) => {
            next.todos = state.todos.toggle(id);
        }
        Intent::DeleteTodo(id) => {
            next.todos = state.todos.delete(id);
        }
        Intent::SavePreset(name) => {
            next.presets = state.presets.save(name, &state.schedule);
        }
        Intent::LoadPreset(id) => {
            if let Some(schedule) = state.presets.load(id) {
                next.schedule = schedule;
            }
        }
        Intent::DeletePreset(id) => {
            next.presets = state.presets.delete(id);
        }
        Intent::SelectItem(Some(id)) => {
            if state.schedule.contains(id) {
                next.selected = Some(id.clone());
            }
        }
        Intent::SelectItem(None) => {
            next.selected = None;
        }
    }

    if next
        .selected
        .as_ref()
        .is_some_and(|id| !next.schedule.contains(id))
    {
        next.selected = None;
    }

    next
}

/// The user-facing reason an intent will be refused, if any.
pub fn refusal(state: &PlannerState, intent: &Intent) -> Option<Notice> {
    match intent {
        Intent::DeleteBlock(id) if state.schedule.contains(id) && !state.schedule.can_delete() => {
            Some(Notice::LastBlock)
        }
        Intent::DeletePreset(id) if id.is_protected() => Some(Notice::ProtectedPreset),
        _ => None,
    }
}

/// Owns the planner state and writes every changed store back to `S`.
pub struct Planner<S: KeyValueStore> {
    state: PlannerState,
    store: S,
    rules: ScheduleRules,
}

impl Planner<FileStore> {
    pub fn open_from_config(config: &Config) -> Self {
        let dir = storage::get_data_dir(config.data_dir.as_deref());
        Self::open(FileStore::new(dir), config.schedule_rules())
    }

    pub fn data_dir(&self) -> &std::path::Path {
        self.store.dir()
    }
}

impl<S: KeyValueStore> Planner<S> {
    pub fn open(store: S, rules: ScheduleRules) -> Self {
        let state = PlannerState {
            schedule: storage::load_schedule(&store),
            todos: storage::load_todos(&store),
            presets: storage::load_presets(&store),
            selected: None,
        };
        debug!(
            "planner opened with {} blocks, {} todos, {} presets",
            state.schedule.len(),
            state.todos.len(),
            state.presets.len()
        );

        Self {
            state,
            store,
            rules,
        }
    }

    pub fn state(&self) -> &PlannerState {
        &self.state
    }

    pub fn rules(&self) -> &ScheduleRules {
        &self.rules
    }

    pub fn dispatch(&mut self, intent: Intent) -> Outcome {
        if let Some(notice) = refusal(&self.state, &intent) {
            debug!("refused {:?}: {}", intent, notice);
            return Outcome::Refused(notice);
        }

        let next = reduce(&self.state, &intent, &self.rules);
        if next == self.state {
            return Outcome::Unchanged;
        }

        self.persist_changes(&next);
        self.state = next;
        Outcome::Applied
    }

    /// Selecting the block that is already selected clears the selection.
    pub fn toggle_selection(&mut self, id: &BlockId) -> Outcome {
        if self.state.selected.as_ref() == Some(id) {
            self.dispatch(Intent::SelectItem(None))
        } else {
            self.dispatch(Intent::SelectItem(Some(id.clone())))
        }
    }

    fn persist_changes(&mut self, next: &PlannerState) {
        if next.schedule != self.state.schedule {
            if let Err(e) = storage::save_schedule(&mut self.store, &next.schedule) {
                error!("failed to save schedule: {}", e);
            }
        }
        if next.todos != self.state.todos {
            if let Err(e) = storage::save_todos(&mut self.store, &next.todos) {
                error!("failed to save todos: {}", e);
            }
        }
        if next.presets != self.state.presets {
            if let Err(e) = storage::save_presets(&mut self.store, &next.presets) {
                error!("failed to save presets: {}", e);
            }
        }
    }

    #[cfg(test)]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::memory::MemoryStore;

    fn planner() -> Planner<MemoryStore> {
        Planner::open(MemoryStore::default(), ScheduleRules::default())
    }

    #[test]
    fn test_reduce_is_pure() {
        let state = PlannerState::default();
        let before = state.clone();
        let next = reduce(
            &state,
            &Intent::SplitBlock(BlockId::new("1")),
            &ScheduleRules::default(),
        );
        assert_eq!(state, before);
        assert_eq!(next.schedule.len(), before.schedule.len() + 1);
    }

    #[test]
    fn test_update_scenario_through_dispatch() {
        let mut planner = planner();
        let mut block = planner.state().schedule.blocks()[2].clone();
        block.end = 11.0;

        assert_eq!(planner.dispatch(Intent::UpdateBlock(block)), Outcome::Applied);
        let work = &planner.state().schedule.blocks()[2];
        let lunch = &planner.state().schedule.blocks()[3];
        assert_eq!((work.start, work.end), (9.0, 11.0));
        assert_eq!(lunch.start, 11.0);
    }

    #[test]
    fn test_dispatch_writes_only_changed_keys() {
        let mut planner = planner();

        planner.dispatch(Intent::AddTodo("buy milk".to_string()));
        assert_eq!(planner.store().writes, vec!["todos"]);

        planner.dispatch(Intent::SplitBlock(BlockId::new("3")));
        assert_eq!(planner.store().writes, vec!["todos", "schedule"]);

        planner.dispatch(Intent::SavePreset("Split day".to_string()));
        assert_eq!(planner.store().writes, vec!["todos", "schedule", "presets"]);
    }

    #[test]
    fn test_noops_report_unchanged_without_writes() {
        let mut planner = planner();
        assert_eq!(
            planner.dispatch(Intent::AddTodo("  ".to_string())),
            Outcome::Unchanged
        );
        assert_eq!(
            planner.dispatch(Intent::SplitBlock(BlockId::new("ghost"))),
            Outcome::Unchanged
        );
        assert_eq!(
            planner.dispatch(Intent::LoadPreset(PresetId::new("ghost"))),
            Outcome::Unchanged
        );
        assert!(planner.store().writes.is_empty());
    }

    #[test]
    fn test_protected_preset_is_refused() {
        let mut planner = planner();
        let before = planner.state().presets.clone();
        assert_eq!(
            planner.dispatch(Intent::DeletePreset(PresetId::new("default"))),
            Outcome::Refused(Notice::ProtectedPreset)
        );
        assert_eq!(planner.state().presets, before);
    }

    #[test]
    fn test_last_block_is_refused() {
        let mut planner = planner();
        let ids: Vec<BlockId> = planner
            .state()
            .schedule
            .blocks()
            .iter()
            .map(|b| b.id.clone())
            .collect();

        let (last, rest) = ids.split_last().unwrap();
        for id in rest {
            assert_eq!(planner.dispatch(Intent::DeleteBlock(id.clone())), Outcome::Applied);
        }
        assert_eq!(
            planner.dispatch(Intent::DeleteBlock(last.clone())),
            Outcome::Refused(Notice::LastBlock)
        );

        let remaining = planner.state().schedule.blocks();
        assert_eq!(remaining.len(), 1);
        assert_eq!((remaining[0].start, remaining[0].end), (0.0, 24.0));
    }

    #[test]
    fn test_load_preset_replaces_and_detaches() {
        let mut planner = planner();
        planner.dispatch(Intent::SplitBlock(BlockId::new("1")));
        planner.dispatch(Intent::SavePreset("Nine blocks".to_string()));
        let saved = planner.state().presets.presets()[1].clone();

        planner.dispatch(Intent::LoadPreset(PresetId::new("default")));
        assert_eq!(planner.state().schedule.len(), 8);

        planner.dispatch(Intent::LoadPreset(saved.id.clone()));
        assert_eq!(planner.state().schedule.len(), 9);

        planner.dispatch(Intent::DeleteBlock(BlockId::new("2")));
        assert_eq!(planner.state().presets.find(&saved.id), Some(&saved));
    }

    #[test]
    fn test_selection_follows_schedule() {
        let mut planner = planner();
        let id = BlockId::new("4");

        assert_eq!(planner.toggle_selection(&id), Outcome::Applied);
        assert_eq!(planner.state().selected_block().map(|b| b.name.as_str()), Some("Lunch"));

        assert_eq!(planner.toggle_selection(&id), Outcome::Applied);
        assert_eq!(planner.state().selected, None);

        planner.dispatch(Intent::SelectItem(Some(id.clone())));
        planner.dispatch(Intent::DeleteBlock(id));
        assert_eq!(planner.state().selected, None);

        assert_eq!(
            planner.dispatch(Intent::SelectItem(Some(BlockId::new("ghost")))),
            Outcome::Unchanged
        );
    }

    #[test]
    fn test_selection_is_not_persisted() {
        let mut planner = planner();
        planner.dispatch(Intent::SelectItem(Some(BlockId::new("1"))));
        assert!(planner.store().writes.is_empty());
    }

    #[test]
    fn test_failed_writes_keep_state_in_memory() {
        let mut planner = planner();
        planner.store_mut().fail_writes = true;

        assert_eq!(
            planner.dispatch(Intent::AddTodo("offline".to_string())),
            Outcome::Applied
        );
        assert_eq!(planner.state().todos.len(), 1);
        assert!(planner.store().values.is_empty());
    }

    #[test]
    fn test_reopen_restores_saved_state() {
        let mut planner = planner();
        planner.dispatch(Intent::AddTodo("persist me".to_string()));
        planner.dispatch(Intent::DeleteBlock(BlockId::new("8")));

        let values = planner.store().values.clone();
        let reopened = Planner::open(
            MemoryStore {
                values,
                ..MemoryStore::default()
            },
            ScheduleRules::default(),
        );

        assert_eq!(reopened.state().schedule, planner.state().schedule);
        assert_eq!(reopened.state().todos, planner.state().todos);
        assert_eq!(reopened.state().selected, None);
    }
}
