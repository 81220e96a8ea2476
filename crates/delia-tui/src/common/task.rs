use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// Background request slots. At most one task of each kind is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskKind {
    Chat,
    Login,
    Stats,
    Documents,
    Upload,
    ClearDatabase,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TaskMeta {
    #[default]
    None,
    Upload {
        file: String,
    },
}

#[derive(Debug, Clone)]
pub struct TaskStarted {
    pub id: TaskId,
    pub cancel: Option<CancellationToken>,
    pub meta: TaskMeta,
}

#[derive(Debug)]
pub struct TaskCompleted<E> {
    pub id: TaskId,
    pub result: E,
}

/// Task lifecycle state (mutated only by the reducer).
#[derive(Debug, Default, Clone)]
pub struct TaskState {
    pub active: Option<TaskId>,
    pub cancel: Option<CancellationToken>,
    pub meta: TaskMeta,
}

impl TaskState {
    pub fn is_running(&self) -> bool {
        self.active.is_some()
    }

    pub fn on_started(&mut self, started: &TaskStarted) {
        self.active = Some(started.id);
        self.cancel = started.cancel.clone();
        self.meta = started.meta.clone();
    }

    /// Clears the slot if `id` is still the active task. Results of
    /// superseded or cancelled tasks return false and are dropped.
    pub fn finish_if_active(&mut self, id: TaskId) -> bool {
        let ok = self.active == Some(id);
        if ok {
            self.clear();
        }
        ok
    }

    pub fn clear(&mut self) {
        self.active = None;
        self.cancel = None;
        self.meta = TaskMeta::None;
    }
}

#[derive(Debug, Default, Clone)]
pub struct Tasks {
    pub chat: TaskState,
    pub login: TaskState,
    pub stats: TaskState,
    pub documents: TaskState,
    pub upload: TaskState,
    pub clear_database: TaskState,
}

impl Tasks {
    pub fn state(&self, kind: TaskKind) -> &TaskState {
        match kind {
            TaskKind::Chat => &self.chat,
            TaskKind::Login => &self.login,
            TaskKind::Stats => &self.stats,
            TaskKind::Documents => &self.documents,
            TaskKind::Upload => &self.upload,
            TaskKind::ClearDatabase => &self.clear_database,
        }
    }

    pub fn state_mut(&mut self, kind: TaskKind) -> &mut TaskState {
        match kind {
            TaskKind::Chat => &mut self.chat,
            TaskKind::Login => &mut self.login,
            TaskKind::Stats => &mut self.stats,
            TaskKind::Documents => &mut self.documents,
            TaskKind::Upload => &mut self.upload,
            TaskKind::ClearDatabase => &mut self.clear_database,
        }
    }

    pub fn is_any_running(&self) -> bool {
        self.chat.is_running()
            || self.login.is_running()
            || self.stats.is_running()
            || self.documents.is_running()
            || self.upload.is_running()
            || self.clear_database.is_running()
    }
}
