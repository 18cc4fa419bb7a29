use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub enum SelectionMode {
    MaxLoaded,
    #[default]
    MinLoaded,
    MinAllocated,
    Order,
    Random,
}

impl SelectionMode {
    pub const ALL: [SelectionMode; 5] = [
        SelectionMode::MaxLoaded,
        SelectionMode::MinLoaded,
        SelectionMode::MinAllocated,
        SelectionMode::Order,
        SelectionMode::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SelectionMode::MaxLoaded => "maxloaded",
            SelectionMode::MinLoaded => "minloaded",
            SelectionMode::MinAllocated => "minallocated",
            SelectionMode::Order => "order",
            SelectionMode::Random => "random",
        }
    }

    pub fn from_keyword(keyword: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|m| m.as_str() == keyword)
    }
}

/// Resource allocation of a task; the first candidate is the preferred one
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Allocation {
    pub candidates: Vec<String>,
    pub selection_mode: SelectionMode,
    pub persistent: bool,
    pub mandatory: bool,
}

impl Allocation {
    pub fn new(
        candidates: Vec<String>,
        selection_mode: SelectionMode,
        persistent: bool,
        mandatory: bool,
    ) -> Self {
        Self {
            candidates,
            selection_mode,
            persistent,
            mandatory,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaskDependency {
    /// Full task id; resolved by the scheduler, not the parser
    pub task_id: String,
}

impl TaskDependency {
    pub fn new(task_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
        }
    }
}
