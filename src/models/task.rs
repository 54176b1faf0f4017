use serde::Serialize;

/// A named unit of work that owns slots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Task {
    pub id: Option<i64>, // ⇔ task.id (None until persisted)
    pub name: String,    // ⇔ task.name
}

impl Task {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
        }
    }

    pub fn with_id(id: i64, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
        }
    }
}
