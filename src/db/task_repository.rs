use crate::db::{Database, StoreError};
use crate::models::task::{Task, TaskStatus};
use bincode::{Decode, Encode};
use tracing::info;

const TASKS_TREE: &str = "tasks";
const OWNER_INDEX_TREE: &str = "tasks_owner_idx";

#[derive(Debug, Encode, Decode)]
struct StoredTask {
    id: String,
    user_id: String,
    title: String,
    description: Option<String>,
    status: TaskStatus,
    created_at: i64, // Microsecond timestamp
}

impl From<Task> for StoredTask {
    fn from(task: Task) -> Self {
        StoredTask {
            id: task.id,
            user_id: task.user_id,
            title: task.title,
            description: task.description,
            status: task.status,
            created_at: task.created_at.timestamp_micros(),
        }
    }
}

impl From<StoredTask> for Task {
    fn from(stored: StoredTask) -> Self {
        Task {
            id: stored.id,
            user_id: stored.user_id,
            title: stored.title,
            description: stored.description,
            status: stored.status,
            created_at: chrono::DateTime::from_timestamp_micros(stored.created_at)
                .unwrap_or_else(chrono::Utc::now),
        }
    }
}

/// Owner index keys are `<user_id>/<task_id>` so a prefix scan on
/// `<user_id>/` yields exactly that user's tasks.
fn owner_key(user_id: &str, task_id: &str) -> Vec<u8> {
    format!("{}/{}", user_id, task_id).into_bytes()
}

pub struct TaskRepository {
    db: Database,
}

impl TaskRepository {
    pub fn new(db: Database) -> Self {
        TaskRepository { db }
    }

    pub async fn create(&self, task: Task) -> Result<Task, StoreError> {
        let tasks_tree = self.db.tree(TASKS_TREE)?;
        let owner_index = self.db.tree(OWNER_INDEX_TREE)?;

        let stored = StoredTask::from(task.clone());
        let encoded = bincode::encode_to_vec(&stored, bincode::config::standard())?;

        tasks_tree.insert(task.id.as_bytes(), encoded.as_slice())?;
        owner_index.insert(owner_key(&task.user_id, &task.id), task.id.as_bytes())?;

        info!(task_id = %task.id, user_id = %task.user_id, "Task created in store");

        Ok(task)
    }

    /// Ownership-scoped lookup: both the task id and the owner id must
    /// match. A task owned by someone else reads as absent.
    pub async fn get_owned(&self, id: &str, owner_id: &str) -> Result<Option<Task>, StoreError> {
        let tasks_tree = self.db.tree(TASKS_TREE)?;

        match tasks_tree.get(id.as_bytes())? {
            Some(data) => {
                let (stored, _): (StoredTask, usize) =
                    bincode::decode_from_slice(&data, bincode::config::standard())?;
                if stored.user_id != owner_id {
                    return Ok(None);
                }
                Ok(Some(Task::from(stored)))
            }
            None => Ok(None),
        }
    }

    /// All tasks owned by `owner_id`, newest first.
    pub async fn list_for_owner(&self, owner_id: &str) -> Result<Vec<Task>, StoreError> {
        let tasks_tree = self.db.tree(TASKS_TREE)?;
        let owner_index = self.db.tree(OWNER_INDEX_TREE)?;

        let mut tasks = Vec::new();
        for entry in owner_index.scan_prefix(format!("{}/", owner_id).as_bytes()) {
            let (_, task_id) = entry?;
            if let Some(data) = tasks_tree.get(&task_id)? {
                let (stored, _): (StoredTask, usize) =
                    bincode::decode_from_slice(&data, bincode::config::standard())?;
                tasks.push(Task::from(stored));
            }
        }

        tasks.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(tasks)
    }

    /// Overwrite an existing task. The caller is expected to have loaded
    /// the record through `get_owned`; a missing or foreign record still
    /// reports `NotFound` here so a racing delete cannot resurrect it.
    pub async fn update(&self, task: Task) -> Result<Task, StoreError> {
        let tasks_tree = self.db.tree(TASKS_TREE)?;

        match tasks_tree.get(task.id.as_bytes())? {
            Some(data) => {
                let (existing, _): (StoredTask, usize) =
                    bincode::decode_from_slice(&data, bincode::config::standard())?;
                if existing.user_id != task.user_id {
                    return Err(StoreError::NotFound);
                }
            }
            None => return Err(StoreError::NotFound),
        }

        let stored = StoredTask::from(task.clone());
        let encoded = bincode::encode_to_vec(&stored, bincode::config::standard())?;
        tasks_tree.insert(task.id.as_bytes(), encoded.as_slice())?;

        info!(task_id = %task.id, user_id = %task.user_id, "Task updated in store");

        Ok(task)
    }

    /// Ownership-scoped delete. Returns `false` when the scoped lookup
    /// misses, whether the task is absent or owned by someone else.
    pub async fn delete_owned(&self, id: &str, owner_id: &str) -> Result<bool, StoreError> {
        let tasks_tree = self.db.tree(TASKS_TREE)?;
        let owner_index = self.db.tree(OWNER_INDEX_TREE)?;

        if self.get_owned(id, owner_id).await?.is_none() {
            return Ok(false);
        }

        owner_index.remove(owner_key(owner_id, id))?;
        tasks_tree.remove(id.as_bytes())?;

        info!(task_id = %id, user_id = %owner_id, "Task deleted from store");
        Ok(true)
    }
}
