//! In-memory Prism Central used by stage, loop and waiter tests
//!
//! Deletes take effect when their task is scripted to end in `SUCCEEDED`
//! (the default). Every call is appended to a log so tests can assert on
//! ordering and on what was (or was not) touched.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;
use prism_client::{CategoryKey, ClientError, ManagedResource, PrismApi, Task, TaskStatus};

/// Failure to inject for a call
#[derive(Clone, Copy, Debug)]
pub(crate) enum Fail {
    NotFound,
    Transient,
    Fatal,
}

impl Fail {
    fn to_error(self, call: &str) -> ClientError {
        match self {
            Fail::NotFound => ClientError::not_found(call),
            Fail::Transient => ClientError::transient(call, "connection reset by peer"),
            Fail::Fatal => ClientError::fatal(call, "HTTP 409: entity is in use"),
        }
    }
}

struct Injected {
    fail: Fail,
    /// `None` fails forever
    remaining: Option<u32>,
}

#[derive(Default)]
struct State {
    vms: Vec<ManagedResource>,
    images: Vec<ManagedResource>,
    volume_groups: Vec<ManagedResource>,
    /// Category keys and their remaining values
    categories: HashMap<String, Vec<String>>,
    /// Status scripts per resource UUID, applied when its delete task is created
    delete_outcomes: HashMap<String, Vec<TaskStatus>>,
    /// Live task scripts; the last status repeats
    tasks: HashMap<String, (Option<Kind>, String, VecDeque<TaskStatus>)>,
    failures: HashMap<String, Injected>,
    calls: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Kind {
    Vm,
    Image,
    VolumeGroup,
}

#[derive(Default)]
pub(crate) struct FakePrism {
    state: Mutex<State>,
}

impl FakePrism {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_vm(self, resource: ManagedResource) -> Self {
        self.state.lock().unwrap().vms.push(resource);
        self
    }

    pub(crate) fn with_image(self, resource: ManagedResource) -> Self {
        self.state.lock().unwrap().images.push(resource);
        self
    }

    pub(crate) fn with_volume_group(self, resource: ManagedResource) -> Self {
        self.state.lock().unwrap().volume_groups.push(resource);
        self
    }

    pub(crate) fn with_category(self, key: &str, values: &[&str]) -> Self {
        self.state.lock().unwrap().categories.insert(
            key.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    /// Script the statuses the delete task of `resource_uuid` reports
    pub(crate) fn with_delete_outcome(self, resource_uuid: &str, statuses: &[TaskStatus]) -> Self {
        self.state
            .lock()
            .unwrap()
            .delete_outcomes
            .insert(resource_uuid.to_string(), statuses.to_vec());
        self
    }

    /// Register a standalone task with scripted statuses
    pub(crate) fn with_task(self, task_uuid: &str, statuses: &[TaskStatus]) -> Self {
        self.state.lock().unwrap().tasks.insert(
            task_uuid.to_string(),
            (None, task_uuid.to_string(), statuses.iter().cloned().collect()),
        );
        self
    }

    /// Fail every call named `call` (e.g. "delete_vm:vm-a", "list_images")
    pub(crate) fn failing(self, call: &str, fail: Fail) -> Self {
        self.inject(call, fail, None);
        self
    }

    /// Fail the next `times` calls named `call`, then behave normally
    pub(crate) fn failing_times(self, call: &str, fail: Fail, times: u32) -> Self {
        self.inject(call, fail, Some(times));
        self
    }

    fn inject(&self, call: &str, fail: Fail, remaining: Option<u32>) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert(call.to_string(), Injected { fail, remaining });
    }

    pub(crate) fn heal(&self, call: &str) {
        self.state.lock().unwrap().failures.remove(call);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub(crate) fn count_calls(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    pub(crate) fn vm_uuids(&self) -> Vec<String> {
        uuids(&self.state.lock().unwrap().vms)
    }

    pub(crate) fn image_uuids(&self) -> Vec<String> {
        uuids(&self.state.lock().unwrap().images)
    }

    pub(crate) fn volume_group_uuids(&self) -> Vec<String> {
        uuids(&self.state.lock().unwrap().volume_groups)
    }

    pub(crate) fn has_category(&self, key: &str) -> bool {
        self.state.lock().unwrap().categories.contains_key(key)
    }
}

fn uuids(resources: &[ManagedResource]) -> Vec<String> {
    resources.iter().map(|r| r.uuid.clone()).collect()
}

impl State {
    /// Record a call and return the injected failure, if any
    fn enter(&mut self, call: String) -> Result<(), ClientError> {
        self.calls.push(call.clone());
        let Some(injected) = self.failures.get_mut(&call) else {
            return Ok(());
        };
        let fail = injected.fail;
        match injected.remaining {
            Some(0) => return Ok(()),
            Some(ref mut n) => *n -= 1,
            None => {}
        }
        Err(fail.to_error(&call))
    }

    fn resources(&mut self, kind: Kind) -> &mut Vec<ManagedResource> {
        match kind {
            Kind::Vm => &mut self.vms,
            Kind::Image => &mut self.images,
            Kind::VolumeGroup => &mut self.volume_groups,
        }
    }

    fn list(&mut self, kind: Kind, call: &str) -> Result<Vec<ManagedResource>, ClientError> {
        self.enter(call.to_string())?;
        Ok(self.resources(kind).clone())
    }

    fn delete(&mut self, kind: Kind, op: &str, uuid: &str) -> Result<String, ClientError> {
        self.enter(format!("{}:{}", op, uuid))?;
        if !self.resources(kind).iter().any(|r| r.uuid == uuid) {
            return Err(ClientError::not_found(format!("{} {}", op, uuid)));
        }
        let statuses = self
            .delete_outcomes
            .get(uuid)
            .cloned()
            .unwrap_or_else(|| vec![TaskStatus::Succeeded]);
        let task_uuid = format!("task-{}", uuid);
        self.tasks.insert(
            task_uuid.clone(),
            (Some(kind), uuid.to_string(), statuses.into_iter().collect()),
        );
        Ok(task_uuid)
    }
}

#[async_trait]
impl PrismApi for FakePrism {
    async fn list_vms(&self, _filter: &str) -> Result<Vec<ManagedResource>, ClientError> {
        self.state.lock().unwrap().list(Kind::Vm, "list_vms")
    }

    async fn delete_vm(&self, uuid: &str) -> Result<String, ClientError> {
        self.state.lock().unwrap().delete(Kind::Vm, "delete_vm", uuid)
    }

    async fn list_images(&self, _filter: &str) -> Result<Vec<ManagedResource>, ClientError> {
        self.state.lock().unwrap().list(Kind::Image, "list_images")
    }

    async fn delete_image(&self, uuid: &str) -> Result<String, ClientError> {
        self.state
            .lock()
            .unwrap()
            .delete(Kind::Image, "delete_image", uuid)
    }

    async fn list_volume_groups(&self, _filter: &str) -> Result<Vec<ManagedResource>, ClientError> {
        self.state
            .lock()
            .unwrap()
            .list(Kind::VolumeGroup, "list_volume_groups")
    }

    async fn delete_volume_group(&self, uuid: &str) -> Result<String, ClientError> {
        self.state
            .lock()
            .unwrap()
            .delete(Kind::VolumeGroup, "delete_volume_group", uuid)
    }

    async fn get_category_key(&self, key: &str) -> Result<CategoryKey, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.enter(format!("get_category_key:{}", key))?;
        if !state.categories.contains_key(key) {
            return Err(ClientError::not_found(format!("category {}", key)));
        }
        Ok(CategoryKey {
            name: key.to_string(),
            description: None,
            system_defined: false,
        })
    }

    async fn list_category_values(&self, key: &str) -> Result<Vec<String>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.enter(format!("list_category_values:{}", key))?;
        state
            .categories
            .get(key)
            .cloned()
            .ok_or_else(|| ClientError::not_found(format!("category {}", key)))
    }

    async fn delete_category_value(&self, key: &str, value: &str) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        state.enter(format!("delete_category_value:{}", value))?;
        let values = state
            .categories
            .get_mut(key)
            .ok_or_else(|| ClientError::not_found(format!("category {}", key)))?;
        let before = values.len();
        values.retain(|v| v != value);
        if values.len() == before {
            return Err(ClientError::not_found(format!("category value {}", value)));
        }
        Ok(())
    }

    async fn delete_category_key(&self, key: &str) -> Result<(), ClientError> {
        let mut state = self.state.lock().unwrap();
        state.enter(format!("delete_category_key:{}", key))?;
        match state.categories.get(key) {
            None => Err(ClientError::not_found(format!("category {}", key))),
            Some(values) if !values.is_empty() => Err(ClientError::fatal(
                "delete category key",
                "HTTP 409: category key still has values",
            )),
            Some(_) => {
                state.categories.remove(key);
                Ok(())
            }
        }
    }

    async fn get_task(&self, task_uuid: &str) -> Result<Task, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.enter(format!("get_task:{}", task_uuid))?;
        let (kind, resource_uuid, status) = {
            let (kind, resource_uuid, statuses) = state
                .tasks
                .get_mut(task_uuid)
                .ok_or_else(|| ClientError::not_found(format!("task {}", task_uuid)))?;
            let status = if statuses.len() > 1 {
                statuses.pop_front()
            } else {
                statuses.front().cloned()
            }
            .unwrap_or(TaskStatus::Succeeded);
            (*kind, resource_uuid.clone(), status)
        };

        let mut task = Task::new(task_uuid, status.clone());
        match status {
            TaskStatus::Succeeded => {
                if let Some(kind) = kind {
                    state.resources(kind).retain(|r| r.uuid != resource_uuid);
                }
            }
            TaskStatus::Failed => {
                task.error_detail = Some(format!("{} is in use", resource_uuid));
                task.progress_message = Some("Deleting entity".to_string());
            }
            _ => {}
        }
        Ok(task)
    }
}
