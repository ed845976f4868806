//! Mesos task messages
//!
//! Hand-written prost definitions for the subset of `mesos.proto` that
//! services persist in the store: `TaskInfo` (launch description) and
//! `TaskStatus` (last known status). Proto2 presence is modelled with
//! `Option`, so "unset" and "set to the default" stay distinguishable and
//! required fields can be checked after decoding.
//!
//! Field names keep their `.proto` spelling; JSON keys follow declaration
//! order.

use prost::Message;
use serde::{Deserialize, Serialize};

use super::enums::{base64_bytes, named, NamedEnum};

macro_rules! named_enum {
    ($(#[$meta:meta])* $name:ident = $proto:literal { $($variant:ident = $number:literal => $label:literal,)+ }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant,)+
        }

        impl NamedEnum for $name {
            const TYPE_NAME: &'static str = $proto;
            const ALL: &'static [Self] = &[$(Self::$variant,)+];

            fn number(self) -> i32 {
                match self {
                    $(Self::$variant => $number,)+
                }
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }
    };
}

named_enum! {
    /// `mesos.TaskState`
    TaskState = "mesos.TaskState" {
        Staging = 6 => "TASK_STAGING",
        Starting = 0 => "TASK_STARTING",
        Running = 1 => "TASK_RUNNING",
        Killing = 8 => "TASK_KILLING",
        Finished = 2 => "TASK_FINISHED",
        Failed = 3 => "TASK_FAILED",
        Killed = 4 => "TASK_KILLED",
        Error = 7 => "TASK_ERROR",
        Lost = 5 => "TASK_LOST",
    }
}

named_enum! {
    /// `mesos.TaskStatus.Source`
    StatusSource = "mesos.TaskStatus.Source" {
        Master = 0 => "SOURCE_MASTER",
        Slave = 1 => "SOURCE_SLAVE",
        Executor = 2 => "SOURCE_EXECUTOR",
    }
}

named_enum! {
    /// `mesos.TaskStatus.Reason`
    StatusReason = "mesos.TaskStatus.Reason" {
        CommandExecutorFailed = 0 => "REASON_COMMAND_EXECUTOR_FAILED",
        ExecutorTerminated = 1 => "REASON_EXECUTOR_TERMINATED",
        ExecutorUnregistered = 2 => "REASON_EXECUTOR_UNREGISTERED",
        FrameworkRemoved = 3 => "REASON_FRAMEWORK_REMOVED",
        GcError = 4 => "REASON_GC_ERROR",
        InvalidFrameworkId = 5 => "REASON_INVALID_FRAMEWORKID",
        InvalidOffers = 6 => "REASON_INVALID_OFFERS",
        MasterDisconnected = 7 => "REASON_MASTER_DISCONNECTED",
        ContainerLimitationMemory = 8 => "REASON_CONTAINER_LIMITATION_MEMORY",
        Reconciliation = 9 => "REASON_RECONCILIATION",
        SlaveDisconnected = 10 => "REASON_SLAVE_DISCONNECTED",
        SlaveRemoved = 11 => "REASON_SLAVE_REMOVED",
        SlaveRestarted = 12 => "REASON_SLAVE_RESTARTED",
        SlaveUnknown = 13 => "REASON_SLAVE_UNKNOWN",
        TaskInvalid = 14 => "REASON_TASK_INVALID",
        TaskUnauthorized = 15 => "REASON_TASK_UNAUTHORIZED",
        TaskUnknown = 16 => "REASON_TASK_UNKNOWN",
        ContainerPreempted = 17 => "REASON_CONTAINER_PREEMPTED",
        ResourcesUnknown = 18 => "REASON_RESOURCES_UNKNOWN",
        ContainerLimitation = 19 => "REASON_CONTAINER_LIMITATION",
        ContainerLimitationDisk = 20 => "REASON_CONTAINER_LIMITATION_DISK",
        ContainerLaunchFailed = 21 => "REASON_CONTAINER_LAUNCH_FAILED",
        ContainerUpdateFailed = 22 => "REASON_CONTAINER_UPDATE_FAILED",
        ExecutorRegistrationTimeout = 23 => "REASON_EXECUTOR_REGISTRATION_TIMEOUT",
        ExecutorReregistrationTimeout = 24 => "REASON_EXECUTOR_REREGISTRATION_TIMEOUT",
    }
}

named_enum! {
    /// `mesos.Value.Type`
    ValueType = "mesos.Value.Type" {
        Scalar = 0 => "SCALAR",
        Ranges = 1 => "RANGES",
        Set = 2 => "SET",
        Text = 3 => "TEXT",
    }
}

/// Reports the first unset required field, as a dotted path
pub trait Required {
    fn missing_field(&self) -> Option<String>;
}

fn require<T>(value: &Option<T>, name: &str) -> Option<String> {
    value.is_none().then(|| name.to_string())
}

fn nested<M: Required>(value: &Option<M>, name: &str) -> Option<String> {
    value
        .as_ref()
        .and_then(Required::missing_field)
        .map(|field| format!("{}.{}", name, field))
}

fn each<M: Required>(values: &[M], name: &str) -> Option<String> {
    values.iter().enumerate().find_map(|(i, value)| {
        value
            .missing_field()
            .map(|field| format!("{}[{}].{}", name, i, field))
    })
}

// ==================
// Identifiers
// ==================

/// `mesos.TaskID`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskId {
    #[prost(string, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// `mesos.SlaveID`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SlaveId {
    #[prost(string, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// `mesos.ExecutorID`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExecutorId {
    #[prost(string, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl TaskId {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

impl SlaveId {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
        }
    }
}

impl Required for TaskId {
    fn missing_field(&self) -> Option<String> {
        require(&self.value, "value")
    }
}

impl Required for SlaveId {
    fn missing_field(&self) -> Option<String> {
        require(&self.value, "value")
    }
}

impl Required for ExecutorId {
    fn missing_field(&self) -> Option<String> {
        require(&self.value, "value")
    }
}

// ==================
// Resources
// ==================

/// `mesos.Value.Scalar`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueScalar {
    #[prost(double, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
}

/// `mesos.Value.Range`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueRange {
    #[prost(uint64, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin: Option<u64>,

    #[prost(uint64, optional, tag = "2")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<u64>,
}

/// `mesos.Value.Ranges`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueRanges {
    #[prost(message, repeated, tag = "1")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub range: Vec<ValueRange>,
}

/// `mesos.Value.Set`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueSet {
    #[prost(string, repeated, tag = "1")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<String>,
}

/// `mesos.Resource`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Resource {
    #[prost(string, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[prost(int32, optional, tag = "2")]
    #[serde(
        rename = "type",
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "named::serialize::<ValueType, _>",
        deserialize_with = "named::deserialize::<ValueType, _>"
    )]
    pub r#type: Option<i32>,

    #[prost(message, optional, tag = "3")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalar: Option<ValueScalar>,

    #[prost(message, optional, tag = "4")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ranges: Option<ValueRanges>,

    #[prost(message, optional, tag = "5")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<ValueSet>,

    #[prost(string, optional, tag = "6")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Resource {
    /// Scalar resource such as `cpus` or `mem`
    pub fn scalar(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: Some(name.into()),
            r#type: Some(ValueType::Scalar.number()),
            scalar: Some(ValueScalar { value: Some(value) }),
            ..Default::default()
        }
    }
}

impl Required for ValueScalar {
    fn missing_field(&self) -> Option<String> {
        require(&self.value, "value")
    }
}

impl Required for ValueRange {
    fn missing_field(&self) -> Option<String> {
        require(&self.begin, "begin").or_else(|| require(&self.end, "end"))
    }
}

impl Required for ValueRanges {
    fn missing_field(&self) -> Option<String> {
        each(&self.range, "range")
    }
}

impl Required for Resource {
    fn missing_field(&self) -> Option<String> {
        require(&self.name, "name")
            .or_else(|| require(&self.r#type, "type"))
            .or_else(|| nested(&self.scalar, "scalar"))
            .or_else(|| nested(&self.ranges, "ranges"))
    }
}

// ==================
// Command and labels
// ==================

/// `mesos.Environment.Variable`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentVariable {
    #[prost(string, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[prost(string, optional, tag = "2")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// `mesos.Environment`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Environment {
    #[prost(message, repeated, tag = "1")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<EnvironmentVariable>,
}

/// `mesos.CommandInfo`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandInfo {
    #[prost(message, optional, tag = "2")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<Environment>,

    #[prost(bool, optional, tag = "6")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shell: Option<bool>,

    #[prost(string, optional, tag = "3")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[prost(string, repeated, tag = "7")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,

    #[prost(string, optional, tag = "5")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
}

/// `mesos.Label`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Label {
    #[prost(string, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[prost(string, optional, tag = "2")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

/// `mesos.Labels`
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Labels {
    #[prost(message, repeated, tag = "1")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<Label>,
}

impl Required for EnvironmentVariable {
    fn missing_field(&self) -> Option<String> {
        require(&self.name, "name").or_else(|| require(&self.value, "value"))
    }
}

impl Required for Environment {
    fn missing_field(&self) -> Option<String> {
        each(&self.variables, "variables")
    }
}

impl Required for CommandInfo {
    fn missing_field(&self) -> Option<String> {
        nested(&self.environment, "environment")
    }
}

impl Required for Label {
    fn missing_field(&self) -> Option<String> {
        require(&self.key, "key")
    }
}

impl Required for Labels {
    fn missing_field(&self) -> Option<String> {
        each(&self.labels, "labels")
    }
}

// ==================
// Top-level messages
// ==================

/// `mesos.TaskInfo`
///
/// Required: `name`, `task_id`, `slave_id`.
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskInfo {
    #[prost(string, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[prost(message, optional, tag = "2")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,

    #[prost(message, optional, tag = "3")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slave_id: Option<SlaveId>,

    #[prost(message, repeated, tag = "4")]
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub resources: Vec<Resource>,

    #[prost(message, optional, tag = "7")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<CommandInfo>,

    #[prost(bytes = "vec", optional, tag = "6")]
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    pub data: Option<Vec<u8>>,

    #[prost(message, optional, tag = "10")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
}

impl Required for TaskInfo {
    fn missing_field(&self) -> Option<String> {
        require(&self.name, "name")
            .or_else(|| require(&self.task_id, "task_id"))
            .or_else(|| nested(&self.task_id, "task_id"))
            .or_else(|| require(&self.slave_id, "slave_id"))
            .or_else(|| nested(&self.slave_id, "slave_id"))
            .or_else(|| each(&self.resources, "resources"))
            .or_else(|| nested(&self.command, "command"))
            .or_else(|| nested(&self.labels, "labels"))
    }
}

/// `mesos.TaskStatus`
///
/// Required: `task_id`, `state`.
#[derive(Clone, PartialEq, Message, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskStatus {
    #[prost(message, optional, tag = "1")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<TaskId>,

    #[prost(int32, optional, tag = "2")]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "named::serialize::<TaskState, _>",
        deserialize_with = "named::deserialize::<TaskState, _>"
    )]
    pub state: Option<i32>,

    #[prost(string, optional, tag = "4")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[prost(int32, optional, tag = "9")]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "named::serialize::<StatusSource, _>",
        deserialize_with = "named::deserialize::<StatusSource, _>"
    )]
    pub source: Option<i32>,

    #[prost(int32, optional, tag = "10")]
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        serialize_with = "named::serialize::<StatusReason, _>",
        deserialize_with = "named::deserialize::<StatusReason, _>"
    )]
    pub reason: Option<i32>,

    #[prost(bytes = "vec", optional, tag = "3")]
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    pub data: Option<Vec<u8>>,

    #[prost(message, optional, tag = "5")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slave_id: Option<SlaveId>,

    #[prost(message, optional, tag = "7")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executor_id: Option<ExecutorId>,

    #[prost(double, optional, tag = "6")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,

    #[prost(bytes = "vec", optional, tag = "11")]
    #[serde(default, skip_serializing_if = "Option::is_none", with = "base64_bytes")]
    pub uuid: Option<Vec<u8>>,

    #[prost(bool, optional, tag = "8")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub healthy: Option<bool>,

    #[prost(message, optional, tag = "12")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub labels: Option<Labels>,
}

impl Required for TaskStatus {
    fn missing_field(&self) -> Option<String> {
        require(&self.task_id, "task_id")
            .or_else(|| nested(&self.task_id, "task_id"))
            .or_else(|| require(&self.state, "state"))
            .or_else(|| nested(&self.slave_id, "slave_id"))
            .or_else(|| nested(&self.executor_id, "executor_id"))
            .or_else(|| nested(&self.labels, "labels"))
    }
}

impl TaskInfo {
    /// Minimal valid launch description
    pub fn new(name: &str, task_id: &str, slave_id: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            task_id: Some(TaskId::new(task_id)),
            slave_id: Some(SlaveId::new(slave_id)),
            ..Default::default()
        }
    }
}

impl TaskStatus {
    /// Minimal valid status
    pub fn new(task_id: &str, state: TaskState) -> Self {
        Self {
            task_id: Some(TaskId::new(task_id)),
            state: Some(state.number()),
            ..Default::default()
        }
    }

    /// Decoded `state`, if it has a known name
    pub fn task_state(&self) -> Option<TaskState> {
        self.state.and_then(TaskState::from_number)
    }
}
