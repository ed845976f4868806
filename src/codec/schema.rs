//! Candidate schema table
//!
//! Each structured-message schema the codec knows is described by a
//! `SchemaEntry`: plain function pointers for wire decoding, strict text
//! parsing and a minimal sample. The codec tries entries in order.

use std::fmt;

use prost::Message;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::errors::{CodecError, CodecResult};
use super::mesos::{Required, TaskInfo, TaskState, TaskStatus};

/// Fully qualified name of a structured-message schema
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SchemaId(&'static str);

impl SchemaId {
    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// A message type that can appear as a node payload
pub trait CandidateMessage:
    Message + Default + Required + Serialize + DeserializeOwned + Sized + 'static
{
    const SCHEMA: SchemaId;

    /// Smallest message with every required field set
    fn sample() -> Self;

    fn into_decoded(self) -> DecodedMessage;
}

impl CandidateMessage for TaskInfo {
    const SCHEMA: SchemaId = SchemaId::new("mesos.TaskInfo");

    fn sample() -> Self {
        TaskInfo::new("sample", "sample-task", "sample-agent")
    }

    fn into_decoded(self) -> DecodedMessage {
        DecodedMessage::TaskInfo(self)
    }
}

impl CandidateMessage for TaskStatus {
    const SCHEMA: SchemaId = SchemaId::new("mesos.TaskStatus");

    fn sample() -> Self {
        TaskStatus::new("sample-task", TaskState::Running)
    }

    fn into_decoded(self) -> DecodedMessage {
        DecodedMessage::TaskStatus(self)
    }
}

/// A message decoded under one of the candidate schemas
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedMessage {
    TaskInfo(TaskInfo),
    TaskStatus(TaskStatus),
}

impl DecodedMessage {
    /// Schema the message was decoded under
    pub fn schema(&self) -> SchemaId {
        match self {
            DecodedMessage::TaskInfo(_) => TaskInfo::SCHEMA,
            DecodedMessage::TaskStatus(_) => TaskStatus::SCHEMA,
        }
    }

    pub fn missing_field(&self) -> Option<String> {
        match self {
            DecodedMessage::TaskInfo(m) => m.missing_field(),
            DecodedMessage::TaskStatus(m) => m.missing_field(),
        }
    }

    pub fn encode_to_vec(&self) -> Vec<u8> {
        match self {
            DecodedMessage::TaskInfo(m) => m.encode_to_vec(),
            DecodedMessage::TaskStatus(m) => m.encode_to_vec(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        match self {
            DecodedMessage::TaskInfo(m) => serde_json::to_string_pretty(m),
            DecodedMessage::TaskStatus(m) => serde_json::to_string_pretty(m),
        }
    }
}

/// One entry in the ordered candidate list
#[derive(Clone, Copy)]
pub struct SchemaEntry {
    pub id: SchemaId,
    pub decode: fn(&[u8]) -> CodecResult<DecodedMessage>,
    pub parse_text: fn(&str) -> CodecResult<DecodedMessage>,
    pub sample: fn() -> DecodedMessage,
}

impl SchemaEntry {
    /// Entry for a concrete message type
    pub fn of<M: CandidateMessage>() -> Self {
        Self {
            id: M::SCHEMA,
            decode: decode_wire::<M>,
            parse_text: parse_text::<M>,
            sample: || M::sample().into_decoded(),
        }
    }
}

impl fmt::Debug for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEntry").field("id", &self.id).finish()
    }
}

fn check_required<M: CandidateMessage>(message: M) -> CodecResult<DecodedMessage> {
    match message.missing_field() {
        Some(field) => Err(CodecError::MissingRequired {
            schema: M::SCHEMA,
            field,
        }),
        None => Ok(message.into_decoded()),
    }
}

fn decode_wire<M: CandidateMessage>(raw: &[u8]) -> CodecResult<DecodedMessage> {
    let message = M::decode(raw).map_err(|e| CodecError::Decode {
        schema: M::SCHEMA,
        reason: e.to_string(),
    })?;
    check_required(message)
}

fn parse_text<M: CandidateMessage>(text: &str) -> CodecResult<DecodedMessage> {
    let message: M = serde_json::from_str(text).map_err(|e| CodecError::Text {
        schema: M::SCHEMA,
        reason: e.to_string(),
    })?;
    check_required(message)
}
