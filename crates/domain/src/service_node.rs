use std::fmt::{Display, Formatter};
use std::str::FromStr;

use servora_core::{AppError, AppResult, NonEmptyString};
use serde::{Deserialize, Serialize};

/// Level of a node inside the three-level service catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// Top-level service.
    Service,
    /// Second-level service nested under a service.
    SubService,
    /// Third-level service nested under a sub-service.
    SubSubService,
}

impl NodeKind {
    /// Returns the stable prefix used in kind-qualified identifiers.
    #[must_use]
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Service => "s",
            Self::SubService => "ss",
            Self::SubSubService => "sss",
        }
    }

    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Service => "service",
            Self::SubService => "sub_service",
            Self::SubSubService => "sub_sub_service",
        }
    }

    /// Returns the kind of the parent level, if any.
    #[must_use]
    pub fn parent_kind(&self) -> Option<Self> {
        match self {
            Self::Service => None,
            Self::SubService => Some(Self::Service),
            Self::SubSubService => Some(Self::SubService),
        }
    }

    /// Returns the zero-based depth of this level.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Service => 0,
            Self::SubService => 1,
            Self::SubSubService => 2,
        }
    }

    fn from_prefix(value: &str) -> Option<Self> {
        match value {
            "s" => Some(Self::Service),
            "ss" => Some(Self::SubService),
            "sss" => Some(Self::SubSubService),
            _ => None,
        }
    }
}

/// Kind-qualified node identifier, e.g. `s:7`, `ss:12` or `sss:3`.
///
/// Raw ids are only unique within one kind; the pair is globally unique.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    kind: NodeKind,
    id: i64,
}

impl NodeId {
    /// Creates a node identifier from its kind and raw id.
    #[must_use]
    pub fn new(kind: NodeKind, id: i64) -> Self {
        Self { kind, id }
    }

    /// Creates a top-level service identifier.
    #[must_use]
    pub fn service(id: i64) -> Self {
        Self::new(NodeKind::Service, id)
    }

    /// Creates a sub-service identifier.
    #[must_use]
    pub fn sub_service(id: i64) -> Self {
        Self::new(NodeKind::SubService, id)
    }

    /// Creates a sub-sub-service identifier.
    #[must_use]
    pub fn sub_sub_service(id: i64) -> Self {
        Self::new(NodeKind::SubSubService, id)
    }

    /// Returns the node level.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    /// Returns the raw id inside the kind's id space.
    #[must_use]
    pub fn raw_id(&self) -> i64 {
        self.id
    }

    /// Parses a transport value such as `ss:12`.
    pub fn from_transport(value: &str) -> AppResult<Self> {
        Self::from_str(value)
    }
}

impl Display for NodeId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}:{}", self.kind.prefix(), self.id)
    }
}

impl FromStr for NodeId {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let Some((prefix, raw_id)) = value.split_once(':') else {
            return Err(AppError::Validation(format!(
                "node id '{value}' must have the form '<kind>:<id>'"
            )));
        };

        let kind = NodeKind::from_prefix(prefix).ok_or_else(|| {
            AppError::Validation(format!("unknown node kind prefix '{prefix}' in '{value}'"))
        })?;
        let id = raw_id.parse::<i64>().map_err(|error| {
            AppError::Validation(format!("invalid numeric id in node id '{value}': {error}"))
        })?;

        Ok(Self::new(kind, id))
    }
}

/// Flat catalog record as loaded from storage, before the tree is assembled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    id: NodeId,
    parent_id: Option<i64>,
    name: NonEmptyString,
    position: i32,
}

impl ServiceRecord {
    /// Creates a validated catalog record.
    ///
    /// Services must not reference a parent; sub-services and
    /// sub-sub-services must.
    pub fn new(
        id: NodeId,
        parent_id: Option<i64>,
        name: impl Into<String>,
        position: i32,
    ) -> AppResult<Self> {
        match (id.kind().parent_kind(), parent_id) {
            (None, Some(_)) => {
                return Err(AppError::Validation(format!(
                    "service '{id}' must not reference a parent"
                )));
            }
            (Some(_), None) => {
                return Err(AppError::Validation(format!(
                    "{} '{id}' requires a parent reference",
                    id.kind().as_str()
                )));
            }
            _ => {}
        }

        Ok(Self {
            id,
            parent_id,
            name: NonEmptyString::new(name)?,
            position,
        })
    }

    /// Returns the kind-qualified node id.
    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns the kind-qualified id of the referenced parent.
    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        let parent_kind = self.id.kind().parent_kind()?;
        self.parent_id
            .map(|parent_id| NodeId::new(parent_kind, parent_id))
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &NonEmptyString {
        &self.name
    }

    /// Returns the ordering value among siblings.
    #[must_use]
    pub fn position(&self) -> i32 {
        self.position
    }
}

/// Discriminated persistence reference identifying exactly one tree level.
///
/// Storage rows carry three nullable columns; exactly one must be populated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct KindRef {
    /// Referenced service id.
    pub service_id: Option<i64>,
    /// Referenced sub-service id.
    pub sub_service_id: Option<i64>,
    /// Referenced sub-sub-service id.
    pub sub_sub_service_id: Option<i64>,
}

impl KindRef {
    /// Resolves the reference into a node id, rejecting rows that populate
    /// zero or several references.
    pub fn node_id(&self) -> AppResult<NodeId> {
        match (self.service_id, self.sub_service_id, self.sub_sub_service_id) {
            (Some(id), None, None) => Ok(NodeId::service(id)),
            (None, Some(id), None) => Ok(NodeId::sub_service(id)),
            (None, None, Some(id)) => Ok(NodeId::sub_sub_service(id)),
            (None, None, None) => Err(AppError::Validation(
                "permission row does not reference any service level".to_owned(),
            )),
            _ => Err(AppError::Validation(format!(
                "permission row references more than one service level: {self:?}"
            ))),
        }
    }
}

impl From<NodeId> for KindRef {
    fn from(value: NodeId) -> Self {
        let mut kind_ref = Self::default();
        match value.kind() {
            NodeKind::Service => kind_ref.service_id = Some(value.raw_id()),
            NodeKind::SubService => kind_ref.sub_service_id = Some(value.raw_id()),
            NodeKind::SubSubService => kind_ref.sub_sub_service_id = Some(value.raw_id()),
        }
        kind_ref
    }
}
