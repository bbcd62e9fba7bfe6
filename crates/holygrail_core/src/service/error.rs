//! Service-level error taxonomy.

use crate::model::mission::MissionId;
use crate::model::realm::RealmId;
use crate::model::{EntityKind, LookupKey};
use crate::repo::RepoError;
use crate::rules::wait_chain::WaitForError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type GrailResult<T> = Result<T, GrailError>;

#[derive(Debug)]
pub enum GrailError {
    RealmNotFound(LookupKey),
    QuestNotFound(LookupKey),
    MissionNotFound(LookupKey),
    /// Realm still owns at least one mission.
    RealmHasChildren(RealmId),
    CannotRemoveDefaultRealm(RealmId),
    WaitFor(WaitForError),
    /// Tag being removed is not attached to the mission.
    TagNotFound { mission: MissionId, tag: String },
    /// An open mission with the same description already exists.
    DuplicateMission(String),
    /// Description or tag is blank after trim.
    InvalidDescription,
    Repo(RepoError),
}

impl Display for GrailError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::RealmNotFound(key) => write!(f, "this realm doesn't exist: {key}"),
            Self::QuestNotFound(key) => write!(f, "this quest doesn't exist: {key}"),
            Self::MissionNotFound(key) => write!(f, "this mission doesn't exist: {key}"),
            Self::RealmHasChildren(_) => {
                write!(f, "this realm still contains missions, can't remove it")
            }
            Self::CannotRemoveDefaultRealm(_) => write!(
                f,
                "can't remove the default realm, change it before removing it"
            ),
            Self::WaitFor(err) => write!(f, "{err}"),
            Self::TagNotFound { tag, .. } => write!(f, "tag `{tag}` doesn't exist"),
            Self::DuplicateMission(description) => {
                write!(f, "an open mission `{description}` already exists")
            }
            Self::InvalidDescription => write!(f, "description must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GrailError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::WaitFor(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for GrailError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { kind, id } => match kind {
                EntityKind::Realm => Self::RealmNotFound(LookupKey::Id(id)),
                EntityKind::Quest => Self::QuestNotFound(LookupKey::Id(id)),
                EntityKind::Mission => Self::MissionNotFound(LookupKey::Id(id)),
            },
            other => Self::Repo(other),
        }
    }
}

impl From<WaitForError> for GrailError {
    fn from(value: WaitForError) -> Self {
        Self::WaitFor(value)
    }
}

/// Trims `value`, rejecting blank input.
pub(crate) fn normalize_description(value: impl Into<String>) -> GrailResult<String> {
    let value = value.into();
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GrailError::InvalidDescription);
    }
    Ok(trimmed.to_string())
}
