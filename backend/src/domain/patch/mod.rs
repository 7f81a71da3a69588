//! Partial updates of a customer through add/remove/replace operations.
//!
//! Operations run in three fixed phases, whatever their order in the
//! request: every `replace`, then every `add`, then every `remove`. Each
//! phase consumes the snapshot produced by the previous one. There is no
//! rollback: when a phase fails, [`PatchError::partial`] holds the snapshot
//! with everything applied up to the failing operation.

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, trace};
use utoipa::ToSchema;

use crate::domain::{Error, InteresseType, Kunde};

/// Path addressing the surname.
pub const NACHNAME_PATH: &str = "/nachname";
/// Path addressing the email address.
pub const EMAIL_PATH: &str = "/email";
/// Path addressing the interest collection.
pub const INTERESSEN_PATH: &str = "/interessen";

/// Kind of a patch operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum PatchOperationType {
    Add,
    Remove,
    Replace,
}

/// One patch instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PatchOperation {
    pub op: PatchOperationType,
    #[schema(example = "/interessen")]
    pub path: String,
    #[serde(default)]
    #[schema(example = "R")]
    pub value: String,
}

impl PatchOperation {
    pub fn new(op: PatchOperationType, path: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            op,
            path: path.into(),
            value: value.into(),
        }
    }
}

/// Why a patch was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchFailure {
    /// A `replace` targeted a path other than surname or email.
    UnsupportedPath,
    /// The value does not resolve to an interest tag.
    UnknownInteresse,
    /// An `add` named a tag the customer already has.
    DuplicateInteresse,
    /// The remove phase ran on a customer without an interest collection.
    MissingInteressen,
}

impl PatchFailure {
    fn code(self) -> &'static str {
        match self {
            Self::UnsupportedPath => "unsupported_path",
            Self::UnknownInteresse => "unknown_interesse",
            Self::DuplicateInteresse => "duplicate_interesse",
            Self::MissingInteressen => "missing_interessen",
        }
    }
}

/// A rejected patch together with the partially patched customer.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("Mindestens eine ungueltige Patch-Operation")]
pub struct PatchError {
    /// The operation that failed; `None` when the phase itself was invalid.
    pub operation: Option<PatchOperation>,
    pub reason: PatchFailure,
    pub partial: Box<Kunde>,
}

impl From<PatchError> for Error {
    fn from(value: PatchError) -> Self {
        let path = value.operation.as_ref().map(|op| op.path.clone());
        Error::unprocessable_entity(value.to_string()).with_details(json!({
            "code": "invalid_patch_operation",
            "reason": value.reason.code(),
            "path": path,
        }))
    }
}

/// Applies patch operations to customer snapshots.
#[derive(Debug, Default, Clone, Copy)]
pub struct KundePatcher;

impl KundePatcher {
    /// Apply `operations` to a copy of `kunde`.
    ///
    /// # Examples
    /// ```
    /// use kunde::domain::{Kunde, KundePatcher, PatchOperation, PatchOperationType};
    ///
    /// let kunde = Kunde::new("Alpha", "alpha@acme.de");
    /// let ops = [PatchOperation::new(PatchOperationType::Replace, "/nachname", "Beta")];
    /// let patched = KundePatcher.apply(&kunde, &ops).unwrap();
    /// assert_eq!(patched.nachname, "Beta");
    /// ```
    pub fn apply(&self, kunde: &Kunde, operations: &[PatchOperation]) -> Result<Kunde, PatchError> {
        let of_type = |op_type: PatchOperationType| {
            operations
                .iter()
                .filter(move |op: &&PatchOperation| op.op == op_type)
        };

        debug!(count = operations.len(), "applying patch operations");
        let replaced = Self::replace_phase(kunde, of_type(PatchOperationType::Replace))?;
        let added = Self::add_phase(&replaced, of_type(PatchOperationType::Add))?;
        Self::remove_phase(&added, of_type(PatchOperationType::Remove))
    }

    fn replace_phase<'a>(
        snapshot: &Kunde,
        ops: impl Iterator<Item = &'a PatchOperation>,
    ) -> Result<Kunde, PatchError> {
        let mut next = snapshot.clone();
        for op in ops {
            match op.path.as_str() {
                NACHNAME_PATH => next.nachname.clone_from(&op.value),
                EMAIL_PATH => next.email.clone_from(&op.value),
                _ => return Err(fail(Some(op), PatchFailure::UnsupportedPath, next)),
            }
        }
        trace!(nachname = %next.nachname, email = %next.email, "replace phase done");
        Ok(next)
    }

    fn add_phase<'a>(
        snapshot: &Kunde,
        ops: impl Iterator<Item = &'a PatchOperation>,
    ) -> Result<Kunde, PatchError> {
        let mut next = snapshot.clone();
        for op in ops.filter(|op| op.path == INTERESSEN_PATH) {
            let Some(tag) = InteresseType::of(&op.value) else {
                return Err(fail(Some(op), PatchFailure::UnknownInteresse, next));
            };
            let mut interessen = next.interessen.clone().unwrap_or_default();
            if interessen.contains(&tag) {
                return Err(fail(Some(op), PatchFailure::DuplicateInteresse, next));
            }
            interessen.push(tag);
            next.interessen = Some(interessen);
        }
        trace!(interessen = ?next.interessen, "add phase done");
        Ok(next)
    }

    fn remove_phase<'a>(
        snapshot: &Kunde,
        ops: impl Iterator<Item = &'a PatchOperation>,
    ) -> Result<Kunde, PatchError> {
        let mut next = snapshot.clone();
        if next.interessen.is_none() {
            return Err(fail(None, PatchFailure::MissingInteressen, next));
        }
        for op in ops.filter(|op| op.path == INTERESSEN_PATH) {
            let Some(tag) = InteresseType::of(&op.value) else {
                return Err(fail(Some(op), PatchFailure::UnknownInteresse, next));
            };
            if let Some(interessen) = next.interessen.as_mut() {
                interessen.retain(|existing| *existing != tag);
            }
        }
        trace!(interessen = ?next.interessen, "remove phase done");
        Ok(next)
    }
}

fn fail(operation: Option<&PatchOperation>, reason: PatchFailure, partial: Kunde) -> PatchError {
    debug!(?operation, ?reason, "rejecting patch");
    PatchError {
        operation: operation.cloned(),
        reason,
        partial: Box::new(partial),
    }
}
