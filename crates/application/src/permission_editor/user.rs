use std::sync::Arc;

use servora_core::{AppError, AppResult};
use servora_domain::{BaselineSet, OverrideMap, UserId, UserSummary};
use tracing::{debug, info};

use super::{PermissionEditor, baseline_from_rows, no_subject_selected, overrides_from_rows};
use crate::{
    ExceptionState, OverrideDiff, PermissionGateway, ScopePolicy, ServiceTree, reconcile_overrides,
};

/// Exception delta captured by [`UserExceptionEditor::prepare_save`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending save must be completed to release the editor"]
pub struct PendingUserSave {
    user_id: UserId,
    session: u64,
    diff: OverrideDiff,
    saved: ExceptionState,
}

impl PendingUserSave {
    /// Returns the user being saved.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the rows to delete and insert.
    #[must_use]
    pub fn diff(&self) -> &OverrideDiff {
        &self.diff
    }
}

#[derive(Debug, Clone)]
struct UserSession {
    user: UserSummary,
    id: u64,
    editor: PermissionEditor<ExceptionState>,
    stored: OverrideMap,
}

impl UserSession {
    fn diff_to(&self, state: &ExceptionState) -> OverrideDiff {
        reconcile_overrides(&self.stored, state.overrides(), state.job_baseline())
    }
}

/// Editor for the exceptions of one user at a time, layered over the
/// baseline of the user's job.
///
/// Until a user is selected, or after loading one failed, the editor is inert
/// and every mutating call fails with a conflict.
pub struct UserExceptionEditor {
    gateway: Arc<dyn PermissionGateway>,
    tree: Arc<ServiceTree>,
    policy: ScopePolicy,
    session: Option<UserSession>,
    sessions_started: u64,
}

impl UserExceptionEditor {
    /// Creates an editor over an already loaded catalog.
    #[must_use]
    pub fn new(gateway: Arc<dyn PermissionGateway>, tree: Arc<ServiceTree>) -> Self {
        Self {
            gateway,
            tree,
            policy: ScopePolicy::Subtree,
            session: None,
            sessions_started: 0,
        }
    }

    /// Loads the catalog through the gateway and creates an editor over it.
    pub async fn open(gateway: Arc<dyn PermissionGateway>) -> AppResult<Self> {
        let build = ServiceTree::build(gateway.load_service_records().await?)?;
        Ok(Self::new(gateway, Arc::new(build.tree)))
    }

    /// Overrides the bulk scope policy for sessions started afterwards.
    #[must_use]
    pub fn with_policy(mut self, policy: ScopePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the catalog being edited.
    #[must_use]
    pub fn tree(&self) -> &ServiceTree {
        &self.tree
    }

    /// Returns the selected user, if any.
    #[must_use]
    pub fn user(&self) -> Option<&UserSummary> {
        self.session.as_ref().map(|session| &session.user)
    }

    /// Loads a user's job baseline and exceptions and starts a fresh session.
    ///
    /// A user without a job inherits an empty baseline. Stored rows equal to
    /// the inherited value are left out of the session and deleted by the
    /// next save. Unsaved edits of the previous user are discarded; on a load
    /// failure the editor becomes inert.
    pub async fn select_user(&mut self, user_id: UserId) -> AppResult<()> {
        self.session = None;

        let user = self
            .gateway
            .find_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))?;

        let job_baseline = match user.job_id {
            Some(job_id) => {
                baseline_from_rows(&self.tree, self.gateway.load_job_baseline(job_id).await?)
            }
            None => BaselineSet::new(),
        };
        let stored =
            overrides_from_rows(&self.tree, self.gateway.load_user_overrides(user_id).await?);
        let mut loaded = ExceptionState::new(job_baseline, stored.clone());
        loaded.collapse_redundant();
        debug!(
            user_id = %user_id,
            inherited = loaded.job_baseline().len(),
            exceptions = loaded.overrides().len(),
            stale = stored.len() - loaded.overrides().len(),
            "loaded user exceptions"
        );

        self.sessions_started += 1;
        self.session = Some(UserSession {
            user,
            id: self.sessions_started,
            editor: PermissionEditor::new(Arc::clone(&self.tree), loaded, self.policy),
            stored,
        });

        Ok(())
    }

    /// Drops the current session without saving.
    pub fn clear_selection(&mut self) {
        self.session = None;
    }

    /// Returns the session of the selected user.
    pub fn editor(&self) -> AppResult<&PermissionEditor<ExceptionState>> {
        self.session
            .as_ref()
            .map(|session| &session.editor)
            .ok_or_else(|| no_subject_selected("user"))
    }

    /// Returns the session of the selected user for editing.
    pub fn editor_mut(&mut self) -> AppResult<&mut PermissionEditor<ExceptionState>> {
        self.session
            .as_mut()
            .map(|session| &mut session.editor)
            .ok_or_else(|| no_subject_selected("user"))
    }

    /// Returns whether the selected user has unsaved edits.
    ///
    /// Stale stored rows awaiting deletion do not count as edits.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.editor.has_changes())
    }

    /// Captures the exception delta to persist and marks the session as saving.
    pub fn prepare_save(&mut self) -> AppResult<PendingUserSave> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| no_subject_selected("user"))?;
        let saved = session.editor.begin_save()?;
        let diff = session.diff_to(&saved);

        Ok(PendingUserSave {
            user_id: session.user.user_id,
            session: session.id,
            diff,
            saved,
        })
    }

    /// Finishes a save with the gateway's result.
    ///
    /// On success the snapshot becomes the saved exceptions. A failure leaves
    /// state and snapshot untouched and is returned to the caller.
    pub fn complete_save(
        &mut self,
        pending: PendingUserSave,
        result: AppResult<()>,
    ) -> AppResult<()> {
        let PendingUserSave {
            user_id,
            session: session_id,
            diff,
            saved,
        } = pending;

        let written = saved.overrides().clone();
        let (editor, stored) = self
            .session
            .as_mut()
            .filter(|session| session.id == session_id)
            .map(|session| (&mut session.editor, &mut session.stored))
            .unzip();

        if PermissionEditor::settle_save(editor, saved, result, "user exception", user_id)? {
            if let Some(stored) = stored {
                *stored = written;
            }
            info!(
                user_id = %user_id,
                inserted = diff.inserts.len(),
                deleted = diff.deletes.len(),
                "saved user exceptions"
            );
        }
        Ok(())
    }

    /// Persists the selected user's exceptions as a minimal delta.
    ///
    /// Nothing is sent when storage already matches the state under edit.
    pub async fn save(&mut self) -> AppResult<()> {
        let session = self
            .session
            .as_ref()
            .ok_or_else(|| no_subject_selected("user"))?;
        if session.diff_to(session.editor.current()).is_empty() {
            debug!("user exceptions unchanged, skipping save");
            return Ok(());
        }

        let pending = self.prepare_save()?;
        let result = self
            .gateway
            .save_user_overrides(pending.user_id, pending.diff.clone())
            .await;
        self.complete_save(pending, result)
    }
}
