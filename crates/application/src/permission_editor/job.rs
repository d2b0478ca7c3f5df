use std::sync::Arc;

use servora_core::AppResult;
use servora_domain::{JobId, KindRef};
use tracing::{debug, info};

use super::{PermissionEditor, baseline_from_rows, no_subject_selected};
use crate::{BaselineState, PermissionGateway, ScopePolicy, ServiceTree, baseline_rows};

/// Baseline save captured by [`JobPermissionEditor::prepare_save`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending save must be completed to release the editor"]
pub struct PendingJobSave {
    job_id: JobId,
    session: u64,
    rows: Vec<KindRef>,
    saved: BaselineState,
}

impl PendingJobSave {
    /// Returns the job being saved.
    #[must_use]
    pub fn job_id(&self) -> JobId {
        self.job_id
    }

    /// Returns the full-replace payload.
    #[must_use]
    pub fn rows(&self) -> &[KindRef] {
        self.rows.as_slice()
    }
}

#[derive(Debug, Clone)]
struct JobSession {
    job_id: JobId,
    id: u64,
    editor: PermissionEditor<BaselineState>,
}

/// Editor for the baseline grants of one job at a time.
///
/// Until a job is selected, or after loading one failed, the editor is inert
/// and every mutating call fails with a conflict.
pub struct JobPermissionEditor {
    gateway: Arc<dyn PermissionGateway>,
    tree: Arc<ServiceTree>,
    policy: ScopePolicy,
    session: Option<JobSession>,
    sessions_started: u64,
}

impl JobPermissionEditor {
    /// Creates an editor over an already loaded catalog.
    #[must_use]
    pub fn new(gateway: Arc<dyn PermissionGateway>, tree: Arc<ServiceTree>) -> Self {
        Self {
            gateway,
            tree,
            policy: ScopePolicy::Row,
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

    /// Returns the selected job, if any.
    #[must_use]
    pub fn job_id(&self) -> Option<JobId> {
        self.session.as_ref().map(|session| session.job_id)
    }

    /// Loads a job baseline and starts a fresh session for it.
    ///
    /// Unsaved edits of the previous job are discarded; callers guard with
    /// [`Self::has_changes`]. On a load failure the editor becomes inert.
    pub async fn select_job(&mut self, job_id: JobId) -> AppResult<()> {
        self.session = None;

        let rows = self.gateway.load_job_baseline(job_id).await?;
        let granted = baseline_from_rows(&self.tree, rows);
        debug!(job_id = %job_id, granted = granted.len(), "loaded job baseline");

        self.sessions_started += 1;
        self.session = Some(JobSession {
            job_id,
            id: self.sessions_started,
            editor: PermissionEditor::new(
                Arc::clone(&self.tree),
                BaselineState::new(granted),
                self.policy,
            ),
        });

        Ok(())
    }

    /// Drops the current session without saving.
    pub fn clear_selection(&mut self) {
        self.session = None;
    }

    /// Returns the session of the selected job.
    pub fn editor(&self) -> AppResult<&PermissionEditor<BaselineState>> {
        self.session
            .as_ref()
            .map(|session| &session.editor)
            .ok_or_else(|| no_subject_selected("job"))
    }

    /// Returns the session of the selected job for editing.
    pub fn editor_mut(&mut self) -> AppResult<&mut PermissionEditor<BaselineState>> {
        self.session
            .as_mut()
            .map(|session| &mut session.editor)
            .ok_or_else(|| no_subject_selected("job"))
    }

    /// Returns whether the selected job has unsaved edits.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|session| session.editor.has_changes())
    }

    /// Captures the baseline to persist and marks the session as saving.
    pub fn prepare_save(&mut self) -> AppResult<PendingJobSave> {
        let session = self
            .session
            .as_mut()
            .ok_or_else(|| no_subject_selected("job"))?;
        let saved = session.editor.begin_save()?;

        Ok(PendingJobSave {
            job_id: session.job_id,
            session: session.id,
            rows: baseline_rows(saved.granted()),
            saved,
        })
    }

    /// Finishes a save with the gateway's result.
    ///
    /// On success the snapshot becomes the saved baseline. A failure leaves
    /// state and snapshot untouched and is returned to the caller.
    pub fn complete_save(
        &mut self,
        pending: PendingJobSave,
        result: AppResult<()>,
    ) -> AppResult<()> {
        let PendingJobSave {
            job_id,
            session: session_id,
            saved,
            ..
        } = pending;

        let editor = self
            .session
            .as_mut()
            .filter(|session| session.id == session_id)
            .map(|session| &mut session.editor);

        if PermissionEditor::settle_save(editor, saved, result, "job baseline", job_id)? {
            info!(job_id = %job_id, "saved job baseline");
        }
        Ok(())
    }

    /// Persists the selected job's baseline.
    ///
    /// Nothing is sent when there are no unsaved edits.
    pub async fn save(&mut self) -> AppResult<()> {
        if !self.editor()?.has_changes() {
            debug!("job baseline unchanged, skipping save");
            return Ok(());
        }

        let pending = self.prepare_save()?;
        let result = self
            .gateway
            .save_job_baseline(pending.job_id, pending.rows.clone())
            .await;
        self.complete_save(pending, result)
    }
}
