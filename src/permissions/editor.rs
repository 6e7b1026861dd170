//! Policy editor state.

use super::notice::Notice;
use crate::error::EditorError;
use beeconnect_client::{ClientError, PolicyApi};
use beeconnect_policy::{CheckedPolicySet, PolicyDiff};
use beeconnect_types::{OrgTypeId, Policy, PolicyCategories, PolicyDraft, RoleId};
use std::collections::BTreeSet;
use std::sync::Arc;

pub const SELECTION_REQUIRED: &str = "Select an organization type and a role first";
pub const ASSIGNMENT_LOADING: &str = "Permissions are still loading for this selection";

/// The (organization type, role) pair being edited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Selection {
    pub org_type: Option<OrgTypeId>,
    pub role: Option<RoleId>,
}

impl Selection {
    pub fn complete(&self) -> Option<(OrgTypeId, RoleId)> {
        Some((self.org_type?, self.role?))
    }
}

/// Ticket for one in-flight assignment lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignmentRequest {
    pub token: u64,
    pub org_type: OrgTypeId,
    pub role: RoleId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssignmentOutcome {
    /// A policy row for the requested pair was loaded.
    Assigned,
    /// No policy exists yet for the pair (or the lookup was unusable).
    Unassigned,
    /// A newer lookup was started; this response was dropped.
    Stale,
}

pub struct PolicyEditor<A: PolicyApi + ?Sized> {
    api: Arc<A>,
    categories: PolicyCategories,
    searchable: BTreeSet<String>,
    selection: Selection,
    policy_id: Option<String>,
    /// Accesses as last loaded or saved, for diffing.
    baseline: BTreeSet<String>,
    checked: CheckedPolicySet,
    latest_request: u64,
    loading: bool,
    notice: Option<Notice>,
}

impl<A: PolicyApi + ?Sized> PolicyEditor<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            categories: PolicyCategories::new(),
            searchable: BTreeSet::new(),
            selection: Selection::default(),
            policy_id: None,
            baseline: BTreeSet::new(),
            checked: CheckedPolicySet::new(),
            latest_request: 0,
            loading: false,
            notice: None,
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn categories(&self) -> &PolicyCategories {
        &self.categories
    }

    pub fn searchable(&self) -> &BTreeSet<String> {
        &self.searchable
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn policy_id(&self) -> Option<&str> {
        self.policy_id.as_deref()
    }

    pub fn checked(&self) -> &CheckedPolicySet {
        &self.checked
    }

    pub fn checked_set(&self) -> BTreeSet<String> {
        self.checked.flattened()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn diff(&self) -> PolicyDiff {
        self.checked.diff(&self.baseline)
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Load the key universe. On failure the editor is left with no
    /// categories but stays usable.
    pub async fn fetch_categories(&mut self) -> Result<(), EditorError> {
        match self.api.list_policy_categories().await {
            Ok(categories) => {
                self.searchable = categories.searchable();
                self.categories = categories;
                // Re-slot anything loaded before the categories arrived.
                self.checked =
                    CheckedPolicySet::from_accesses(&self.categories, self.checked.flattened());
                tracing::debug!(
                    categories = self.categories.iter().count(),
                    keys = self.searchable.len(),
                    "policy categories loaded"
                );
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to load policy categories");
                self.categories = PolicyCategories::new();
                self.searchable.clear();
                Err(e.into())
            }
        }
    }

    // -------------------------------------------------------------------------
    // Assignment lookup
    // -------------------------------------------------------------------------

    /// Change the selection. The loaded assignment belongs to the previous
    /// pair, so a different pair drops it.
    pub fn select(&mut self, org_type: Option<OrgTypeId>, role: Option<RoleId>) {
        let selection = Selection { org_type, role };
        if selection != self.selection {
            self.reset_assignment();
        }
        self.selection = selection;
    }

    /// Record a new selection and hand out the token its response must carry.
    pub fn begin_assignment_fetch(&mut self, org_type: OrgTypeId, role: RoleId) -> AssignmentRequest {
        self.select(Some(org_type), Some(role));
        self.reset_assignment();
        self.latest_request += 1;
        self.loading = true;
        AssignmentRequest {
            token: self.latest_request,
            org_type,
            role,
        }
    }

    /// Apply a lookup response. Responses to superseded requests are
    /// dropped; anything other than a row for exactly the requested pair
    /// resets the editor to "no policy yet".
    pub fn apply_assignment(
        &mut self,
        request: AssignmentRequest,
        result: Result<Option<Policy>, ClientError>,
    ) -> AssignmentOutcome {
        if request.token != self.latest_request {
            tracing::debug!(
                token = request.token,
                latest = self.latest_request,
                "dropping stale policy assignment response"
            );
            return AssignmentOutcome::Stale;
        }
        self.loading = false;

        match result {
            Ok(Some(policy)) if policy.matches(request.org_type, request.role) => {
                self.policy_id = policy.id;
                self.baseline = policy.accesses.iter().cloned().collect();
                self.checked = CheckedPolicySet::from_accesses(&self.categories, policy.accesses);
                AssignmentOutcome::Assigned
            }
            Ok(Some(policy)) => {
                tracing::warn!(
                    requested_org_type = %request.org_type,
                    requested_role = %request.role,
                    got_org_type = %policy.org_type,
                    got_role = %policy.role,
                    "policy assignment does not match selection; treating as unassigned"
                );
                self.reset_assignment();
                AssignmentOutcome::Unassigned
            }
            Ok(None) => {
                self.reset_assignment();
                AssignmentOutcome::Unassigned
            }
            Err(e) => {
                if e.is_absent() {
                    tracing::debug!(error = %e, "no policy assignment yet");
                } else {
                    tracing::warn!(error = %e, "policy assignment lookup failed");
                }
                self.reset_assignment();
                AssignmentOutcome::Unassigned
            }
        }
    }

    pub async fn fetch_assignment(&mut self, org_type: OrgTypeId, role: RoleId) -> AssignmentOutcome {
        let request = self.begin_assignment_fetch(org_type, role);
        let result = self.api.get_policy_assignment(org_type, role).await;
        self.apply_assignment(request, result)
    }

    fn reset_assignment(&mut self) {
        self.policy_id = None;
        self.baseline.clear();
        self.checked.clear();
    }

    // -------------------------------------------------------------------------
    // Editing
    // -------------------------------------------------------------------------

    pub fn toggle_category<I, S>(&mut self, category: &str, values: I) -> Result<(), EditorError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.checked
            .toggle_category(&self.categories, category, values)?;
        Ok(())
    }

    /// Persist the checked keys for the current selection. Keys outside
    /// the loaded universe are dropped first. Creates when no policy exists
    /// yet, otherwise updates by id.
    pub async fn save(&mut self) -> Result<Policy, EditorError> {
        let (org_type, role) = self
            .selection
            .complete()
            .ok_or_else(|| EditorError::Validation(SELECTION_REQUIRED.to_string()))?;
        if self.loading {
            return Err(EditorError::Validation(ASSIGNMENT_LOADING.to_string()));
        }

        let accesses = self.checked.prune_to(&self.searchable);
        let dropped = self.checked.flattened().len() - accesses.len();
        if dropped > 0 {
            tracing::info!(dropped, "pruned unknown policy keys before save");
        }

        let draft = PolicyDraft {
            org_type,
            role,
            accesses: accesses.clone(),
        };
        let diff = self.diff();
        let creating = self.policy_id.is_none();

        let result = match self.policy_id.clone() {
            None => self.api.create_policy(draft).await,
            Some(id) => self.api.update_policy(&id, draft).await,
        };

        match result {
            Ok(policy) => {
                if policy.id.is_some() {
                    self.policy_id = policy.id.clone();
                }
                self.checked = CheckedPolicySet::from_accesses(&self.categories, accesses.iter());
                self.baseline = accesses.into_iter().collect();
                tracing::info!(
                    %org_type,
                    %role,
                    created = creating,
                    granted = ?diff.granted,
                    revoked = ?diff.revoked,
                    "policy saved"
                );
                self.notice = Some(Notice::success(if creating {
                    "Permissions created"
                } else {
                    "Permissions updated"
                }));
                Ok(policy)
            }
            Err(e) => {
                tracing::warn!(error = %e, %org_type, %role, "policy save failed");
                self.notice = Some(Notice::error(e.user_message()));
                Err(e.into())
            }
        }
    }
}
