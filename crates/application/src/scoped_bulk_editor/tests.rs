use proptest::prelude::*;

use servora_core::{AppError, AppResult};
use servora_domain::{BaselineSet, NodeId, OverrideMap};

use crate::test_fixtures::{all_catalog_nodes, catalog_tree};
use crate::{BaselineState, ExceptionState, PermissionState};

use super::{BulkCommand, NavigationPath, ScopePolicy, ScopedBulkEditor};

fn payroll_view() -> AppResult<NavigationPath> {
    let tree = catalog_tree()?;
    let mut path = NavigationPath::new();
    path.descend(&tree, NodeId::service(1))?;
    Ok(path)
}

#[test]
fn navigation_descends_only_into_listed_parents() -> AppResult<()> {
    let tree = catalog_tree()?;
    let mut path = NavigationPath::new();

    assert!(matches!(
        path.descend(&tree, NodeId::sub_service(1)),
        Err(AppError::Validation(_))
    ));

    path.descend(&tree, NodeId::service(1))?;
    path.descend(&tree, NodeId::sub_service(2))?;
    assert_eq!(path.depth(), 2);
    assert!(matches!(
        path.descend(&tree, NodeId::sub_sub_service(3)),
        Err(AppError::Validation(_))
    ));

    path.truncate(1);
    assert_eq!(path.terminal(), Some(NodeId::service(1)));
    assert_eq!(path.ascend(), Some(NodeId::service(1)));
    assert_eq!(path.terminal(), None);

    Ok(())
}

#[test]
fn row_scope_lists_only_visible_nodes() -> AppResult<()> {
    let tree = catalog_tree()?;
    let path = payroll_view()?;

    let scope = ScopedBulkEditor::new(ScopePolicy::Row).scope(&tree, &path);
    assert_eq!(scope, vec![NodeId::sub_service(1), NodeId::sub_service(2)]);

    let roots = ScopedBulkEditor::new(ScopePolicy::Row).scope(&tree, &NavigationPath::new());
    assert_eq!(roots, vec![NodeId::service(1), NodeId::service(2)]);

    Ok(())
}

#[test]
fn subtree_scope_includes_descendant_closure() -> AppResult<()> {
    let tree = catalog_tree()?;
    let path = payroll_view()?;

    let scope = ScopedBulkEditor::new(ScopePolicy::Subtree).scope(&tree, &path);
    assert_eq!(
        scope,
        vec![
            NodeId::sub_service(1),
            NodeId::sub_sub_service(1),
            NodeId::sub_sub_service(2),
            NodeId::sub_service(2),
            NodeId::sub_sub_service(3),
        ]
    );

    Ok(())
}

#[test]
fn baseline_select_all_in_row_scope_grants_rows_and_ancestors() -> AppResult<()> {
    let tree = catalog_tree()?;
    let path = payroll_view()?;
    let editor = ScopedBulkEditor::new(ScopePolicy::Row);
    let snapshot = BaselineState::default();
    let mut state = snapshot.clone();

    let action = editor.prepare(&tree, &path, BulkCommand::SelectAll);
    ScopedBulkEditor::execute(&tree, &mut state, &snapshot, action)?;

    assert_eq!(
        state.granted().sorted(),
        vec![
            NodeId::service(1),
            NodeId::sub_service(1),
            NodeId::sub_service(2),
        ]
    );
    let scope = editor.scope(&tree, &path);
    assert!(ScopedBulkEditor::all_selected(&state, &scope));
    assert!(!ScopedBulkEditor::none_selected(&state, &scope));
    assert!(ScopedBulkEditor::has_changes(&state, &snapshot, &scope));

    Ok(())
}

#[test]
fn exception_deselect_all_in_subtree_scope_denies_everything_in_view() -> AppResult<()> {
    let tree = catalog_tree()?;
    let path = payroll_view()?;
    let editor = ScopedBulkEditor::new(ScopePolicy::Subtree);
    let snapshot = ExceptionState::new(
        BaselineSet::from_iter([
            NodeId::service(1),
            NodeId::sub_service(1),
            NodeId::sub_sub_service(1),
        ]),
        OverrideMap::from_iter([(NodeId::sub_sub_service(3), true)]),
    );
    let mut state = snapshot.clone();

    let action = editor.prepare(&tree, &path, BulkCommand::DeselectAll);
    ScopedBulkEditor::execute(&tree, &mut state, &snapshot, action)?;

    let scope = editor.scope(&tree, &path);
    assert!(ScopedBulkEditor::none_selected(&state, &scope));
    assert_eq!(
        state.overrides().to_rows(),
        OverrideMap::from_iter([
            (NodeId::sub_service(1), false),
            (NodeId::sub_sub_service(1), false),
        ])
        .to_rows()
    );
    assert!(state.effective(NodeId::service(1)));

    Ok(())
}

#[test]
fn reset_restores_only_the_current_view() -> AppResult<()> {
    let tree = catalog_tree()?;
    let path = payroll_view()?;
    let editor = ScopedBulkEditor::new(ScopePolicy::Row);
    let snapshot = BaselineState::new(BaselineSet::from_iter([NodeId::service(1)]));
    let mut state = snapshot.clone();

    state.toggle(&tree, NodeId::sub_service(2), true)?;
    state.toggle(&tree, NodeId::service(2), true)?;

    let action = editor.prepare(&tree, &path, BulkCommand::Reset);
    ScopedBulkEditor::execute(&tree, &mut state, &snapshot, action)?;

    assert!(!state.effective(NodeId::sub_service(2)));
    assert!(state.effective(NodeId::service(2)));
    assert!(!ScopedBulkEditor::has_changes(
        &state,
        &snapshot,
        &editor.scope(&tree, &path)
    ));

    Ok(())
}

#[test]
fn pending_action_keeps_targets_captured_at_prepare_time() -> AppResult<()> {
    let tree = catalog_tree()?;
    let mut path = payroll_view()?;
    let editor = ScopedBulkEditor::new(ScopePolicy::Row);

    let action = editor.prepare(&tree, &path, BulkCommand::SelectAll);
    path.reset();

    assert_eq!(action.command(), BulkCommand::SelectAll);
    assert_eq!(
        action.targets(),
        &[NodeId::sub_service(1), NodeId::sub_service(2)]
    );

    Ok(())
}

#[test]
fn empty_view_is_vacuously_selected_and_unchanged() -> AppResult<()> {
    let tree = catalog_tree()?;
    let state = BaselineState::default();

    let mut path = NavigationPath::new();
    path.descend(&tree, NodeId::service(2))?;
    assert!(path.descend(&tree, NodeId::sub_service(3)).is_err());
    let scope = ScopedBulkEditor::new(ScopePolicy::Row).scope(&tree, &path);

    assert_eq!(scope, vec![NodeId::sub_service(3)]);
    assert!(ScopedBulkEditor::all_selected(&state, &[]));
    assert!(ScopedBulkEditor::none_selected(&state, &[]));
    assert!(!ScopedBulkEditor::has_changes(&state, &state, &[]));

    Ok(())
}

fn catalog_node() -> impl Strategy<Value = NodeId> {
    proptest::sample::select(all_catalog_nodes())
}

fn toggles() -> impl Strategy<Value = Vec<(NodeId, bool)>> {
    proptest::collection::vec((catalog_node(), any::<bool>()), 0..12)
}

proptest! {
    #[test]
    fn reset_is_idempotent(edits in toggles(), subtree in any::<bool>()) {
        let tree = catalog_tree().map_err(|error| TestCaseError::fail(error.to_string()))?;
        let path = payroll_view().map_err(|error| TestCaseError::fail(error.to_string()))?;
        let policy = if subtree { ScopePolicy::Subtree } else { ScopePolicy::Row };
        let editor = ScopedBulkEditor::new(policy);
        let snapshot = ExceptionState::new(
            BaselineSet::from_iter([NodeId::service(1), NodeId::sub_service(2)]),
            OverrideMap::from_iter([(NodeId::sub_sub_service(1), true)]),
        );
        let mut state = snapshot.clone();
        for (node, value) in edits {
            state
                .toggle(&tree, node, value)
                .map_err(|error| TestCaseError::fail(error.to_string()))?;
        }

        ScopedBulkEditor::execute(&tree, &mut state, &snapshot, editor.prepare(&tree, &path, BulkCommand::Reset))
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let once = state.clone();
        ScopedBulkEditor::execute(&tree, &mut state, &snapshot, editor.prepare(&tree, &path, BulkCommand::Reset))
            .map_err(|error| TestCaseError::fail(error.to_string()))?;

        prop_assert_eq!(state, once);
    }

    #[test]
    fn edits_outside_scope_never_change_visible_changes(
        edits in proptest::collection::vec(any::<bool>(), 1..6),
    ) {
        let tree = catalog_tree().map_err(|error| TestCaseError::fail(error.to_string()))?;
        let path = payroll_view().map_err(|error| TestCaseError::fail(error.to_string()))?;
        let editor = ScopedBulkEditor::new(ScopePolicy::Subtree);
        let scope = editor.scope(&tree, &path);
        let snapshot = ExceptionState::new(BaselineSet::from_iter([NodeId::service(2)]), OverrideMap::new());
        let mut state = snapshot.clone();
        state
            .toggle(&tree, NodeId::sub_sub_service(2), true)
            .map_err(|error| TestCaseError::fail(error.to_string()))?;
        let before = ScopedBulkEditor::has_changes(&state, &snapshot, &scope);

        for value in edits {
            state
                .toggle(&tree, NodeId::service(2), value)
                .map_err(|error| TestCaseError::fail(error.to_string()))?;
            prop_assert_eq!(ScopedBulkEditor::has_changes(&state, &snapshot, &scope), before);
        }
    }
}
