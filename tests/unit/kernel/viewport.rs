use super::*;
use crate::kernel::services::adapters::TokioExecutor;
use crate::models::{CellValue, Header, Record};
use std::sync::Arc;

fn new_context() -> InteractiveContext {
    InteractiveContext::init(Arc::new(TokioExecutor::new(1).unwrap()))
}

fn people_model() -> GridModel {
    let rows: Vec<Record> = vec![
        [("id", CellValue::Int(1)), ("name", "a".into()), ("age", 30i64.into())],
        [("id", CellValue::Int(2)), ("name", "bob".into()), ("age", 41i64.into())],
        [("id", CellValue::Int(3)), ("name", "c".into()), ("age", 5i64.into())],
    ]
    .into_iter()
    .map(|cells| {
        cells
            .into_iter()
            .map(|(k, v)| (CompactString::from(k), v))
            .collect()
    })
    .collect();
    let mut model = GridModel::new();
    model.load(
        rows,
        vec![Header::new("id"), Header::new("name"), Header::new("age")],
    );
    model.set_pinned(&["id", "name"]).unwrap();
    model
}

fn fixed_layout() -> ColumnLayout {
    ColumnLayout {
        mode: ResizeMode::Fixed,
        default_width: 50,
        char_width: 8,
    }
}

fn controller(ctx: &InteractiveContext, model: &GridModel) -> DualViewportController {
    let mut vp = DualViewportController::new(ctx, fixed_layout());
    vp.apply_model(model);
    vp
}

#[test]
fn test_pinned_columns_render_in_frozen_surface() {
    let ctx = new_context();
    let model = people_model();
    let vp = controller(&ctx, &model);

    assert_eq!(vp.main().visible_names(), vec!["id", "name", "age"]);
    assert_eq!(vp.frozen().visible_names(), vec!["id", "name"]);
    assert_eq!(vp.frozen().width(), 100);
    assert_eq!(vp.main().width(), 150);
}

#[test]
fn test_hidden_column_leaves_both_surfaces() {
    let ctx = new_context();
    let mut model = people_model();
    model.set_hidden(&["age"]).unwrap();
    let vp = controller(&ctx, &model);
    assert_eq!(vp.main().visible_names(), vec!["id", "name"]);
    assert_eq!(vp.main().width(), 100);
    assert_eq!(vp.main().columns().len(), 3);

    model.set_hidden(&["name"]).unwrap();
    let vp = controller(&ctx, &model);
    assert_eq!(vp.frozen().visible_names(), vec!["id"]);
    assert_eq!(vp.frozen().width(), 50);
}

#[test]
fn test_scroll_is_mirrored_both_ways() {
    let ctx = new_context();
    let model = people_model();
    let mut vp = controller(&ctx, &model);

    assert_eq!(vp.scroll_to(SurfaceKind::Main, 2), 2);
    assert_eq!(vp.frozen().scroll_row(), 2);

    vp.scroll_by(SurfaceKind::Frozen, -1);
    assert_eq!(vp.main().scroll_row(), 1);
    assert_eq!(vp.frozen().scroll_row(), 1);

    assert_eq!(vp.scroll_to(SurfaceKind::Frozen, 99), 2);
    assert_eq!(vp.main().scroll_row(), 2);
}

#[test]
fn test_pinned_width_is_mirrored_from_main() {
    let ctx = new_context();
    let model = people_model();
    let mut vp = controller(&ctx, &model);

    vp.resize_column("name", 120).unwrap();
    assert_eq!(vp.frozen().column_width("name"), Some(120));
    assert_eq!(vp.frozen().width(), 170);

    vp.resize_column("age", 10).unwrap();
    assert_eq!(vp.main().column_width("age"), Some(10));
    assert_eq!(vp.frozen().width(), 170);

    assert_eq!(
        vp.resize_column("nope", 1),
        Err(GridError::UnknownColumn("nope".to_string()))
    );
}

#[test]
fn test_user_widths_survive_reapply() {
    let ctx = new_context();
    let model = people_model();
    let mut vp = controller(&ctx, &model);
    vp.resize_column("id", 77).unwrap();
    vp.apply_model(&model);
    assert_eq!(vp.main().column_width("id"), Some(77));
    assert_eq!(vp.frozen().column_width("id"), Some(77));
}

#[test]
fn test_contents_mode_measures_widest_cell() {
    let ctx = new_context();
    let model = people_model();
    let mut vp = DualViewportController::new(
        &ctx,
        ColumnLayout {
            mode: ResizeMode::Contents,
            default_width: 50,
            char_width: 10,
        },
    );
    vp.apply_model(&model);
    // "name" label (4) vs widest value "bob" (3).
    assert_eq!(vp.main().column_width("name"), Some((4 + 2) * 10));
    assert_eq!(vp.main().column_width("id"), Some((2 + 2) * 10));
}

#[test]
fn test_main_selection_mirrors_pinned_subset() {
    let ctx = new_context();
    let model = people_model();
    let mut vp = controller(&ctx, &model);

    vp.select(
        SurfaceKind::Main,
        vec![
            CellRef::new(0, "name"),
            CellRef::new(0, "age"),
            CellRef::new(1, "id"),
        ],
    )
    .unwrap();

    let frozen: Vec<_> = vp.frozen().selection().iter().cloned().collect();
    assert_eq!(frozen, vec![CellRef::new(0, "name"), CellRef::new(1, "id")]);
    assert_eq!(vp.main().selection().len(), 3);
    assert_eq!(vp.sync_state(), SyncState::Idle);
}

#[test]
fn test_main_selection_without_pinned_cells_clears_frozen() {
    let ctx = new_context();
    let model = people_model();
    let mut vp = controller(&ctx, &model);

    vp.select(SurfaceKind::Main, vec![CellRef::new(0, "id")]).unwrap();
    assert_eq!(vp.frozen().selection().len(), 1);

    vp.select(SurfaceKind::Main, vec![CellRef::new(2, "age")]).unwrap();
    assert!(vp.frozen().selection().is_empty());
    assert_eq!(vp.main().selection().len(), 1);
}

#[test]
fn test_frozen_selection_never_selects_main() {
    let ctx = new_context();
    let model = people_model();
    let mut vp = controller(&ctx, &model);

    vp.select(SurfaceKind::Main, vec![CellRef::new(2, "age")]).unwrap();
    vp.select(SurfaceKind::Frozen, vec![CellRef::new(1, "id")]).unwrap();

    assert!(vp.main().selection().is_empty());
    let frozen: Vec<_> = vp.frozen().selection().iter().cloned().collect();
    assert_eq!(frozen, vec![CellRef::new(1, "id")]);
    assert_eq!(vp.sync_state(), SyncState::Idle);
}

#[test]
fn test_selection_validation() {
    let ctx = new_context();
    let model = people_model();
    let mut vp = controller(&ctx, &model);

    assert_eq!(
        vp.select(SurfaceKind::Main, vec![CellRef::new(3, "id")]),
        Err(GridError::OutOfRange { index: 3, len: 3 })
    );
    assert_eq!(
        vp.select(SurfaceKind::Frozen, vec![CellRef::new(0, "age")]),
        Err(GridError::UnknownColumn("age".to_string()))
    );
    assert!(vp.main().selection().is_empty());
}

#[test]
fn test_select_rows_and_selected_rows() {
    let ctx = new_context();
    let model = people_model();
    let mut vp = controller(&ctx, &model);

    vp.select_rows(&[2, 0]).unwrap();
    assert_eq!(vp.main().selected_rows(), vec![0, 2]);
    assert_eq!(vp.frozen().selected_rows(), vec![0, 2]);
    assert_eq!(vp.main().selection().len(), 6);
    assert_eq!(vp.frozen().selection().len(), 4);
}

#[test]
fn test_apply_model_updates_both_surfaces_together() {
    let ctx = new_context();
    let mut model = people_model();
    let mut vp = controller(&ctx, &model);
    vp.select_rows(&[1]).unwrap();
    vp.scroll_to(SurfaceKind::Main, 2);

    model.set_pinned(&["age"]).unwrap();
    model.remove_row(2).unwrap();
    vp.apply_model(&model);

    assert_eq!(vp.main().visible_names(), vec!["age", "id", "name"]);
    assert_eq!(vp.frozen().visible_names(), vec!["age"]);
    assert_eq!(vp.main().row_count(), vp.frozen().row_count());
    assert_eq!(vp.main().scroll_row(), 1);
    assert_eq!(vp.frozen().scroll_row(), 1);
    assert!(vp.main().selection().is_empty());
    assert!(vp.frozen().selection().is_empty());
}

#[test]
fn test_set_row_count_keeps_selection_in_range() {
    let ctx = new_context();
    let model = people_model();
    let mut vp = controller(&ctx, &model);
    vp.select_rows(&[0, 2]).unwrap();
    vp.scroll_to(SurfaceKind::Main, 2);

    vp.set_row_count(4);
    assert_eq!(vp.main().selected_rows(), vec![0, 2]);
    assert_eq!(vp.frozen().row_count(), 4);

    vp.set_row_count(2);
    assert_eq!(vp.main().selected_rows(), vec![0]);
    assert_eq!(vp.frozen().selected_rows(), vec![0]);
    assert_eq!(vp.main().scroll_row(), 1);
    assert_eq!(vp.frozen().scroll_row(), 1);
}
