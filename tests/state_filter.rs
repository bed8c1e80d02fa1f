#![allow(clippy::unwrap_used, clippy::expect_used)]

use anyhow::Result;
use setup_sheets_lib::{EditorForm, Part, PartListModel, PartRepository, PartStore, ValidationError};

#[path = "util.rs"]
mod util;

async fn model_with_repo() -> (PartListModel, PartRepository) {
    let pool = util::memory_pool().await;
    let repo = PartRepository::new(PartStore::new(pool));
    (PartListModel::new(repo.clone()), repo)
}

#[tokio::test]
async fn visible_tracks_mutations_through_the_join() -> Result<()> {
    let (model, _repo) = model_with_repo().await;

    let mut visible = model.visible();
    assert!(visible.recv().await?.is_empty());

    model.add(&util::sample_part("Flange")).await?;
    let parts = visible.recv().await?;
    assert_eq!(parts.len(), 1);
    assert_eq!(parts[0].title, "Flange");
    Ok(())
}

#[tokio::test]
async fn set_filter_reemits_without_a_store_change() -> Result<()> {
    let (model, _repo) = model_with_repo().await;

    model.add(&util::sample_part("Bracket-7")).await?;
    let mut spacer = util::sample_part("Spacer");
    spacer.content = "bronze, deburr edges".to_string();
    model.add(&spacer).await?;

    let mut visible = model.visible();
    assert_eq!(visible.recv().await?.len(), 2);

    model.set_filter("bracket");
    let filtered = visible.recv().await?;
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].title, "Bracket-7");

    model.set_filter("BRONZE");
    let by_content = visible.recv().await?;
    assert_eq!(by_content.len(), 1);
    assert_eq!(by_content[0].title, "Spacer");
    Ok(())
}

#[tokio::test]
async fn clearing_the_filter_restores_the_full_list() -> Result<()> {
    let (model, _repo) = model_with_repo().await;

    model.add(&util::sample_part("Bracket")).await?;
    model.add(&util::sample_part("Shaft")).await?;

    model.set_filter("bracket");
    let mut visible = model.visible();
    assert_eq!(visible.recv().await?.len(), 1);

    model.set_filter("   ");
    assert_eq!(visible.recv().await?.len(), 2);
    Ok(())
}

#[tokio::test]
async fn filtered_list_keeps_descending_id_order() -> Result<()> {
    let (model, _repo) = model_with_repo().await;

    for n in 0..4 {
        model.add(&util::sample_part(&format!("Pin {n}"))).await?;
    }
    model.set_filter("pin");
    let mut visible = model.visible();
    let ids: Vec<i64> = visible.recv().await?.iter().map(|p| p.id).collect();
    let mut expected = ids.clone();
    expected.sort_unstable_by(|a, b| b.cmp(a));
    assert_eq!(ids, expected);
    Ok(())
}

#[tokio::test]
async fn update_of_a_vanished_record_is_swallowed() -> Result<()> {
    let (model, _repo) = model_with_repo().await;

    let phantom = Part {
        id: 42,
        ..util::sample_part("Phantom")
    };
    model.update(&phantom).await?;
    model.delete(&phantom).await?;
    Ok(())
}

#[tokio::test]
async fn invalid_editor_submission_never_reaches_the_store() -> Result<()> {
    let (model, _repo) = model_with_repo().await;

    let mut form = EditorForm::new();
    form.x_coord = "1".into();
    form.y_coord = "2".into();
    form.z_coord = "3".into();
    form.main_tools[0].name = "T1".into();
    form.projection_length = "150".into();
    form.bar_size = "1.25".into();
    // title left blank

    let err = form.build_part().expect_err("blank title must not validate");
    assert_eq!(err, ValidationError::MissingTitle);

    let mut visible = model.visible();
    assert!(visible.recv().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn editor_create_then_edit_flow_round_trips() -> Result<()> {
    let (model, repo) = model_with_repo().await;

    let mut form = EditorForm::new();
    form.title = "Bracket-7".into();
    form.x_coord = "1".into();
    form.y_coord = "2".into();
    form.z_coord = "3".into();
    form.main_tools[0] = setup_sheets_lib::ToolRow::new("T1", "Face");
    form.projection_length = "150".into();
    form.bar_size = "1.25".into();

    let id = model.add(&form.build_part()?).await?;

    let stored = repo.get_by_id(id).await?.expect("created part loads");
    let mut edit = EditorForm::from_part(&stored);
    assert!(edit.is_editing());
    edit.bar_size = "1.50".into();

    model.update(&edit.build_part()?).await?;

    let reloaded = repo.get_by_id(id).await?.expect("edited part loads");
    assert_eq!(reloaded.bar_size, "1.50");
    assert_eq!(reloaded.title, "Bracket-7");
    assert_eq!(reloaded.coordinates, "X:1 Y:2 Z:3");
    Ok(())
}
