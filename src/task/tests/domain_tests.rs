//! Unit tests for domain validation rules.

use eyre::{bail, ensure};
use mockable::DefaultClock;
use rstest::rstest;

use super::fixtures::{day, plain_task};
use crate::task::domain::{
    AllocationPercent, DependencyType, NewTask, PatchField, PersistedTaskData, Priority,
    ProjectId, Task, TaskDependency, TaskDomainError, TaskId, TaskPatch, TaskStatus, UserId,
    MAX_TITLE_CHARS,
};

#[rstest]
fn new_task_defaults_status_priority_and_version() -> eyre::Result<()> {
    let task = plain_task(ProjectId::new(), "Draft the report")?;
    ensure!(task.status() == TaskStatus::NotStarted);
    ensure!(task.priority() == Priority::Medium);
    ensure!(task.version() == 1);
    ensure!(!task.is_deleted());
    ensure!(task.held_from().is_none());
    Ok(())
}

#[rstest]
fn new_task_trims_title() -> eyre::Result<()> {
    let task = plain_task(ProjectId::new(), "  padded title  ")?;
    ensure!(task.title() == "padded title");
    Ok(())
}

#[rstest]
#[case("")]
#[case("   ")]
fn empty_title_is_rejected(#[case] title: &str) {
    let result = plain_task(ProjectId::new(), title);
    assert_eq!(result, Err(TaskDomainError::EmptyTitle));
}

#[rstest]
fn overlong_title_is_rejected() -> eyre::Result<()> {
    let title = "x".repeat(MAX_TITLE_CHARS + 1);
    let result = plain_task(ProjectId::new(), &title);
    let expected = Err(TaskDomainError::TitleTooLong {
        length: MAX_TITLE_CHARS + 1,
        max: MAX_TITLE_CHARS,
    });
    if result != expected {
        bail!("expected {expected:?}, got {result:?}");
    }
    Ok(())
}

#[rstest]
fn title_at_limit_is_accepted() -> eyre::Result<()> {
    let title = "x".repeat(MAX_TITLE_CHARS);
    ensure!(plain_task(ProjectId::new(), &title).is_ok());
    Ok(())
}

#[rstest]
fn inverted_estimated_dates_are_rejected() {
    let start = day(5);
    let end = day(2);
    let result = Task::new(
        NewTask::new(ProjectId::new(), "Inverted").with_estimated_dates(start, end),
        UserId::new(),
        &DefaultClock,
    );
    assert_eq!(result, Err(TaskDomainError::InvertedDates { start, end }));
}

#[rstest]
fn equal_estimated_dates_are_accepted() -> eyre::Result<()> {
    let milestone = day(3);
    let task = Task::new(
        NewTask::new(ProjectId::new(), "Milestone").with_estimated_dates(milestone, milestone),
        UserId::new(),
        &DefaultClock,
    )?;
    ensure!(task.estimated_duration_days() == 0);
    Ok(())
}

#[rstest]
fn estimated_duration_defaults_to_zero_without_dates() -> eyre::Result<()> {
    let task = plain_task(ProjectId::new(), "Undated")?;
    ensure!(task.estimated_duration_days() == 0);
    Ok(())
}

#[rstest]
fn apply_patch_updates_fields_and_bumps_version() -> eyre::Result<()> {
    let mut task = plain_task(ProjectId::new(), "Original")?;
    let editor = UserId::new();
    let patch = TaskPatch {
        title: Some("Renamed".to_owned()),
        description: PatchField::Set("Now with context".to_owned()),
        priority: Some(Priority::High),
        estimated_start_date: PatchField::Set(day(0)),
        estimated_end_date: PatchField::Set(day(4)),
        ..TaskPatch::default()
    };

    task.apply_patch(&patch, editor, &DefaultClock)?;

    ensure!(task.title() == "Renamed");
    ensure!(task.description() == Some("Now with context"));
    ensure!(task.priority() == Priority::High);
    ensure!(task.estimated_duration_days() == 4);
    ensure!(task.version() == 2);
    ensure!(task.updated_by() == editor);
    Ok(())
}

#[rstest]
fn apply_patch_clears_dates() -> eyre::Result<()> {
    let mut task = Task::new(
        NewTask::new(ProjectId::new(), "Dated").with_estimated_dates(day(0), day(3)),
        UserId::new(),
        &DefaultClock,
    )?;
    let patch = TaskPatch {
        estimated_start_date: PatchField::Clear,
        estimated_end_date: PatchField::Clear,
        ..TaskPatch::default()
    };

    task.apply_patch(&patch, UserId::new(), &DefaultClock)?;

    ensure!(task.estimated_start_date().is_none());
    ensure!(task.estimated_end_date().is_none());
    Ok(())
}

#[rstest]
fn patch_producing_inverted_dates_leaves_task_unchanged() -> eyre::Result<()> {
    let mut task = Task::new(
        NewTask::new(ProjectId::new(), "Dated").with_estimated_dates(day(0), day(3)),
        UserId::new(),
        &DefaultClock,
    )?;
    let before = task.clone();
    let patch = TaskPatch {
        estimated_end_date: PatchField::Set(day(0).pred_opt().unwrap_or(day(0))),
        estimated_start_date: PatchField::Set(day(2)),
        ..TaskPatch::default()
    };

    let result = task.apply_patch(&patch, UserId::new(), &DefaultClock);

    ensure!(matches!(
        result,
        Err(TaskDomainError::InvertedDates { .. })
    ));
    ensure!(task == before);
    Ok(())
}

#[rstest]
fn patch_cannot_make_task_its_own_parent() -> eyre::Result<()> {
    let mut task = plain_task(ProjectId::new(), "Parentless")?;
    let patch = TaskPatch {
        parent_task_id: PatchField::Set(task.id()),
        ..TaskPatch::default()
    };

    let result = task.apply_patch(&patch, UserId::new(), &DefaultClock);

    ensure!(result == Err(TaskDomainError::SelfParent(task.id())));
    ensure!(task.version() == 1);
    Ok(())
}

#[rstest]
#[case(0)]
#[case(50)]
#[case(100)]
fn allocation_within_bounds_is_accepted(#[case] value: u8) {
    assert!(AllocationPercent::new(value).is_ok());
}

#[rstest]
fn allocation_over_hundred_is_rejected() {
    assert_eq!(
        AllocationPercent::new(101),
        Err(TaskDomainError::InvalidAllocation(101))
    );
}

#[rstest]
fn self_referencing_dependency_is_rejected() {
    let task_id = TaskId::new();
    let result = TaskDependency::new(
        ProjectId::new(),
        task_id,
        task_id,
        DependencyType::FinishToStart,
        0,
        UserId::new(),
        &DefaultClock,
    );
    assert_eq!(result, Err(TaskDomainError::SelfDependency(task_id)));
}

#[rstest]
fn dependency_accepts_negative_lag() -> eyre::Result<()> {
    let edge = TaskDependency::new(
        ProjectId::new(),
        TaskId::new(),
        TaskId::new(),
        DependencyType::StartToStart,
        -3,
        UserId::new(),
        &DefaultClock,
    )?;
    ensure!(edge.lag_days() == -3);
    Ok(())
}

#[rstest]
#[case(TaskStatus::NotStarted, "not_started")]
#[case(TaskStatus::InProgress, "in_progress")]
#[case(TaskStatus::Completed, "completed")]
#[case(TaskStatus::OnHold, "on_hold")]
fn status_round_trips_through_canonical_string(
    #[case] status: TaskStatus,
    #[case] canonical: &str,
) -> eyre::Result<()> {
    ensure!(status.as_str() == canonical);
    ensure!(TaskStatus::try_from(canonical)? == status);
    Ok(())
}

#[rstest]
fn unknown_status_string_is_rejected() {
    assert!(TaskStatus::try_from("cancelled").is_err());
}

#[rstest]
fn builder_carries_description_parent_and_start() -> eyre::Result<()> {
    let parent = plain_task(ProjectId::new(), "Parent")?;
    let input = NewTask::new(parent.project_id(), "Child")
        .with_description("Split out of the parent")
        .with_parent(parent.id())
        .with_estimated_start(day(1));
    let task = Task::new(input, UserId::new(), &DefaultClock)?;

    ensure!(task.description() == Some("Split out of the parent"));
    ensure!(task.parent_task_id() == Some(parent.id()));
    ensure!(task.estimated_start_date() == Some(day(1)));
    ensure!(task.estimated_end_date().is_none());
    Ok(())
}

#[rstest]
fn persisted_round_trip_preserves_state() -> eyre::Result<()> {
    let mut original = plain_task(ProjectId::new(), "Stored")?;
    let editor = UserId::new();
    let rename = TaskPatch {
        title: Some("Stored twice".to_owned()),
        ..TaskPatch::default()
    };
    original.apply_patch(&rename, editor, &DefaultClock)?;

    let restored = Task::from_persisted(PersistedTaskData {
        id: original.id(),
        project_id: original.project_id(),
        parent_task_id: original.parent_task_id(),
        title: original.title().to_owned(),
        description: original.description().map(str::to_owned),
        status: original.status(),
        held_from: original.held_from(),
        priority: original.priority(),
        estimated_start_date: original.estimated_start_date(),
        estimated_end_date: original.estimated_end_date(),
        actual_start_date: original.actual_start_date(),
        actual_end_date: original.actual_end_date(),
        version: original.version(),
        deleted_at: original.deleted_at(),
        deleted_by: original.deleted_by(),
        created_at: original.created_at(),
        created_by: original.created_by(),
        updated_at: original.updated_at(),
        updated_by: original.updated_by(),
    });

    ensure!(restored == original);
    ensure!(restored.version() == 2);
    Ok(())
}

#[rstest]
fn priority_orders_from_low_to_urgent() {
    assert!(Priority::Low < Priority::Medium);
    assert!(Priority::Medium < Priority::High);
    assert!(Priority::High < Priority::Urgent);
}

#[rstest]
fn task_serialises_with_snake_case_enums() -> eyre::Result<()> {
    let task = plain_task(ProjectId::new(), "Wire format")?;
    let json = serde_json::to_value(&task)?;
    ensure!(json.get("status") == Some(&serde_json::json!("not_started")));
    ensure!(json.get("priority") == Some(&serde_json::json!("medium")));
    Ok(())
}
