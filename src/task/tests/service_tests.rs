//! Unit tests for the orchestration service.

use eyre::{bail, ensure};
use rstest::rstest;

use super::fixtures::{dated_task_input, day, Harness};
use crate::schedule::DateRange;
use crate::task::{
    domain::{
        AssignmentRole, DependencyType, NewTask, Priority, TaskDomainError, TaskId, TaskPatch,
        TaskStatus, UserId,
    },
    ports::{Caller, Capability, DependencyGraphError, TaskStoreError},
    services::{TaskSearchRequest, TaskServiceError},
};

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn create_without_capability_is_denied() -> eyre::Result<()> {
    let harness = Harness::with_no_grants();
    let input = NewTask::new(harness.project_id, "Forbidden");

    let result = harness.service.create_task(input, &harness.caller).await;

    let Err(TaskServiceError::PermissionDenied { capability, .. }) = result else {
        bail!("expected permission denial, got {result:?}");
    };
    ensure!(capability == Capability::CreateTask);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn view_is_checked_after_fetch() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let task = harness
        .service
        .create_task(
            NewTask::new(harness.project_id, "Private"),
            &harness.caller,
        )
        .await?;

    let stranger = Caller::new(UserId::new());
    let result = harness.service.get_task(task.id(), &stranger).await;

    ensure!(matches!(
        result,
        Err(TaskServiceError::PermissionDenied {
            capability: Capability::ViewTasks,
            ..
        })
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn get_missing_task_is_not_found() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let result = harness.service.get_task(TaskId::new(), &harness.caller).await;
    ensure!(matches!(
        result,
        Err(TaskServiceError::Store(TaskStoreError::NotFound(_)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stale_update_is_a_retryable_conflict() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let task = harness
        .service
        .create_task(
            NewTask::new(harness.project_id, "Contended"),
            &harness.caller,
        )
        .await?;

    let first = TaskPatch {
        title: Some("First writer".to_owned()),
        ..TaskPatch::default()
    };
    let updated = harness
        .service
        .update_task(task.id(), &first, task.version(), &harness.caller)
        .await?;
    ensure!(updated.version() == task.version() + 1);

    // A second writer still holding the original version loses.
    let second = TaskPatch {
        title: Some("Second writer".to_owned()),
        ..TaskPatch::default()
    };
    let result = harness
        .service
        .update_task(task.id(), &second, task.version(), &harness.caller)
        .await;
    ensure!(matches!(
        result,
        Err(TaskServiceError::Store(TaskStoreError::VersionConflict { .. }))
    ));

    // Retrying against the fresh version succeeds.
    let retried = harness
        .service
        .update_task(task.id(), &second, updated.version(), &harness.caller)
        .await?;
    ensure!(retried.title() == "Second writer");
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn forbidden_transition_is_rejected() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let task = harness
        .service
        .create_task(NewTask::new(harness.project_id, "Fresh"), &harness.caller)
        .await?;

    let result = harness
        .service
        .transition_status(task.id(), TaskStatus::Completed, &harness.caller)
        .await;

    ensure!(matches!(
        result,
        Err(TaskServiceError::Domain(TaskDomainError::InvalidTransition {
            from: TaskStatus::NotStarted,
            to: TaskStatus::Completed,
        }))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn reopen_requires_its_own_capability() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let task = harness
        .service
        .create_task(NewTask::new(harness.project_id, "Done"), &harness.caller)
        .await?;
    harness
        .service
        .transition_status(task.id(), TaskStatus::InProgress, &harness.caller)
        .await?;
    harness
        .service
        .transition_status(task.id(), TaskStatus::Completed, &harness.caller)
        .await?;

    harness
        .authorizer
        .revoke(
            harness.caller.user_id(),
            harness.project_id,
            Capability::ReopenTask,
        )?;
    let result = harness
        .service
        .transition_status(task.id(), TaskStatus::NotStarted, &harness.caller)
        .await;
    ensure!(matches!(
        result,
        Err(TaskServiceError::PermissionDenied {
            capability: Capability::ReopenTask,
            ..
        })
    ));

    harness.authorizer.grant(
        harness.caller.user_id(),
        harness.project_id,
        Capability::ReopenTask,
    )?;
    let reopened = harness
        .service
        .transition_status(task.id(), TaskStatus::NotStarted, &harness.caller)
        .await?;
    ensure!(reopened.status() == TaskStatus::NotStarted);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cross_project_dependency_is_rejected() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let other_project = crate::task::domain::ProjectId::new();
    harness
        .authorizer
        .grant_all(harness.caller.user_id(), other_project)?;
    let local = harness
        .service
        .create_task(NewTask::new(harness.project_id, "Local"), &harness.caller)
        .await?;
    let foreign = harness
        .service
        .create_task(NewTask::new(other_project, "Foreign"), &harness.caller)
        .await?;

    let result = harness
        .service
        .add_dependency(
            local.id(),
            foreign.id(),
            DependencyType::FinishToStart,
            0,
            &harness.caller,
        )
        .await;

    let Err(TaskServiceError::ProjectMismatch {
        predecessor,
        successor,
    }) = result
    else {
        bail!("expected project mismatch, got {result:?}");
    };
    ensure!(predecessor == harness.project_id);
    ensure!(successor == other_project);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn cycle_is_rejected_through_the_service() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let a = harness
        .service
        .create_task(NewTask::new(harness.project_id, "A"), &harness.caller)
        .await?;
    let b = harness
        .service
        .create_task(NewTask::new(harness.project_id, "B"), &harness.caller)
        .await?;

    harness
        .service
        .add_dependency(
            a.id(),
            b.id(),
            DependencyType::FinishToStart,
            0,
            &harness.caller,
        )
        .await?;
    let result = harness
        .service
        .add_dependency(
            b.id(),
            a.id(),
            DependencyType::FinishToStart,
            0,
            &harness.caller,
        )
        .await;

    ensure!(matches!(
        result,
        Err(TaskServiceError::Graph(
            DependencyGraphError::CircularDependency { .. }
        ))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn removing_missing_dependency_is_reported() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let a = harness
        .service
        .create_task(NewTask::new(harness.project_id, "A"), &harness.caller)
        .await?;
    let b = harness
        .service
        .create_task(NewTask::new(harness.project_id, "B"), &harness.caller)
        .await?;
    let edge = harness
        .service
        .add_dependency(
            a.id(),
            b.id(),
            DependencyType::FinishToStart,
            0,
            &harness.caller,
        )
        .await?;

    harness
        .service
        .remove_dependency(edge.id(), &harness.caller)
        .await?;
    let result = harness
        .service
        .remove_dependency(edge.id(), &harness.caller)
        .await;

    ensure!(matches!(
        result,
        Err(TaskServiceError::DependencyNotFound(id)) if id == edge.id()
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn delete_is_blocked_by_dependents_unless_cascaded() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let upstream = harness
        .service
        .create_task(NewTask::new(harness.project_id, "Upstream"), &harness.caller)
        .await?;
    let downstream = harness
        .service
        .create_task(
            NewTask::new(harness.project_id, "Downstream"),
            &harness.caller,
        )
        .await?;
    harness
        .service
        .add_dependency(
            upstream.id(),
            downstream.id(),
            DependencyType::FinishToStart,
            0,
            &harness.caller,
        )
        .await?;

    let result = harness
        .service
        .delete_task(upstream.id(), &harness.caller, false)
        .await;
    let Err(TaskServiceError::DependencyExists { task, blocking }) = result else {
        bail!("expected blocked deletion, got {result:?}");
    };
    ensure!(task == upstream.id());
    ensure!(blocking == vec![downstream.id()]);

    harness
        .service
        .delete_task(upstream.id(), &harness.caller, true)
        .await?;
    let fetched = harness.service.get_task(upstream.id(), &harness.caller).await;
    ensure!(matches!(
        fetched,
        Err(TaskServiceError::Store(TaskStoreError::NotFound(_)))
    ));
    // The downstream task survives with no incoming edges.
    let survivor = harness
        .service
        .get_task(downstream.id(), &harness.caller)
        .await?;
    ensure!(survivor.id() == downstream.id());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn assignment_lifecycle_through_the_service() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let task = harness
        .service
        .create_task(NewTask::new(harness.project_id, "Staffed"), &harness.caller)
        .await?;
    let worker = UserId::new();

    let assignment = harness
        .service
        .assign_user(
            task.id(),
            worker,
            AssignmentRole::Contributor,
            75,
            &harness.caller,
        )
        .await?;
    ensure!(assignment.allocation().value() == 75);
    ensure!(assignment.is_active());

    let over_allocated = harness
        .service
        .assign_user(task.id(), worker, AssignmentRole::Owner, 101, &harness.caller)
        .await;
    ensure!(matches!(
        over_allocated,
        Err(TaskServiceError::Domain(TaskDomainError::InvalidAllocation(101)))
    ));

    let closed = harness
        .service
        .unassign_user(
            task.id(),
            worker,
            AssignmentRole::Contributor,
            &harness.caller,
        )
        .await?;
    ensure!(!closed.is_active());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_filters_by_assignee() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let assigned = harness
        .service
        .create_task(NewTask::new(harness.project_id, "Assigned"), &harness.caller)
        .await?;
    harness
        .service
        .create_task(
            NewTask::new(harness.project_id, "Unassigned"),
            &harness.caller,
        )
        .await?;
    let worker = UserId::new();
    harness
        .service
        .assign_user(
            assigned.id(),
            worker,
            AssignmentRole::Contributor,
            100,
            &harness.caller,
        )
        .await?;

    let request = TaskSearchRequest::new(harness.project_id).with_assignee(worker);
    let page = harness.service.search_tasks(request, &harness.caller).await?;

    ensure!(page.total == 1);
    ensure!(page.items.first().map(crate::task::domain::Task::id) == Some(assigned.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_combines_status_and_priority_filters() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let urgent = harness
        .service
        .create_task(
            NewTask::new(harness.project_id, "Urgent work").with_priority(Priority::Urgent),
            &harness.caller,
        )
        .await?;
    harness
        .service
        .create_task(NewTask::new(harness.project_id, "Routine"), &harness.caller)
        .await?;
    harness
        .service
        .transition_status(urgent.id(), TaskStatus::InProgress, &harness.caller)
        .await?;

    let request = TaskSearchRequest::new(harness.project_id)
        .with_status(TaskStatus::InProgress)
        .with_priority(Priority::Urgent);
    let page = harness.service.search_tasks(request, &harness.caller).await?;

    ensure!(page.total == 1);
    ensure!(page.items.first().map(crate::task::domain::Task::id) == Some(urgent.id()));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn critical_path_follows_the_longest_chain() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let a = harness
        .service
        .create_task(
            dated_task_input(harness.project_id, "Design", day(0), 3),
            &harness.caller,
        )
        .await?;
    let b = harness
        .service
        .create_task(
            dated_task_input(harness.project_id, "Build", day(3), 2),
            &harness.caller,
        )
        .await?;
    let c = harness
        .service
        .create_task(
            dated_task_input(harness.project_id, "Verify", day(5), 4),
            &harness.caller,
        )
        .await?;
    let side = harness
        .service
        .create_task(
            dated_task_input(harness.project_id, "Docs", day(0), 1),
            &harness.caller,
        )
        .await?;
    for (predecessor, successor) in [(a.id(), b.id()), (b.id(), c.id())] {
        harness
            .service
            .add_dependency(
                predecessor,
                successor,
                DependencyType::FinishToStart,
                0,
                &harness.caller,
            )
            .await?;
    }

    let result = harness
        .service
        .get_critical_path(harness.project_id, &harness.caller)
        .await?;

    ensure!(result.duration_days == 9);
    ensure!(result.path == vec![a.id(), b.id(), c.id()]);
    ensure!(result.float_by_task.get(&a.id()) == Some(&0));
    ensure!(result.float_by_task.get(&side.id()) == Some(&8));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn critical_path_of_empty_project_is_empty() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let result = harness
        .service
        .get_critical_path(harness.project_id, &harness.caller)
        .await?;
    ensure!(result.path.is_empty());
    ensure!(result.duration_days == 0);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn workload_reports_only_visible_projects() -> eyre::Result<()> {
    let harness = Harness::with_full_grants();
    let visible = harness
        .service
        .create_task(
            dated_task_input(harness.project_id, "Visible", day(0), 4),
            &harness.caller,
        )
        .await?;

    let hidden_project = crate::task::domain::ProjectId::new();
    harness
        .authorizer
        .grant_all(harness.caller.user_id(), hidden_project)?;
    let hidden = harness
        .service
        .create_task(
            dated_task_input(hidden_project, "Hidden", day(0), 4),
            &harness.caller,
        )
        .await?;
    harness.authorizer.revoke(
        harness.caller.user_id(),
        hidden_project,
        Capability::ViewTasks,
    )?;

    let worker = UserId::new();
    harness
        .service
        .assign_user(
            visible.id(),
            worker,
            AssignmentRole::Contributor,
            50,
            &harness.caller,
        )
        .await?;
    harness
        .service
        .assign_user(
            hidden.id(),
            worker,
            AssignmentRole::Contributor,
            50,
            &harness.caller,
        )
        .await?;

    let range = DateRange::new(day(0), day(4))?;
    let report = harness
        .service
        .get_workload(worker, range, &harness.caller)
        .await?;

    // Five overlapping days at 50% of a 480-minute day, hidden task excluded.
    ensure!(report.total_minutes == 5 * 240);
    ensure!(report.minutes_by_day.get(&day(0)) == Some(&240));
    Ok(())
}
