//! Pair-uniqueness tests for the in-memory membership store.

use mockable::Clock;
use rstest::rstest;

use crate::project::{
    adapters::memory::InMemoryMembershipRepository,
    domain::{InvitationToken, ProjectId, ProjectMember, UserId},
    ports::{MembershipRepository, MembershipRepositoryError},
};
use crate::test_support::TestClock;

fn invitation(project_id: ProjectId, user_id: UserId, clock: &TestClock) -> ProjectMember {
    ProjectMember::invite(
        project_id,
        user_id,
        InvitationToken::generate().digest(),
        clock,
    )
}

#[rstest]
#[case::both_pending(false)]
#[case::first_accepted(true)]
#[tokio::test(flavor = "multi_thread")]
async fn second_record_for_a_pair_is_refused(#[case] accept_first: bool) {
    let clock = TestClock::at(2024, 6, 3, 12, 0, 0);
    let repo = InMemoryMembershipRepository::new();
    let project_id = ProjectId::new();
    let user_id = UserId::new();

    let mut first = invitation(project_id, user_id, &clock);
    if accept_first {
        first.accept_at(clock.utc()).expect("pending invitation");
    }
    repo.insert(&first).await.expect("first record");
    let second = invitation(project_id, user_id, &clock);

    let err = repo
        .insert(&second)
        .await
        .expect_err("pair already has a record");

    assert!(matches!(
        err,
        MembershipRepositoryError::DuplicateMembership {
            project_id: refused_project,
            user_id: refused_user,
        } if refused_project == project_id && refused_user == user_id
    ));
    let stored = repo
        .find_by_pair(project_id, user_id)
        .await
        .expect("lookup")
        .expect("first record kept");
    assert_eq!(stored.id(), first.id());
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn same_user_may_join_different_projects() {
    let clock = TestClock::at(2024, 6, 3, 12, 0, 0);
    let repo = InMemoryMembershipRepository::new();
    let user_id = UserId::new();

    repo.insert(&invitation(ProjectId::new(), user_id, &clock))
        .await
        .expect("first project");
    repo.insert(&invitation(ProjectId::new(), user_id, &clock))
        .await
        .expect("second project");

    let pending = repo.find_pending_by_user(user_id).await.expect("lookup");
    assert_eq!(pending.len(), 2);
}
