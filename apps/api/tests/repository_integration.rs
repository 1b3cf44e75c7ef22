//! Integration tests for the PostgreSQL repository layer
//!
//! These tests verify that the repository implementations correctly interact
//! with the PostgreSQL database, including seat reservations under the team
//! row lock, membership reactivation, soft deletes and unique constraints.
//!
//! They only run when `DATABASE_URL` is set; otherwise each test returns
//! early.

use chrono::Utc;
use sqlx::PgPool;
use team_membership_api::domain::member::{SchemeRoleFlags, TeamMember};
use team_membership_api::domain::repositories::{
    MemberRepository, SeatReservation, TeamRepository,
};
use team_membership_api::domain::team::{Team, TeamType};
use team_membership_api::domain::user::value_objects::Email;
use team_membership_api::error::TeamError;
use team_membership_api::infrastructure::repositories::{
    PostgresMemberRepository, PostgresTeamRepository,
};
use uuid::Uuid;

/// Set up test database connection pool with the schema applied
async fn setup_test_db() -> Option<PgPool> {
    let database_url = std::env::var("DATABASE_URL").ok()?;

    let pool = PgPool::connect(&database_url)
        .await
        .expect("Failed to connect to test database");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}

/// Build a team with a unique name so tests can share one database
fn unique_team() -> Team {
    let suffix = Uuid::new_v4().simple().to_string();
    let name = format!("repo-{}", &suffix[..12]);

    Team::new(
        "Repository Team".to_string(),
        name.clone(),
        Email::new(format!("{}@test.com", name)).expect("valid email"),
        TeamType::Open,
    )
    .expect("valid team")
}

/// Clean up test data
async fn cleanup_team(pool: &PgPool, team_id: Uuid) {
    sqlx::query("DELETE FROM team_members WHERE team_id = $1")
        .bind(team_id)
        .execute(pool)
        .await
        .expect("Failed to cleanup team members");
    sqlx::query("DELETE FROM teams WHERE id = $1")
        .bind(team_id)
        .execute(pool)
        .await
        .expect("Failed to cleanup team");
}

#[tokio::test]
async fn test_reserve_seat_past_limit_is_rejected() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let teams = PostgresTeamRepository::new(pool.clone());
    let members = PostgresMemberRepository::new(pool.clone());
    let team = teams.create(&unique_team()).await.expect("create team");

    let first = TeamMember::new(team.id(), Uuid::new_v4(), false);
    let second = TeamMember::new(team.id(), Uuid::new_v4(), false);

    let reserved = members
        .reserve_seat(&first, Some(1))
        .await
        .expect("first seat");
    let rejected = members.reserve_seat(&second, Some(1)).await;

    assert!(matches!(reserved, SeatReservation::Reserved(_)));
    assert!(matches!(
        rejected,
        Err(TeamError::CapacityExceeded { limit: 1, .. })
    ));
    assert_eq!(members.active_count(team.id()).await.unwrap(), 1);

    // An active pair is reported, not double-booked
    let again = members.reserve_seat(&first, Some(1)).await.unwrap();
    assert!(matches!(again, SeatReservation::AlreadyActive(_)));

    cleanup_team(&pool, team.id()).await;
}

#[tokio::test]
async fn test_reserve_seat_for_unknown_team_fails() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let members = PostgresMemberRepository::new(pool);
    let member = TeamMember::new(Uuid::new_v4(), Uuid::new_v4(), false);

    let result = members.reserve_seat(&member, None).await;

    assert!(matches!(result, Err(TeamError::NotFound { .. })));
}

#[tokio::test]
async fn test_reactivation_keeps_created_at() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let teams = PostgresTeamRepository::new(pool.clone());
    let members = PostgresMemberRepository::new(pool.clone());
    let team = teams.create(&unique_team()).await.expect("create team");
    let user_id = Uuid::new_v4();

    let original = match members
        .reserve_seat(&TeamMember::new(team.id(), user_id, false), None)
        .await
        .unwrap()
    {
        SeatReservation::Reserved(member) => member,
        other => panic!("Expected reservation, got {:?}", other),
    };
    let removed = members
        .deactivate(team.id(), user_id, Utc::now())
        .await
        .unwrap();
    assert!(!removed.is_active());

    let mut returning = members
        .find(team.id(), user_id, true)
        .await
        .unwrap()
        .expect("deleted row is still stored");
    returning.reactivate(false).unwrap();
    let rejoined = match members.reserve_seat(&returning, None).await.unwrap() {
        SeatReservation::Reserved(member) => member,
        other => panic!("Expected reservation, got {:?}", other),
    };

    assert!(rejoined.is_active());
    assert_eq!(rejoined.created_at(), original.created_at());

    let rows: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM team_members WHERE team_id = $1")
            .bind(team.id())
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(rows, 1);

    cleanup_team(&pool, team.id()).await;
}

#[tokio::test]
async fn test_find_filters_deleted_memberships() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let teams = PostgresTeamRepository::new(pool.clone());
    let members = PostgresMemberRepository::new(pool.clone());
    let team = teams.create(&unique_team()).await.expect("create team");
    let user_id = Uuid::new_v4();

    members
        .reserve_seat(&TeamMember::new(team.id(), user_id, false), None)
        .await
        .unwrap();
    members
        .deactivate(team.id(), user_id, Utc::now())
        .await
        .unwrap();

    let active = members.find(team.id(), user_id, false).await.unwrap();
    let any = members.find(team.id(), user_id, true).await.unwrap();

    assert!(active.is_none());
    assert!(any.is_some_and(|m| !m.is_active()));
    assert!(members.find_by_team(team.id()).await.unwrap().is_empty());

    let again = members.deactivate(team.id(), user_id, Utc::now()).await;
    assert!(matches!(again, Err(TeamError::NotFound { .. })));

    cleanup_team(&pool, team.id()).await;
}

#[tokio::test]
async fn test_save_only_updates_active_memberships() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let teams = PostgresTeamRepository::new(pool.clone());
    let members = PostgresMemberRepository::new(pool.clone());
    let team = teams.create(&unique_team()).await.expect("create team");
    let user_id = Uuid::new_v4();

    members
        .reserve_seat(&TeamMember::new(team.id(), user_id, false), Some(1))
        .await
        .unwrap();
    let mut member = members
        .find(team.id(), user_id, false)
        .await
        .unwrap()
        .expect("active member");

    member
        .set_scheme_roles(SchemeRoleFlags::new(false, true, true, false))
        .unwrap();
    let saved = members.save(&member).await.unwrap();
    assert!(saved.is_admin());

    // A copy read before the removal must not bring the member back
    members
        .deactivate(team.id(), user_id, Utc::now())
        .await
        .unwrap();
    members
        .reserve_seat(&TeamMember::new(team.id(), Uuid::new_v4(), false), Some(1))
        .await
        .unwrap();
    let stale = members.save(&member).await;

    assert!(matches!(stale, Err(TeamError::NotFound { .. })));
    assert_eq!(members.active_count(team.id()).await.unwrap(), 1);

    cleanup_team(&pool, team.id()).await;
}

#[tokio::test]
async fn test_deactivate_all_soft_deletes_members() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let teams = PostgresTeamRepository::new(pool.clone());
    let members = PostgresMemberRepository::new(pool.clone());
    let team = teams.create(&unique_team()).await.expect("create team");

    for _ in 0..3 {
        members
            .reserve_seat(&TeamMember::new(team.id(), Uuid::new_v4(), false), None)
            .await
            .unwrap();
    }

    let removed = members.deactivate_all(team.id(), Utc::now()).await.unwrap();

    assert_eq!(removed, 3);
    assert_eq!(members.active_count(team.id()).await.unwrap(), 0);

    cleanup_team(&pool, team.id()).await;
}

#[tokio::test]
async fn test_duplicate_team_name_conflicts_on_create() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let teams = PostgresTeamRepository::new(pool.clone());
    let team = teams.create(&unique_team()).await.expect("create team");

    let duplicate = Team::new(
        "Other".to_string(),
        team.name().to_string(),
        Email::new(format!("other-{}", team.email().as_str())).unwrap(),
        TeamType::Invite,
    )
    .unwrap();
    let result = teams.create(&duplicate).await;

    match result {
        Err(TeamError::Conflict { field, .. }) => assert_eq!(field, "name"),
        other => panic!("Expected conflict, got {:?}", other),
    }

    cleanup_team(&pool, team.id()).await;
}

#[tokio::test]
async fn test_duplicate_team_email_conflicts_on_update() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let teams = PostgresTeamRepository::new(pool.clone());
    let first = teams.create(&unique_team()).await.expect("create team");
    let second = teams.create(&unique_team()).await.expect("create team");

    let clash = Team::from_persistence(
        second.id(),
        second.display_name().to_string(),
        second.name().to_string(),
        first.email().clone(),
        second.team_type(),
        second.description().to_string(),
        second.allow_open_invite(),
        second.scheme_id(),
        second.created_at(),
        Utc::now(),
        None,
    );
    let result = teams.update(&clash).await;

    match result {
        Err(TeamError::Conflict { field, .. }) => assert_eq!(field, "email"),
        other => panic!("Expected conflict, got {:?}", other),
    }

    cleanup_team(&pool, first.id()).await;
    cleanup_team(&pool, second.id()).await;
}

#[tokio::test]
async fn test_update_unknown_team_is_not_found() {
    let Some(pool) = setup_test_db().await else {
        return;
    };
    let teams = PostgresTeamRepository::new(pool);

    let result = teams.update(&unique_team()).await;

    assert!(matches!(result, Err(TeamError::NotFound { .. })));
}
