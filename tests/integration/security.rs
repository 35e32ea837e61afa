//! Users, groups and the start-up seeder

use std::sync::Arc;

use bookloan_core::{
    clock::FixedClock,
    models::{NewGroup, NewUser},
    seed::Seeder,
    services::groups::DEFAULT_GROUPS,
    AppError,
};

use crate::common::{setup, t0, TestContext};

async fn create_user(ctx: &TestContext, username: &str, password: &str) -> i64 {
    ctx.services
        .users
        .create(&NewUser::new(username, password, format!("{}@library.edu", username)))
        .await
        .expect("Failed to create user")
        .id
}

#[tokio::test]
async fn test_password_is_stored_hashed() {
    let ctx = setup().await;
    let id = create_user(&ctx, "alice", "s3cret!").await;

    let user = ctx.services.users.get_by_id(id).await.unwrap();
    assert_ne!(user.password, "s3cret!");
    assert!(user.password.starts_with("$argon2"));
    assert!(user.is_active);

    let json = serde_json::to_value(&user).unwrap();
    assert!(json.get("password").is_none());
}

#[tokio::test]
async fn test_authenticate() {
    let ctx = setup().await;
    let id = create_user(&ctx, "alice", "s3cret!").await;

    let user = ctx.services.users.authenticate("alice", "s3cret!").await.unwrap();
    assert_eq!(user.id, id);

    let err = ctx.services.users.authenticate("alice", "wrong").await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));
    assert_eq!(err.status(), 401);

    let err = ctx.services.users.authenticate("nobody", "s3cret!").await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(_)));

    ctx.services.users.deactivate(id).await.unwrap();
    let err = ctx.services.users.authenticate("alice", "s3cret!").await.unwrap_err();
    assert!(matches!(err, AppError::Authentication(ref msg) if msg.contains("inactive")));

    ctx.services.users.activate(id).await.unwrap();
    assert!(ctx.services.users.authenticate("alice", "s3cret!").await.is_ok());
}

#[tokio::test]
async fn test_change_password() {
    let ctx = setup().await;
    let id = create_user(&ctx, "alice", "old-password").await;

    ctx.services.users.change_password(id, "new-password").await.unwrap();
    assert!(ctx.services.users.authenticate("alice", "old-password").await.is_err());
    assert!(ctx.services.users.authenticate("alice", "new-password").await.is_ok());
}

#[tokio::test]
async fn test_duplicate_username_is_conflict() {
    let ctx = setup().await;
    create_user(&ctx, "alice", "s3cret!").await;

    let err = ctx
        .services
        .users
        .create(&NewUser::new("alice", "other", "other@library.edu"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
    assert_eq!(ctx.services.users.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_user_email() {
    let ctx = setup().await;
    let err = ctx
        .services
        .users
        .create(&NewUser::new("alice", "s3cret!", "not-an-email"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), 400);
}

#[tokio::test]
async fn test_default_groups_are_idempotent() {
    let ctx = setup().await;

    let first = ctx.services.groups.create_default_groups().await.unwrap();
    let second = ctx.services.groups.create_default_groups().await.unwrap();
    assert_eq!(first.len(), DEFAULT_GROUPS.len());
    assert_eq!(first, second);
    assert_eq!(ctx.services.groups.count().await.unwrap(), 3);
    assert!(ctx.services.groups.group_exists("LIBRARIAN").await.unwrap());

    let admin = ctx.services.groups.find_by_group_name("ADMIN").await.unwrap().unwrap();
    assert_eq!(
        admin.description.as_deref(),
        Some("System Administrators with full access")
    );

    let err = ctx
        .services
        .groups
        .create(&NewGroup::new("ADMIN", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_group_membership() {
    let ctx = setup().await;
    ctx.services.groups.create_default_groups().await.unwrap();
    let id = create_user(&ctx, "alice", "s3cret!").await;

    let user = ctx.services.users.add_to_group(id, "LIBRARIAN").await.unwrap();
    assert!(user.is_in_group("LIBRARIAN"));
    assert!(ctx.services.groups.add_user_to_group(id, "USER").await.unwrap());
    // Adding twice keeps a single link
    assert!(ctx.services.groups.add_user_to_group(id, "USER").await.unwrap());

    assert!(ctx.services.users.has_role("alice", "LIBRARIAN").await.unwrap());
    assert!(!ctx.services.users.has_role("alice", "ADMIN").await.unwrap());
    assert!(!ctx.services.users.has_role("nobody", "USER").await.unwrap());

    let mut names = ctx.services.users.group_names("alice").await.unwrap();
    names.sort();
    assert_eq!(names, vec!["LIBRARIAN".to_string(), "USER".to_string()]);

    let group = ctx.services.groups.find_by_group_name("USER").await.unwrap().unwrap();
    let group = ctx.services.groups.get_by_id(group.id).await.unwrap();
    assert_eq!(group.user_ids, vec![id]);

    assert!(!ctx.services.groups.add_user_to_group(id, "GUESTS").await.unwrap());
    let err = ctx.services.users.add_to_group(id, "GUESTS").await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    assert!(ctx.services.groups.remove_user_from_group(id, "USER").await.unwrap());
    let user = ctx.services.users.remove_from_group(id, "LIBRARIAN").await.unwrap();
    assert!(!user.is_in_group("LIBRARIAN"));
    assert!(ctx.services.users.group_names("alice").await.unwrap().is_empty());
}

#[tokio::test]
async fn test_deleting_group_keeps_users() {
    let ctx = setup().await;
    ctx.services.groups.create_default_groups().await.unwrap();
    let id = create_user(&ctx, "alice", "s3cret!").await;
    ctx.services.users.add_to_group(id, "USER").await.unwrap();

    let group = ctx.services.groups.find_by_group_name("USER").await.unwrap().unwrap();
    ctx.services.groups.delete(group.id).await.unwrap();

    let user = ctx.services.users.get_by_id(id).await.unwrap();
    assert!(user.groups.is_empty());
}

fn seeder(ctx: &TestContext) -> Seeder {
    Seeder::new(
        ctx.repository.clone(),
        ctx.services.clone(),
        Arc::new(FixedClock(t0())),
    )
}

async fn assert_seeded_counts(ctx: &TestContext) {
    let s = &ctx.services;
    assert_eq!(s.publishers.count().await.unwrap(), 2);
    assert_eq!(s.libraries.count().await.unwrap(), 2);
    assert_eq!(s.librarians.count().await.unwrap(), 2);
    assert_eq!(s.books.count().await.unwrap(), 3);
    assert_eq!(s.borrowers.count().await.unwrap(), 3);
    assert_eq!(s.users.count().await.unwrap(), 5);
    assert_eq!(s.groups.count().await.unwrap(), 3);
    assert_eq!(s.loans.count().await.unwrap(), 3);
}

#[tokio::test]
async fn test_seeder_populates_sample_data() {
    let ctx = setup().await;
    seeder(&ctx).run(false).await.unwrap();
    assert_seeded_counts(&ctx).await;

    let admin = ctx.services.users.authenticate("admin", "admin123").await.unwrap();
    assert!(admin.has_role("ADMIN"));
    let student = ctx.services.users.find_by_username("student").await.unwrap().unwrap();
    assert!(student.borrower_id.is_some());
    assert!(ctx.services.users.has_role("student", "USER").await.unwrap());

    // The loan due today is not yet overdue
    assert!(ctx.services.loans.find_overdue().await.unwrap().is_empty());
    assert_eq!(ctx.services.loans.find_active().await.unwrap().len(), 3);
    let head = ctx
        .services
        .librarians
        .find_by_employee_id("HEAD001")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ctx.services.librarians.count_processed_loans(head.id).await.unwrap(), 2);
    assert_eq!(ctx.services.librarians.years_of_service(head.id).await.unwrap(), 4);
}

#[tokio::test]
async fn test_seeder_skips_populated_database() {
    let ctx = setup().await;
    let seeder = seeder(&ctx);
    seeder.run(false).await.unwrap();
    seeder.run(false).await.unwrap();
    assert_seeded_counts(&ctx).await;
}

#[tokio::test]
async fn test_seeder_reset_recreates_data() {
    let ctx = setup().await;
    let seeder = seeder(&ctx);
    seeder.run(false).await.unwrap();
    create_user(&ctx, "extra", "extra123").await;

    seeder.run(true).await.unwrap();
    assert_seeded_counts(&ctx).await;
    assert!(ctx.services.users.find_by_username("extra").await.unwrap().is_none());
}
