//! Loan lifecycle, fines and loan-owning aggregates

use chrono::Duration;

use bookloan_core::{
    models::{NewBookLoan, NewUser},
    AppError,
};

use crate::common::{create_book, create_borrower, create_library, setup, setup_at, t0};

#[tokio::test]
async fn test_late_return_charges_fine() {
    // Loan taken at T, due T+14, returned T+20
    let return_day = t0() + Duration::days(20);
    let ctx = setup_at(return_day).await;
    let library = create_library(&ctx, "Main Public Library").await;
    let book = create_book(&ctx, "Dune", "6000000001").await;
    let borrower = create_borrower(&ctx, "john.doe@student.edu").await;

    let loan = ctx
        .services
        .loans
        .create_for_borrower(book.id, library.id, borrower.id, t0(), t0() + Duration::days(14))
        .await
        .unwrap();
    assert_eq!(loan.borrower_name, "John Doe");
    assert_eq!(loan.borrower_email.as_deref(), Some("john.doe@student.edu"));
    assert!(ctx.services.loans.is_overdue(loan.id).await.unwrap());

    let returned = ctx.services.loans.return_loan(loan.id).await.unwrap();
    assert_eq!(returned.return_date, Some(return_day));
    assert_eq!(returned.fine_amount, 6.0);
    assert!(!returned.is_active());

    let stored = ctx.services.loans.get_by_id(loan.id).await.unwrap();
    assert_eq!(stored.fine_amount, 6.0);
    assert!(!ctx.services.loans.is_overdue(loan.id).await.unwrap());
    assert!(ctx.services.loans.find_active().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_on_time_return_has_no_fine() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let book = create_book(&ctx, "Dune", "6000000002").await;

    let loan = ctx
        .services
        .loans
        .create(&NewBookLoan::new(
            book.id,
            library.id,
            "Walk In",
            t0() - Duration::days(3),
            t0() + Duration::days(11),
        ))
        .await
        .unwrap();

    let returned = ctx.services.loans.return_loan(loan.id).await.unwrap();
    assert_eq!(returned.return_date, Some(t0()));
    assert_eq!(returned.fine_amount, 0.0);
}

#[tokio::test]
async fn test_loan_for_unknown_borrower() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let book = create_book(&ctx, "Dune", "6000000003").await;

    let err = ctx
        .services
        .loans
        .create_for_borrower(book.id, library.id, 99, t0(), t0() + Duration::days(14))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_loan_for_unknown_book_is_rejected() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;

    let result = ctx
        .services
        .loans
        .create(&NewBookLoan::new(99, library.id, "Nobody", t0(), t0() + Duration::days(14)))
        .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    assert_eq!(ctx.services.loans.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_overdue_queries() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let late_book = create_book(&ctx, "Late", "6100000001").await;
    let fresh_book = create_book(&ctx, "Fresh", "6100000002").await;
    let late = create_borrower(&ctx, "late@example.com").await;
    let punctual = create_borrower(&ctx, "punctual@example.com").await;

    let overdue = ctx
        .services
        .loans
        .create_for_borrower(
            late_book.id,
            library.id,
            late.id,
            t0() - Duration::days(21),
            t0() - Duration::days(7),
        )
        .await
        .unwrap();
    // Due today is not yet overdue
    ctx.services
        .loans
        .create_for_borrower(
            fresh_book.id,
            library.id,
            punctual.id,
            t0() - Duration::days(14),
            t0(),
        )
        .await
        .unwrap();

    let found = ctx.services.loans.find_overdue().await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, overdue.id);

    let borrowers = ctx.services.borrowers.find_with_overdue_loans().await.unwrap();
    assert_eq!(borrowers.len(), 1);
    assert_eq!(borrowers[0].email, "late@example.com");

    assert_eq!(ctx.services.loans.find_by_borrower(late.id).await.unwrap().len(), 1);
    assert_eq!(ctx.services.loans.find_by_book(fresh_book.id).await.unwrap().len(), 1);
    assert_eq!(ctx.services.loans.find_by_library(library.id).await.unwrap().len(), 2);
    assert_eq!(
        ctx.services
            .loans
            .find_active_by_borrower_name("John Doe")
            .await
            .unwrap()
            .len(),
        2
    );
    assert_eq!(ctx.services.borrowers.count_active_loans(late.id).await.unwrap(), 1);

    ctx.services.loans.return_loan(overdue.id).await.unwrap();
    assert!(ctx.services.loans.find_overdue().await.unwrap().is_empty());
    assert!(ctx.services.borrowers.find_with_overdue_loans().await.unwrap().is_empty());
    assert_eq!(ctx.services.borrowers.count_active_loans(late.id).await.unwrap(), 0);
}

#[tokio::test]
async fn test_active_loan_counts_per_library() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let book = create_book(&ctx, "Dune", "6200000001").await;
    let borrower = create_borrower(&ctx, "john.doe@student.edu").await;

    let mut ids = Vec::new();
    for days_ago in [10, 5, 1] {
        let loan = ctx
            .services
            .loans
            .create_for_borrower(
                book.id,
                library.id,
                borrower.id,
                t0() - Duration::days(days_ago),
                t0() + Duration::days(14 - days_ago),
            )
            .await
            .unwrap();
        ids.push(loan.id);
    }
    ctx.services.loans.return_loan(ids[0]).await.unwrap();

    assert_eq!(ctx.services.libraries.count_total_loans(library.id).await.unwrap(), 3);
    assert_eq!(ctx.services.libraries.count_active_loans(library.id).await.unwrap(), 2);

    let library = ctx.services.libraries.get_by_id(library.id).await.unwrap();
    assert_eq!(library.loan_ids, ids);
    let book = ctx.services.books.get_by_id(book.id).await.unwrap();
    assert_eq!(book.loan_count(), 3);
    let borrower = ctx.services.borrowers.get_by_id(borrower.id).await.unwrap();
    assert_eq!(borrower.loan_ids, ids);
}

#[tokio::test]
async fn test_library_update_removes_orphaned_loans() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let book = create_book(&ctx, "Dune", "6300000001").await;

    let mut loans = Vec::new();
    for name in ["Kept Reader", "Dropped Reader"] {
        let loan = ctx
            .services
            .loans
            .create(&NewBookLoan::new(book.id, library.id, name, t0(), t0() + Duration::days(14)))
            .await
            .unwrap();
        loans.push(loan);
    }

    let mut library = ctx.services.libraries.get_by_id(library.id).await.unwrap();
    library.remove_loan(&mut loans[1]);
    let library = ctx.services.libraries.update(&library).await.unwrap();

    assert_eq!(library.loan_ids, vec![loans[0].id]);
    assert!(ctx.services.loans.find_by_id(loans[1].id).await.unwrap().is_none());
    assert_eq!(ctx.services.loans.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_book_update_removes_orphaned_loans() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let book = create_book(&ctx, "Dune", "6300000002").await;

    let mut loans = Vec::new();
    for name in ["Dropped Reader", "Kept Reader"] {
        let loan = ctx
            .services
            .loans
            .create(&NewBookLoan::new(book.id, library.id, name, t0(), t0() + Duration::days(14)))
            .await
            .unwrap();
        loans.push(loan);
    }

    let mut book = ctx.services.books.get_by_id(book.id).await.unwrap();
    book.remove_loan(&mut loans[0]);
    assert_eq!(loans[0].book_id, None);
    let book = ctx.services.books.update(&book).await.unwrap();

    assert_eq!(book.loan_ids, vec![loans[1].id]);
    assert!(ctx.services.loans.find_by_id(loans[0].id).await.unwrap().is_none());
    assert!(ctx.services.loans.find_by_id(loans[1].id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_borrower_update_removes_orphaned_loans() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let book = create_book(&ctx, "Dune", "6300000003").await;
    let borrower = create_borrower(&ctx, "john.doe@student.edu").await;
    let other = create_borrower(&ctx, "jane.smith@school.edu").await;

    for reader in [borrower.id, borrower.id, other.id] {
        ctx.services
            .loans
            .create_for_borrower(book.id, library.id, reader, t0(), t0() + Duration::days(14))
            .await
            .unwrap();
    }

    let mut borrower = ctx.services.borrowers.get_by_id(borrower.id).await.unwrap();
    assert_eq!(borrower.loan_ids.len(), 2);
    borrower.loan_ids.clear();
    let borrower = ctx.services.borrowers.update(&borrower).await.unwrap();

    assert!(borrower.loan_ids.is_empty());
    assert!(ctx.services.loans.find_by_borrower(borrower.id).await.unwrap().is_empty());
    // Other borrowers keep their loans
    assert_eq!(ctx.services.loans.find_by_borrower(other.id).await.unwrap().len(), 1);
    assert_eq!(ctx.services.loans.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_borrower_delete_cascades() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let book = create_book(&ctx, "Dune", "6400000001").await;
    let borrower = create_borrower(&ctx, "john.doe@student.edu").await;

    ctx.services
        .loans
        .create_for_borrower(book.id, library.id, borrower.id, t0(), t0() + Duration::days(14))
        .await
        .unwrap();
    let mut user = NewUser::new("student", "student123", "john.doe@student.edu");
    user.borrower_id = Some(borrower.id);
    let user = ctx.services.users.create(&user).await.unwrap();

    ctx.services.borrowers.delete(borrower.id).await.unwrap();

    assert_eq!(ctx.services.loans.count().await.unwrap(), 0);
    assert!(ctx.services.users.find_by_id(user.id).await.unwrap().is_none());
    // Catalogue entries are untouched
    assert!(ctx.services.books.find_by_id(book.id).await.unwrap().is_some());
    assert!(ctx.services.libraries.find_by_id(library.id).await.unwrap().is_some());
}

#[tokio::test]
async fn test_book_delete_cascades_to_loans() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let book = create_book(&ctx, "Dune", "6500000001").await;

    ctx.services
        .loans
        .create(&NewBookLoan::new(book.id, library.id, "Reader", t0(), t0() + Duration::days(14)))
        .await
        .unwrap();

    ctx.services.books.delete(book.id).await.unwrap();
    assert_eq!(ctx.services.loans.count().await.unwrap(), 0);
    assert_eq!(ctx.services.libraries.count_total_loans(library.id).await.unwrap(), 0);
}
