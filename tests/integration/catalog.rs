//! Books, authors, publishers, libraries and staff

use chrono::{Duration, NaiveDate};

use bookloan_core::{
    models::{NewAuthor, NewBook, NewBookLoan, NewLibrarian, NewPublisher},
    repository::CrudRepository,
    AppError,
};

use crate::common::{create_book, create_library, setup, t0};

#[tokio::test]
async fn test_book_round_trip() {
    let ctx = setup().await;

    let mut new = NewBook::new("Clean Code", "Robert C. Martin", "9780132350884");
    new.publication_date = NaiveDate::from_ymd_opt(2008, 8, 1);
    new.page_count = Some(464);
    new.price = Some(42.5);

    let created = ctx.services.books.create(&new).await.unwrap();
    let loaded = ctx.services.books.get_by_id(created.id).await.unwrap();

    assert_eq!(loaded.title, "Clean Code");
    assert_eq!(loaded.author, "Robert C. Martin");
    assert_eq!(loaded.isbn, "9780132350884");
    assert_eq!(loaded.publication_date, NaiveDate::from_ymd_opt(2008, 8, 1));
    assert_eq!(loaded.page_count, Some(464));
    assert_eq!(loaded.price, Some(42.5));
    assert!(loaded.is_available);
    assert_eq!(loaded.publisher_id, None);
    assert_eq!(ctx.services.books.count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_invalid_isbn_is_not_stored() {
    let ctx = setup().await;

    let err = ctx
        .services
        .books
        .create(&NewBook::new("Clean Code", "Robert C. Martin", "INVALID123"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Validation(ref msg) if msg.contains("isbn")));
    assert_eq!(ctx.services.books.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_duplicate_isbn_is_conflict() {
    let ctx = setup().await;
    create_book(&ctx, "First", "1234567890").await;

    let err = ctx
        .services
        .books
        .create(&NewBook::new("Second", "Someone", "1234567890"))
        .await
        .unwrap_err();
    assert_eq!(err.status(), 409);
}

#[tokio::test]
async fn test_missing_book() {
    let ctx = setup().await;
    assert!(ctx.services.books.find_by_id(42).await.unwrap().is_none());
    let err = ctx.services.books.get_by_id(42).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
    assert!(matches!(ctx.services.books.delete(42).await, Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_author_link_both_sides() {
    let ctx = setup().await;
    let book = create_book(&ctx, "Refactoring", "9780201485677").await;
    let author = ctx
        .services
        .authors
        .create(&NewAuthor::new("Martin", "Fowler", "UK"))
        .await
        .unwrap();

    let (book, author) = ctx.services.books.add_author(book.id, author.id).await.unwrap();
    assert_eq!(book.author_ids, vec![author.id]);
    assert_eq!(author.book_ids, vec![book.id]);

    let stored = ctx.services.authors.get_by_id(author.id).await.unwrap();
    assert_eq!(stored.book_ids, vec![book.id]);
    let by_author = ctx.services.books.find_by_author_id(author.id).await.unwrap();
    assert_eq!(by_author.len(), 1);

    let (book, author) = ctx.services.books.remove_author(book.id, author.id).await.unwrap();
    assert!(book.author_ids.is_empty());
    assert!(author.book_ids.is_empty());
    let stored = ctx.services.authors.get_by_id(author.id).await.unwrap();
    assert!(stored.book_ids.is_empty());
}

#[tokio::test]
async fn test_book_update_rewrites_author_links() {
    let ctx = setup().await;
    let a = ctx
        .services
        .authors
        .create(&NewAuthor::new("Ann", "Able", "USA"))
        .await
        .unwrap();
    let b = ctx
        .services
        .authors
        .create(&NewAuthor::new("Ben", "Baker", "USA"))
        .await
        .unwrap();

    let mut new = NewBook::new("Pairing", "Able & Baker", "1111111111");
    new.author_ids = vec![a.id];
    let mut book = ctx.services.books.create(&new).await.unwrap();
    assert_eq!(book.author_ids, vec![a.id]);

    book.author_ids = vec![b.id];
    let book = ctx.services.books.update(&book).await.unwrap();
    assert_eq!(book.author_ids, vec![b.id]);
    assert!(ctx.services.authors.get_by_id(a.id).await.unwrap().book_ids.is_empty());
}

#[tokio::test]
async fn test_publisher_delete_cascades_to_books() {
    let ctx = setup().await;
    let publisher = ctx
        .services
        .publishers
        .create(&NewPublisher::new("Tech Books Publishing", "123 Tech Street", "San Francisco", "USA"))
        .await
        .unwrap();

    for (title, isbn) in [("One", "1000000001"), ("Two", "1000000002")] {
        let mut book = NewBook::new(title, "Someone", isbn);
        book.publisher_id = Some(publisher.id);
        ctx.services.books.create(&book).await.unwrap();
    }
    create_book(&ctx, "Independent", "2000000000").await;

    let loaded = ctx.services.publishers.get_by_id(publisher.id).await.unwrap();
    assert_eq!(loaded.book_ids.len(), 2);

    ctx.services.publishers.delete(publisher.id).await.unwrap();
    let remaining = ctx.services.books.find_all().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "Independent");
}

#[tokio::test]
async fn test_publisher_update_removes_orphaned_books() {
    let ctx = setup().await;
    let publisher = ctx
        .services
        .publishers
        .create(&NewPublisher::new("Education Press", "456 Education Ave", "Boston", "USA"))
        .await
        .unwrap();

    let mut kept = NewBook::new("Kept", "Someone", "3000000001");
    kept.publisher_id = Some(publisher.id);
    let kept = ctx.services.books.create(&kept).await.unwrap();
    let mut dropped = NewBook::new("Dropped", "Someone", "3000000002");
    dropped.publisher_id = Some(publisher.id);
    let mut dropped = ctx.services.books.create(&dropped).await.unwrap();
    let adopted = create_book(&ctx, "Adopted", "3000000003").await;

    let mut publisher = ctx.services.publishers.get_by_id(publisher.id).await.unwrap();
    publisher.remove_book(&mut dropped);
    publisher.book_ids.push(adopted.id);
    let publisher = ctx.services.publishers.update(&publisher).await.unwrap();

    assert_eq!(publisher.book_ids, vec![kept.id, adopted.id]);
    assert!(ctx.services.books.find_by_id(dropped.id).await.unwrap().is_none());
    let adopted = ctx.services.books.get_by_id(adopted.id).await.unwrap();
    assert_eq!(adopted.publisher_id, Some(publisher.id));
}

#[tokio::test]
async fn test_book_queries() {
    let ctx = setup().await;
    create_book(&ctx, "Clean Code", "4000000001").await;
    create_book(&ctx, "The Clean Coder", "4000000002").await;
    let mut hidden = NewBook::new("Legacy Code", "Michael Feathers", "4000000003");
    hidden.is_available = false;
    ctx.services.books.create(&hidden).await.unwrap();

    assert_eq!(ctx.services.books.search_by_title("clean").await.unwrap().len(), 2);
    assert_eq!(ctx.services.books.search_by_author("Feathers").await.unwrap().len(), 1);
    assert_eq!(ctx.services.books.find_available().await.unwrap().len(), 2);
    let found = ctx.services.books.find_by_isbn("4000000003").await.unwrap().unwrap();
    assert_eq!(found.title, "Legacy Code");
    assert!(ctx.services.books.find_by_isbn("9999999999").await.unwrap().is_none());
}

#[tokio::test]
async fn test_publisher_and_library_queries() {
    let ctx = setup().await;
    ctx.services
        .publishers
        .create(&NewPublisher::new("Tech Books Publishing", "1 St", "San Francisco", "USA"))
        .await
        .unwrap();
    ctx.services
        .publishers
        .create(&NewPublisher::new("Maple Leaf Press", "2 St", "Toronto", "Canada"))
        .await
        .unwrap();

    assert_eq!(ctx.services.publishers.search_by_name("tech").await.unwrap().len(), 1);
    assert_eq!(ctx.services.publishers.search_by_city("Toron").await.unwrap().len(), 1);
    assert_eq!(ctx.services.publishers.find_by_country("USA").await.unwrap().len(), 1);

    create_library(&ctx, "Main Public Library").await;
    create_library(&ctx, "West Side Branch").await;
    assert_eq!(ctx.services.libraries.search_by_name("branch").await.unwrap().len(), 1);
    assert_eq!(ctx.services.libraries.find_by_state("IL").await.unwrap().len(), 2);
    assert_eq!(ctx.services.libraries.search_by_city("Chicago").await.unwrap().len(), 2);
}

fn librarian(employee_id: &str, library_id: i64) -> NewLibrarian {
    NewLibrarian {
        first_name: "Sarah".to_string(),
        last_name: "Johnson".to_string(),
        email: None,
        phone_number: Some("(312) 555-0199".to_string()),
        employee_id: employee_id.to_string(),
        position: "Head Librarian".to_string(),
        hire_date: NaiveDate::from_ymd_opt(2019, 6, 1).unwrap(),
        salary: Some(65_000.0),
        employed: true,
        department: "Administration".to_string(),
        library_id,
    }
}

#[tokio::test]
async fn test_library_with_staff_cannot_be_deleted() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let staff = ctx.services.librarians.create(&librarian("HEAD001", library.id)).await.unwrap();

    let err = ctx.services.libraries.delete(library.id).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "unexpected error: {:?}", err);
    assert_eq!(err.status(), 409);
    assert!(ctx.services.libraries.find_by_id(library.id).await.unwrap().is_some());
    assert!(ctx.services.librarians.find_by_id(staff.id).await.unwrap().is_some());

    ctx.services.librarians.delete(staff.id).await.unwrap();
    ctx.services.libraries.delete(library.id).await.unwrap();
    assert_eq!(ctx.services.libraries.count().await.unwrap(), 0);
}

#[tokio::test]
async fn test_librarian_queries_and_processed_loans() {
    let ctx = setup().await;
    let library = create_library(&ctx, "Main Public Library").await;
    let book = create_book(&ctx, "Dune", "5000000001").await;
    let head = ctx.services.librarians.create(&librarian("HEAD001", library.id)).await.unwrap();
    let mut other = librarian("LIB002", library.id);
    other.last_name = "Chen".to_string();
    other.employed = false;
    ctx.services.librarians.create(&other).await.unwrap();

    assert_eq!(ctx.services.librarians.find_employed().await.unwrap().len(), 1);
    assert_eq!(ctx.services.librarians.find_by_library(library.id).await.unwrap().len(), 2);
    assert_eq!(ctx.services.librarians.search_by_last_name("chen").await.unwrap().len(), 1);
    assert!(ctx
        .services
        .librarians
        .find_by_employee_id("HEAD001")
        .await
        .unwrap()
        .is_some());
    assert_eq!(ctx.services.librarians.years_of_service(head.id).await.unwrap(), 4);

    let mut loan = NewBookLoan::new(book.id, library.id, "John Doe", t0(), t0() + Duration::days(14));
    loan.processed_by_id = Some(head.id);
    let loan = ctx.services.loans.create(&loan).await.unwrap();

    assert_eq!(ctx.services.librarians.count_processed_loans(head.id).await.unwrap(), 1);
    assert_eq!(ctx.services.librarians.count_active_processed_loans(head.id).await.unwrap(), 1);
    assert_eq!(ctx.services.loans.find_by_processed_by(head.id).await.unwrap().len(), 1);
    let head = ctx.services.librarians.get_by_id(head.id).await.unwrap();
    assert_eq!(head.processed_loan_ids, vec![loan.id]);

    // The loan outlives the librarian who processed it
    ctx.services.librarians.delete(head.id).await.unwrap();
    let loan = ctx.services.loans.get_by_id(loan.id).await.unwrap();
    assert_eq!(loan.processed_by_id, None);
}

#[tokio::test]
async fn test_author_queries() {
    let ctx = setup().await;
    let mut author = NewAuthor::new("Ursula", "Le Guin", "USA");
    author.email = Some("ursula@example.com".to_string());
    ctx.services.authors.create(&author).await.unwrap();
    ctx.services
        .authors
        .create(&NewAuthor::new("Frank", "Herbert", "USA"))
        .await
        .unwrap();

    assert_eq!(ctx.services.authors.search_by_last_name("guin").await.unwrap().len(), 1);
    let found = ctx
        .services
        .authors
        .find_by_email("ursula@example.com")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.full_name(), "Ursula Le Guin");
    assert_eq!(ctx.repository.authors.count().await.unwrap(), 2);
}
