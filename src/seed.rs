//! One-time sample data initialisation, run explicitly at start-up

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};

use crate::{
    clock::Clock,
    error::{AppError, AppResult},
    models::{
        book::NewBook, borrower::NewBorrower, librarian::NewLibrarian, library::NewLibrary,
        loan::NewBookLoan, publisher::NewPublisher, user::NewUser, Borrower,
    },
    repository::Repository,
    services::Services,
};

/// Child tables first so foreign keys never block the wipe
const CLEAR_ORDER: [&str; 11] = [
    "book_loans",
    "user_groups",
    "users",
    "book_authors",
    "books",
    "authors",
    "borrowers",
    "librarians",
    "libraries",
    "publishers",
    "security_groups",
];

pub struct Seeder {
    repository: Repository,
    services: Services,
    clock: Arc<dyn Clock>,
}

impl Seeder {
    pub fn new(repository: Repository, services: Services, clock: Arc<dyn Clock>) -> Self {
        Self {
            repository,
            services,
            clock,
        }
    }

    /// Seeds sample data, optionally wiping every table first.
    /// Does nothing beyond the report when data is already present and `reset` is off.
    pub async fn run(&self, reset: bool) -> AppResult<()> {
        tracing::info!("Starting database seeding");

        if reset {
            self.clear().await?;
        } else if self.services.books.count().await? > 0 {
            tracing::info!("Database already contains data, skipping seeding");
            return self.report().await;
        }

        self.create_sample_data().await?;
        self.report().await
    }

    pub async fn clear(&self) -> AppResult<()> {
        tracing::info!("Clearing existing data");
        let mut tx = self.repository.pool.begin().await?;
        for table in CLEAR_ORDER {
            sqlx::query(&format!("DELETE FROM {}", table))
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        tracing::info!("Existing data cleared");
        Ok(())
    }

    async fn create_sample_data(&self) -> AppResult<()> {
        tracing::info!("Creating sample data");
        let today = self.clock.today();

        self.services.groups.create_default_groups().await?;

        let mut tech = NewPublisher::new("Tech Books Publishing", "123 Tech Street", "San Francisco", "USA");
        tech.email = Some("info@techbooks.com".to_string());
        let tech = self.services.publishers.create(&tech).await?;

        let mut edu = NewPublisher::new("Education Press", "456 Education Ave", "Boston", "USA");
        edu.email = Some("contact@educationpress.com".to_string());
        let edu = self.services.publishers.create(&edu).await?;

        let mut main = NewLibrary::new(
            "Main Public Library",
            "100 Library Way",
            "Chicago",
            "IL",
            "60601",
            time(9),
            time(21),
            500,
        );
        main.email = Some("main@chicagolibrary.org".to_string());
        main.phone_number = Some("312-555-0100".to_string());
        let main = self.services.libraries.create(&main).await?;

        let mut west = NewLibrary::new(
            "West Side Branch",
            "200 West Street",
            "Chicago",
            "IL",
            "60602",
            time(10),
            time(18),
            200,
        );
        west.email = Some("westside@chicagolibrary.org".to_string());
        west.phone_number = Some("312-555-0200".to_string());
        let west = self.services.libraries.create(&west).await?;

        let head = self
            .services
            .librarians
            .create(&NewLibrarian {
                first_name: "Sarah".to_string(),
                last_name: "Johnson".to_string(),
                email: Some("sarah.johnson@chicagolibrary.org".to_string()),
                phone_number: Some("(312) 555-0199".to_string()),
                employee_id: "HEAD001".to_string(),
                position: "Head Librarian".to_string(),
                hire_date: today - Duration::days(5 * 365),
                salary: Some(65_000.0),
                employed: true,
                department: "Administration".to_string(),
                library_id: main.id,
            })
            .await?;

        let reference = self
            .services
            .librarians
            .create(&NewLibrarian {
                first_name: "Michael".to_string(),
                last_name: "Chen".to_string(),
                email: Some("michael.chen@chicagolibrary.org".to_string()),
                phone_number: Some("(312) 555-0299".to_string()),
                employee_id: "LIB002".to_string(),
                position: "Reference Librarian".to_string(),
                hire_date: today - Duration::days(2 * 365),
                salary: Some(48_000.0),
                employed: true,
                department: "Reference".to_string(),
                library_id: west.id,
            })
            .await?;

        let java = self
            .create_book(
                "Java Programming Fundamentals",
                "Dr. Alice Smith",
                "9780123456789",
                date(2023, 6, 15)?,
                450,
                59.99,
                tech.id,
            )
            .await?;
        let database = self
            .create_book(
                "Database Design and Implementation",
                "Prof. Bob Wilson",
                "9780987654321",
                date(2023, 3, 20)?,
                380,
                54.99,
                tech.id,
            )
            .await?;
        let web = self
            .create_book(
                "Web Development with Modern Frameworks",
                "Dr. Carol Davis",
                "9780567890123",
                date(2023, 9, 10)?,
                520,
                69.99,
                edu.id,
            )
            .await?;

        let student = self
            .create_borrower(
                ("John", "Doe"),
                "john.doe@student.edu",
                "(555) 123-4567",
                date(2000, 5, 15)?,
                "123 Student Lane",
                "60603",
            )
            .await?;
        let teacher = self
            .create_borrower(
                ("Jane", "Smith"),
                "jane.smith@school.edu",
                "(555) 987-6543",
                date(1985, 8, 22)?,
                "456 Teacher Avenue",
                "60604",
            )
            .await?;
        let parent = self
            .create_borrower(
                ("Robert", "Johnson"),
                "robert.johnson@email.com",
                "(555) 456-7890",
                date(1978, 12, 3)?,
                "789 Parent Street",
                "60605",
            )
            .await?;

        self.create_user("admin", "admin123", "admin@library.edu", None, "ADMIN").await?;
        self.create_user("librarian", "lib123", "librarian@library.edu", None, "LIBRARIAN")
            .await?;
        self.create_user("student", "student123", &student.email, Some(student.id), "USER")
            .await?;
        self.create_user("teacher", "teacher123", &teacher.email, Some(teacher.id), "USER")
            .await?;
        self.create_user("parent", "parent123", &parent.email, Some(parent.id), "USER")
            .await?;

        let loans = [
            (java.id, main.id, &student, 7, 7, head.id),
            (database.id, west.id, &teacher, 14, 0, reference.id),
            (web.id, main.id, &parent, 3, 11, head.id),
        ];
        for (book_id, library_id, borrower, days_ago, days_left, librarian_id) in loans {
            let mut loan = NewBookLoan::for_borrower(
                book_id,
                library_id,
                borrower,
                today - Duration::days(days_ago),
                today + Duration::days(days_left),
            );
            loan.processed_by_id = Some(librarian_id);
            self.services.loans.create(&loan).await?;
        }

        tracing::info!("Sample data created successfully");
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn create_book(
        &self,
        title: &str,
        author: &str,
        isbn: &str,
        published: NaiveDate,
        pages: i32,
        price: f64,
        publisher_id: i64,
    ) -> AppResult<crate::models::Book> {
        let mut book = NewBook::new(title, author, isbn);
        book.publication_date = Some(published);
        book.page_count = Some(pages);
        book.price = Some(price);
        book.publisher_id = Some(publisher_id);
        self.services.books.create(&book).await
    }

    async fn create_borrower(
        &self,
        (first_name, last_name): (&str, &str),
        email: &str,
        phone: &str,
        birth_date: NaiveDate,
        address: &str,
        zip_code: &str,
    ) -> AppResult<Borrower> {
        let mut borrower = NewBorrower::new(first_name, last_name, email, phone);
        borrower.birth_date = Some(birth_date);
        borrower.address = Some(address.to_string());
        borrower.city = Some("Chicago".to_string());
        borrower.state = Some("IL".to_string());
        borrower.zip_code = Some(zip_code.to_string());
        self.services.borrowers.create(&borrower).await
    }

    async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
        borrower_id: Option<i64>,
        group: &str,
    ) -> AppResult<()> {
        let mut user = NewUser::new(username, password, email);
        user.borrower_id = borrower_id;
        let user = self.services.users.create(&user).await?;
        self.services.users.add_to_group(user.id, group).await?;
        tracing::info!("Created {} user: {}", group, username);
        Ok(())
    }

    /// Logs every relationship in the database
    pub async fn report(&self) -> AppResult<()> {
        tracing::info!("=== RELATIONSHIP REPORT ===");

        tracing::info!("--- Publishers and their books ---");
        for publisher in self.services.publishers.find_all().await? {
            tracing::info!(
                "Publisher: {} ({}, {})",
                publisher.name,
                publisher.city,
                publisher.country
            );
            for book in self.services.books.find_by_publisher(publisher.id).await? {
                tracing::info!("  Book: {} by {}", book.title, book.author);
            }
        }

        tracing::info!("--- Libraries and their staff ---");
        let libraries = self.services.libraries.find_all().await?;
        for library in &libraries {
            tracing::info!("Library: {} ({}, {})", library.name, library.city, library.state);
            for librarian in self.services.librarians.find_by_library(library.id).await? {
                tracing::info!("  Librarian: {} - {}", librarian.full_name(), librarian.position);
            }
        }

        tracing::info!("--- Borrowers and their loans ---");
        for borrower in self.services.borrowers.find_all().await? {
            tracing::info!("Borrower: {} ({})", borrower.full_name(), borrower.email);
            for loan in self.services.loans.find_by_borrower(borrower.id).await? {
                let title = self.book_title(loan.book_id).await?;
                tracing::info!(
                    "  Loan: \"{}\" due {} (Status: {})",
                    title,
                    loan.due_date,
                    if loan.is_active() { "Active" } else { "Returned" }
                );
            }
        }

        tracing::info!("--- Active loans by library ---");
        for library in &libraries {
            let active = self.services.libraries.count_active_loans(library.id).await?;
            let total = self.services.libraries.count_total_loans(library.id).await?;
            tracing::info!("{}: {} active loans out of {} total loans", library.name, active, total);
        }

        tracing::info!("--- Overdue loans ---");
        let overdue = self.services.loans.find_overdue().await?;
        if overdue.is_empty() {
            tracing::info!("No overdue loans");
        }
        for loan in overdue {
            let title = self.book_title(loan.book_id).await?;
            tracing::info!(
                "Overdue: \"{}\" borrowed by {} (Due: {})",
                title,
                loan.borrower_name,
                loan.due_date
            );
        }

        tracing::info!("=== REPORT COMPLETE ===");
        Ok(())
    }

    async fn book_title(&self, book_id: Option<i64>) -> AppResult<String> {
        match book_id {
            Some(id) => Ok(self.services.books.get_by_id(id).await?.title),
            None => Ok("<no book>".to_string()),
        }
    }
}

fn time(hour: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN)
}

fn date(year: i32, month: u32, day: u32) -> AppResult<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| AppError::Internal(format!("Invalid date {}-{}-{}", year, month, day)))
}
