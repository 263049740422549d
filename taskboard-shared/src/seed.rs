/// Default data for a fresh installation
///
/// Seeding is idempotent: rows whose unique key (email, slug, label name)
/// already exists are left alone, so it is safe to run on every startup.

use crate::error::CoreResult;
use crate::models::label::CreateLabel;
use crate::models::task_status::CreateTaskStatus;
use crate::models::user::CreateUser;
use crate::services;
use crate::store::Store;
use tracing::info;

pub const DEFAULT_USER_EMAIL: &str = "hexlet@example.com";
pub const DEFAULT_USER_PASSWORD: &str = "qwerty";

/// `(name, slug)` of the default statuses
pub const DEFAULT_STATUSES: [(&str, &str); 5] = [
    ("Draft", "draft"),
    ("To review", "to_review"),
    ("To be fixed", "to_be_fixed"),
    ("To publish", "to_publish"),
    ("Published", "published"),
];

pub const DEFAULT_LABELS: [&str; 2] = ["feature", "bug"];

/// Counts of rows created by one [`seed`] run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub users: usize,
    pub statuses: usize,
    pub labels: usize,
}

/// Creates whatever default rows are missing
pub async fn seed(store: &dyn Store) -> CoreResult<SeedReport> {
    let mut report = SeedReport::default();

    if !store.user_exists_by_email(DEFAULT_USER_EMAIL).await? {
        services::users::create(
            store,
            CreateUser {
                email: DEFAULT_USER_EMAIL.to_string(),
                first_name: None,
                last_name: None,
                password: DEFAULT_USER_PASSWORD.to_string(),
            },
        )
        .await?;
        report.users += 1;
    }

    for (name, slug) in DEFAULT_STATUSES {
        if !store.status_exists_by_slug(slug).await? {
            services::task_statuses::create(
                store,
                CreateTaskStatus {
                    name: name.to_string(),
                    slug: slug.to_string(),
                },
            )
            .await?;
            report.statuses += 1;
        }
    }

    for name in DEFAULT_LABELS {
        if !store.label_exists_by_name(name).await? {
            services::labels::create(
                store,
                CreateLabel {
                    name: name.to_string(),
                },
            )
            .await?;
            report.labels += 1;
        }
    }

    info!(
        users = report.users,
        statuses = report.statuses,
        labels = report.labels,
        "Seed data applied"
    );
    Ok(report)
}
