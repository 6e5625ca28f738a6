pub use sea_orm_migration::prelude::*;

mod m20250601_000001_users;
mod m20250601_000002_employers_jobs;
mod m20250601_000003_candidate_relations;
mod m20250601_000004_sales_crm;
mod m20250601_000005_interviews;
mod m20250601_000006_notifications;

pub struct Migrator;
#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_users::Migration),
            Box::new(m20250601_000002_employers_jobs::Migration),
            Box::new(m20250601_000003_candidate_relations::Migration),
            Box::new(m20250601_000004_sales_crm::Migration),
            Box::new(m20250601_000005_interviews::Migration),
            Box::new(m20250601_000006_notifications::Migration),
        ]
    }
}
