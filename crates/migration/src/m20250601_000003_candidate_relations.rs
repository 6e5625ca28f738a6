use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Job {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Application {
    Table,
    Id,
    JobId,
    CandidateId,
    Status,
    ResumePath,
    Note,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum SavedJob {
    Table,
    JobId,
    CandidateId,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Application::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Application::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Application::JobId).uuid().not_null())
                    .col(ColumnDef::new(Application::CandidateId).uuid().not_null())
                    .col(
                        ColumnDef::new(Application::Status)
                            .string_len(32)
                            .not_null()
                            .default("SUBMITTED"),
                    )
                    .col(ColumnDef::new(Application::ResumePath).string_len(512))
                    .col(ColumnDef::new(Application::Note).text())
                    .col(
                        ColumnDef::new(Application::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .col(
                        ColumnDef::new(Application::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_job")
                            .from(Application::Table, Application::JobId)
                            .to(Job::Table, Job::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_candidate")
                            .from(Application::Table, Application::CandidateId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // One application per candidate per job.
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_application_job_candidate")
                    .table(Application::Table)
                    .col(Application::JobId)
                    .col(Application::CandidateId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(SavedJob::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(SavedJob::JobId).uuid().not_null())
                    .col(ColumnDef::new(SavedJob::CandidateId).uuid().not_null())
                    .col(
                        ColumnDef::new(SavedJob::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .primary_key(
                        Index::create()
                            .col(SavedJob::JobId)
                            .col(SavedJob::CandidateId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_job_job")
                            .from(SavedJob::Table, SavedJob::JobId)
                            .to(Job::Table, Job::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_saved_job_candidate")
                            .from(SavedJob::Table, SavedJob::CandidateId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SavedJob::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Application::Table).to_owned())
            .await?;
        Ok(())
    }
}
