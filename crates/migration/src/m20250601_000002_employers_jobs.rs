use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum EmployerProfile {
    Table,
    Id,
    UserId,
    CompanyName,
    Industry,
    Website,
    Phone,
    AddressLine1,
    City,
    State,
    ZipCode,
    Country,
    Latitude,
    Longitude,
    IsApproved,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Job {
    Table,
    Id,
    EmployerId,
    Title,
    Description,
    JobType,
    Status,
    City,
    State,
    ZipCode,
    Latitude,
    Longitude,
    SalaryMinCents,
    SalaryMaxCents,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EmployerProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmployerProfile::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(EmployerProfile::UserId).uuid().not_null())
                    .col(
                        ColumnDef::new(EmployerProfile::CompanyName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(EmployerProfile::Industry).string_len(128))
                    .col(ColumnDef::new(EmployerProfile::Website).string_len(512))
                    .col(ColumnDef::new(EmployerProfile::Phone).string_len(32))
                    .col(ColumnDef::new(EmployerProfile::AddressLine1).string_len(256))
                    .col(ColumnDef::new(EmployerProfile::City).string_len(128))
                    .col(ColumnDef::new(EmployerProfile::State).string_len(64))
                    .col(ColumnDef::new(EmployerProfile::ZipCode).string_len(10))
                    .col(
                        ColumnDef::new(EmployerProfile::Country)
                            .string_len(64)
                            .not_null()
                            .default("US"),
                    )
                    .col(ColumnDef::new(EmployerProfile::Latitude).double())
                    .col(ColumnDef::new(EmployerProfile::Longitude).double())
                    .col(
                        ColumnDef::new(EmployerProfile::IsApproved)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EmployerProfile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .col(
                        ColumnDef::new(EmployerProfile::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_employer_profile_user")
                            .from(EmployerProfile::Table, EmployerProfile::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employer_profile_user")
                    .table(EmployerProfile::Table)
                    .col(EmployerProfile::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_employer_profile_zip")
                    .table(EmployerProfile::Table)
                    .col(EmployerProfile::ZipCode)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Job::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Job::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(Job::EmployerId).uuid().not_null())
                    .col(ColumnDef::new(Job::Title).string_len(300).not_null())
                    .col(ColumnDef::new(Job::Description).text())
                    .col(ColumnDef::new(Job::JobType).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Job::Status)
                            .string_len(32)
                            .not_null()
                            .default("OPEN"),
                    )
                    .col(ColumnDef::new(Job::City).string_len(128))
                    .col(ColumnDef::new(Job::State).string_len(64))
                    .col(ColumnDef::new(Job::ZipCode).string_len(10))
                    .col(ColumnDef::new(Job::Latitude).double())
                    .col(ColumnDef::new(Job::Longitude).double())
                    .col(ColumnDef::new(Job::SalaryMinCents).big_integer())
                    .col(ColumnDef::new(Job::SalaryMaxCents).big_integer())
                    .col(
                        ColumnDef::new(Job::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .col(
                        ColumnDef::new(Job::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_employer")
                            .from(Job::Table, Job::EmployerId)
                            .to(EmployerProfile::Table, EmployerProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_job_employer")
                    .table(Job::Table)
                    .col(Job::EmployerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_job_status")
                    .table(Job::Table)
                    .col(Job::Status)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_job_zip")
                    .table(Job::Table)
                    .col(Job::ZipCode)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Job::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmployerProfile::Table).to_owned())
            .await?;
        Ok(())
    }
}
