use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum EmployerProfile {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum Job {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum AvailabilitySlot {
    Table,
    Id,
    EmployerId,
    SlotDate,
    StartMinute,
    EndMinute,
    Timezone,
    MaxCandidates,
    BookedCount,
    IsAvailable,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum InterviewInvite {
    Table,
    Id,
    Token,
    JobId,
    CandidateName,
    CandidateEmail,
    ExpiresAt,
    UsedAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum InterviewBooking {
    Table,
    Id,
    SlotId,
    InviteId,
    CandidateName,
    CandidateEmail,
    Notes,
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
                    .table(AvailabilitySlot::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AvailabilitySlot::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(
                        ColumnDef::new(AvailabilitySlot::EmployerId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AvailabilitySlot::SlotDate).date().not_null())
                    .col(
                        ColumnDef::new(AvailabilitySlot::StartMinute)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AvailabilitySlot::EndMinute)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AvailabilitySlot::Timezone)
                            .string_len(64)
                            .not_null()
                            .default("America/New_York"),
                    )
                    .col(
                        ColumnDef::new(AvailabilitySlot::MaxCandidates)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(AvailabilitySlot::BookedCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(AvailabilitySlot::IsAvailable)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(AvailabilitySlot::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .col(
                        ColumnDef::new(AvailabilitySlot::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_availability_slot_employer")
                            .from(AvailabilitySlot::Table, AvailabilitySlot::EmployerId)
                            .to(EmployerProfile::Table, EmployerProfile::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Capacity invariant enforced at the schema level as well as by
        // the conditional booking update.
        manager
            .get_connection()
            .execute_unprepared(
                "ALTER TABLE availability_slot ADD CONSTRAINT chk_slot_capacity \
                 CHECK (booked_count >= 0 AND booked_count <= max_candidates);",
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_availability_slot_employer_date")
                    .table(AvailabilitySlot::Table)
                    .col(AvailabilitySlot::EmployerId)
                    .col(AvailabilitySlot::SlotDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InterviewInvite::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InterviewInvite::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(
                        ColumnDef::new(InterviewInvite::Token)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InterviewInvite::JobId).uuid().not_null())
                    .col(
                        ColumnDef::new(InterviewInvite::CandidateName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InterviewInvite::CandidateEmail)
                            .string_len(320)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InterviewInvite::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(InterviewInvite::UsedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(InterviewInvite::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_interview_invite_job")
                            .from(InterviewInvite::Table, InterviewInvite::JobId)
                            .to(Job::Table, Job::Id)
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
                    .name("idx_interview_invite_token")
                    .table(InterviewInvite::Table)
                    .col(InterviewInvite::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InterviewBooking::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InterviewBooking::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(InterviewBooking::SlotId).uuid().not_null())
                    .col(ColumnDef::new(InterviewBooking::InviteId).uuid().not_null())
                    .col(
                        ColumnDef::new(InterviewBooking::CandidateName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(InterviewBooking::CandidateEmail)
                            .string_len(320)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InterviewBooking::Notes).text())
                    .col(
                        ColumnDef::new(InterviewBooking::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_interview_booking_slot")
                            .from(InterviewBooking::Table, InterviewBooking::SlotId)
                            .to(AvailabilitySlot::Table, AvailabilitySlot::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_interview_booking_invite")
                            .from(InterviewBooking::Table, InterviewBooking::InviteId)
                            .to(InterviewInvite::Table, InterviewInvite::Id)
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
                    .name("idx_interview_booking_slot")
                    .table(InterviewBooking::Table)
                    .col(InterviewBooking::SlotId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_interview_booking_email")
                    .table(InterviewBooking::Table)
                    .col(InterviewBooking::CandidateEmail)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InterviewBooking::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InterviewInvite::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AvailabilitySlot::Table).to_owned())
            .await?;
        Ok(())
    }
}
