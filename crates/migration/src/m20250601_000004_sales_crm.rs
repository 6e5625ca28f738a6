use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum User {
    Table,
    Id,
}

#[derive(DeriveIden)]
enum SalesClient {
    Table,
    Id,
    OwnerId,
    CompanyName,
    ContactName,
    Email,
    Phone,
    AddressLine1,
    City,
    State,
    ZipCode,
    CallStatus,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ClientRemark {
    Table,
    Id,
    ClientId,
    AuthorName,
    Message,
    Category,
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
                    .table(SalesClient::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SalesClient::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(SalesClient::OwnerId).uuid().not_null())
                    .col(
                        ColumnDef::new(SalesClient::CompanyName)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(ColumnDef::new(SalesClient::ContactName).string_len(128))
                    .col(ColumnDef::new(SalesClient::Email).string_len(320))
                    .col(ColumnDef::new(SalesClient::Phone).string_len(32))
                    .col(ColumnDef::new(SalesClient::AddressLine1).string_len(256))
                    .col(ColumnDef::new(SalesClient::City).string_len(128))
                    .col(ColumnDef::new(SalesClient::State).string_len(64))
                    .col(ColumnDef::new(SalesClient::ZipCode).string_len(10))
                    .col(
                        ColumnDef::new(SalesClient::CallStatus)
                            .string_len(32)
                            .not_null()
                            .default("NOT_CALLED"),
                    )
                    .col(
                        ColumnDef::new(SalesClient::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .col(
                        ColumnDef::new(SalesClient::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_sales_client_owner")
                            .from(SalesClient::Table, SalesClient::OwnerId)
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
                    .name("idx_sales_client_owner")
                    .table(SalesClient::Table)
                    .col(SalesClient::OwnerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_sales_client_call_status")
                    .table(SalesClient::Table)
                    .col(SalesClient::CallStatus)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClientRemark::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ClientRemark::Id)
                            .uuid()
                            .not_null()
                            .primary_key()
                            .default(Expr::cust("gen_random_uuid()")),
                    )
                    .col(ColumnDef::new(ClientRemark::ClientId).uuid().not_null())
                    .col(
                        ColumnDef::new(ClientRemark::AuthorName)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ClientRemark::Message).text().not_null())
                    .col(
                        ColumnDef::new(ClientRemark::Category)
                            .string_len(32)
                            .not_null()
                            .default("GENERAL"),
                    )
                    .col(
                        ColumnDef::new(ClientRemark::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::cust("now()")),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_client_remark_client")
                            .from(ClientRemark::Table, ClientRemark::ClientId)
                            .to(SalesClient::Table, SalesClient::Id)
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
                    .name("idx_client_remark_client")
                    .table(ClientRemark::Table)
                    .col(ClientRemark::ClientId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ClientRemark::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(SalesClient::Table).to_owned())
            .await?;
        Ok(())
    }
}
