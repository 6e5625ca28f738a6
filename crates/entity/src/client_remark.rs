use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "client_remark")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub client_id: Uuid,
    pub author_name: String,
    pub message: String,
    pub category: Category,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::sales_client::Entity",
        from = "Column::ClientId",
        to = "super::sales_client::Column::Id",
        on_delete = "Cascade"
    )]
    Client,
}

impl Related<super::sales_client::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Client.def()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum Category {
    #[sea_orm(string_value = "GENERAL")]
    General,
    #[sea_orm(string_value = "FOLLOW_UP")]
    FollowUp,
    #[sea_orm(string_value = "COMPLAINT")]
    Complaint,
    #[sea_orm(string_value = "INTEREST")]
    Interest,
}

impl ActiveModelBehavior for ActiveModel {}
