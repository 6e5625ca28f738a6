use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "interview_booking")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub slot_id: Uuid,
    #[sea_orm(indexed)]
    pub invite_id: Uuid,
    pub candidate_name: String,
    #[sea_orm(indexed)]
    pub candidate_email: String,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::availability_slot::Entity",
        from = "Column::SlotId",
        to = "super::availability_slot::Column::Id",
        on_delete = "Cascade"
    )]
    Slot,
    #[sea_orm(
        belongs_to = "super::interview_invite::Entity",
        from = "Column::InviteId",
        to = "super::interview_invite::Column::Id",
        on_delete = "Cascade"
    )]
    Invite,
}

impl Related<super::availability_slot::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Slot.def()
    }
}

impl Related<super::interview_invite::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invite.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
