use sea_orm::entity::prelude::*;

/// Employer-declared bookable time window. Times are minutes since
/// midnight in the slot's own timezone; `booked_count` never exceeds
/// `max_candidates`.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "availability_slot")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(indexed)]
    pub employer_id: Uuid,
    pub slot_date: Date,
    pub start_minute: i32,
    pub end_minute: i32,
    pub timezone: String,
    pub max_candidates: i32,
    pub booked_count: i32,
    pub is_available: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::employer_profile::Entity",
        from = "Column::EmployerId",
        to = "super::employer_profile::Column::Id",
        on_delete = "Cascade"
    )]
    Employer,
    #[sea_orm(has_many = "super::interview_booking::Entity")]
    Booking,
}

impl Related<super::employer_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employer.def()
    }
}

impl Related<super::interview_booking::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Booking.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
