use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Secret,
    EmployerProfile,
    Notification,
    Application,
    SavedJob,
    SalesClient,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Secret => Entity::has_one(super::user_secret::Entity).into(),
            Relation::EmployerProfile => Entity::has_one(super::employer_profile::Entity).into(),
            Relation::Notification => Entity::has_many(super::notification::Entity).into(),
            Relation::Application => Entity::has_many(super::application::Entity).into(),
            Relation::SavedJob => Entity::has_many(super::saved_job::Entity).into(),
            Relation::SalesClient => Entity::has_many(super::sales_client::Entity).into(),
        }
    }
}

impl Related<super::user_secret::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Secret.def()
    }
}

impl Related<super::employer_profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EmployerProfile.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notification.def()
    }
}

/// Platform role. Every role check matches exhaustively; there is no
/// catch-all fallback that could silently swallow a new variant.
#[derive(Copy, Clone, Debug, EnumIter, DeriveActiveEnum, Eq, PartialEq)]
#[sea_orm(rs_type = "String", db_type = "String(Some(32))")]
pub enum Role {
    #[sea_orm(string_value = "EMPLOYER")]
    Employer,
    #[sea_orm(string_value = "RECRUITMENT_PARTNER")]
    RecruitmentPartner,
    #[sea_orm(string_value = "ADMIN")]
    Admin,
    #[sea_orm(string_value = "SUB_ADMIN")]
    SubAdmin,
    #[sea_orm(string_value = "CANDIDATE")]
    Candidate,
}

impl ActiveModelBehavior for ActiveModel {}
