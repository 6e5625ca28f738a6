//! Demo dataset for local development: an admin, an approved San
//! Francisco employer with open jobs, a candidate, and a recruitment
//! partner with a small client book.

use anyhow::Context;
use argon2::password_hash::{rand_core::OsRng, PasswordHasher, SaltString};
use argon2::Argon2;
use chrono::{Duration, NaiveDate, Utc};
use entity::{availability_slot, employer_profile, job, sales_client, user, user_secret};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use tracing::info;
use uuid::Uuid;

const SEED_PASSWORD: &str = "talenthub";

pub async fn run(db: &DatabaseConnection) -> anyhow::Result<()> {
    if user::Entity::find()
        .filter(user::Column::Email.eq("admin@talenthub.test"))
        .one(db)
        .await?
        .is_some()
    {
        info!("seed data already present, skipping");
        return Ok(());
    }

    let admin = insert_user(db, "admin@talenthub.test", "Admin", user::Role::Admin).await?;
    let employer_user =
        insert_user(db, "employer@talenthub.test", "Pat Reyes", user::Role::Employer).await?;
    insert_user(db, "candidate@talenthub.test", "Sam Okafor", user::Role::Candidate).await?;
    let partner = insert_user(
        db,
        "partner@talenthub.test",
        "Lee Tran",
        user::Role::RecruitmentPartner,
    )
    .await?;

    let now = Utc::now();
    let employer = employer_profile::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(employer_user.id),
        company_name: Set("Golden Gate Staffing".into()),
        industry: Set(Some("Hospitality".into())),
        website: Set(None),
        phone: Set(Some("415-555-0101".into())),
        address_line1: Set(Some("1 Market St".into())),
        city: Set(Some("San Francisco".into())),
        state: Set(Some("CA".into())),
        zip_code: Set(Some("94102".into())),
        country: Set("United States".into()),
        latitude: Set(Some(37.7813)),
        longitude: Set(Some(-122.4167)),
        is_approved: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;

    for (title, job_type, min, max) in [
        ("Line Cook", job::JobType::FullTime, 4200_00i64, 5200_00i64),
        ("Front Desk Associate", job::JobType::PartTime, 2100_00, 2600_00),
        ("Event Server", job::JobType::Temporary, 25_00, 32_00),
    ] {
        job::ActiveModel {
            id: Set(Uuid::new_v4()),
            employer_id: Set(employer.id),
            title: Set(title.into()),
            description: Set(Some(format!("{title} role in downtown San Francisco."))),
            job_type: Set(job_type),
            status: Set(job::Status::Open),
            city: Set(Some("San Francisco".into())),
            state: Set(Some("CA".into())),
            zip_code: Set(Some("94102".into())),
            latitude: Set(Some(37.7813)),
            longitude: Set(Some(-122.4167)),
            salary_min_cents: Set(Some(min)),
            salary_max_cents: Set(Some(max)),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;
    }

    let next_week = (now + Duration::days(7)).date_naive();
    insert_slot(db, employer.id, next_week, 9 * 60, 9 * 60 + 30).await?;
    insert_slot(db, employer.id, next_week, 10 * 60, 10 * 60 + 30).await?;

    for (company, contact, status) in [
        ("Bayview Bistro", "Morgan Liu", sales_client::CallStatus::NotCalled),
        ("Mission Cleaners", "Ana Ortiz", sales_client::CallStatus::Called),
        ("Sunset Catering", "Dev Patel", sales_client::CallStatus::Completed),
    ] {
        sales_client::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(partner.id),
            company_name: Set(company.into()),
            contact_name: Set(Some(contact.into())),
            email: Set(None),
            phone: Set(None),
            address_line1: Set(None),
            city: Set(Some("San Francisco".into())),
            state: Set(Some("CA".into())),
            zip_code: Set(None),
            call_status: Set(status),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        }
        .insert(db)
        .await?;
    }

    info!(admin = %admin.email, password = SEED_PASSWORD, "seed data created");
    Ok(())
}

async fn insert_user(
    db: &DatabaseConnection,
    email: &str,
    name: &str,
    role: user::Role,
) -> anyhow::Result<user::Model> {
    let now = Utc::now();
    let record = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email.into()),
        display_name: Set(name.into()),
        phone: Set(None),
        role: Set(role),
        is_active: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(SEED_PASSWORD.as_bytes(), &salt)
        .map_err(|err| anyhow::anyhow!("password hash failed: {err}"))
        .context(email.to_string())?;
    user_secret::ActiveModel {
        user_id: Set(record.id),
        password_hash: Set(hash.to_string()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?;
    Ok(record)
}

async fn insert_slot(
    db: &DatabaseConnection,
    employer_id: Uuid,
    date: NaiveDate,
    start_minute: i32,
    end_minute: i32,
) -> anyhow::Result<availability_slot::Model> {
    let now = Utc::now();
    Ok(availability_slot::ActiveModel {
        id: Set(Uuid::new_v4()),
        employer_id: Set(employer_id),
        slot_date: Set(date),
        start_minute: Set(start_minute),
        end_minute: Set(end_minute),
        timezone: Set("America/Los_Angeles".into()),
        max_candidates: Set(2),
        booked_count: Set(0),
        is_available: Set(true),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    }
    .insert(db)
    .await?)
}
