pub mod application;
pub mod availability_slot;
pub mod client_remark;
pub mod employer_profile;
pub mod interview_booking;
pub mod interview_invite;
pub mod job;
pub mod notification;
pub mod sales_client;
pub mod saved_job;
pub mod user;
pub mod user_secret;
