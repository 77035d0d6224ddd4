/// Database models for SocietySync
///
/// Each model owns its CRUD operations and any business logic tied to its
/// lifecycle. Every read hits the store directly; there is no in-memory
/// caching layer.
///
/// # Models
///
/// - `user`: User accounts, credential issuing, authentication
/// - `owner`: Owner profile extension (1:1 with a user)
/// - `tenant`: Tenant profile extension (1:1 with a user, references an owner)
/// - `bill`: Bill lifecycle (pending → paid/overdue) and payment analytics
/// - `complaint`: Complaint tracking with admin responses
/// - `visitor`: Visitor entry/exit log
/// - `notification`: Broadcast notifications with per-user read tracking
/// - `poll`: Polls, options, votes, and ranked results
/// - `stats`: Society-wide dashboard aggregates

pub mod bill;
pub mod complaint;
pub mod notification;
pub mod owner;
pub mod poll;
pub mod stats;
pub mod tenant;
pub mod user;
pub mod visitor;
