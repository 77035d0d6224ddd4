/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login, token refresh, password change
/// - `users`: Account creation and credential recovery (admin)
/// - `bills`: Billing lifecycle
/// - `complaints`: Complaint tracking
/// - `visitors`: Visitor log
/// - `notifications`: Broadcasts and read tracking
/// - `polls`: Polls and voting
/// - `admin`: Dashboard statistics and table browser

pub mod admin;
pub mod auth;
pub mod bills;
pub mod complaints;
pub mod health;
pub mod notifications;
pub mod polls;
pub mod users;
pub mod visitors;
