//! Tutor Scheduler - tutoring session scheduling service
//!
//! Tutors post sessions, students register for them or ask for topics that
//! no session covers yet, and tutors turn those requests into sessions.
//! The engine keeps every tutor's and student's calendar free of overlaps
//! unless the caller explicitly overrides, and keeps an audit trail of
//! session edits and registration cancellations.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
