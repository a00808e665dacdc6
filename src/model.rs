//! Records exchanged with the LMS and with dashboard clients.
//!
//! Upstream JSON is decoded into these types exactly once, inside the Canvas
//! client. Anything that does not fit the schema is rejected there.

pub mod assignment;
pub mod assignment_with_course;
pub mod course;
pub mod error_body;
pub mod simple_response;
pub mod submission;
