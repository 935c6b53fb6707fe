//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own session storage and session-state resolution so route
//! handlers can stay focused on extraction, cookies and status codes.

pub mod session;
pub mod session_info;
