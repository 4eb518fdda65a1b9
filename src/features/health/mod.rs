//! Liveness check backed by a database round-trip.
//!
//! | Method | Endpoint | Description |
//! |--------|----------|-------------|
//! | GET | `/api/health` | `SELECT 1` against the scan store |

pub mod dtos;
pub mod handlers;
pub mod routes;
