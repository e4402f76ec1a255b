//! Client side of the service: the HTTP API client plus the table and
//! selection state a front end keeps between calls.

pub mod api;
pub mod notice;
pub mod process;
pub mod rows;
pub mod selection;
pub mod state;

pub use api::{ApiClient, ClientError};
pub use notice::{Notice, NoticeLevel};
pub use selection::{ActionAvailability, FileStatus, Selection, StatusBoard};
