pub(crate) mod auth;
pub(crate) mod catalog;
pub(crate) mod errors;
pub(crate) mod files;
pub(crate) mod guards;
pub(crate) mod handlers;
pub(crate) mod imports;
pub(crate) mod news;
pub(crate) mod records;
pub(crate) mod router;
pub(crate) mod students;
pub(crate) mod upload;
pub(crate) mod validation;
