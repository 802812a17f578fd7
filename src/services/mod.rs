pub(crate) mod authorization;
pub(crate) mod deletion_requests;
pub(crate) mod grading;
pub(crate) mod imports;
pub(crate) mod spreadsheet;
pub(crate) mod storage;
