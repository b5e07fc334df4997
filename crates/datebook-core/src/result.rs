use crate::error::DatebookError;

pub type DatebookResult<T> = Result<T, DatebookError>;
