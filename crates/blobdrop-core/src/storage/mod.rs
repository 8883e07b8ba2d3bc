//! Destination file lifecycle for saved downloads.
//!
//! Bytes go to a uniquely named hidden temp file in the destination directory
//! (preallocated with fallocate on Linux when available), are optionally
//! fsynced, then renamed onto a destination that was reserved beforehand.

mod part;

pub use part::PartFile;
