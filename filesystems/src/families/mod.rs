// Filesystem Families Organization
// Groups related filesystems together for code reuse and better organization

pub mod ext;
pub mod fat;
