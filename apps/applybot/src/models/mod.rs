pub mod job;
pub mod resume;

pub use job::{JobPosting, JobSource};
pub use resume::ResumeProfile;
