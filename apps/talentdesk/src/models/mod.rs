pub mod candidate;
pub mod resume_file;
pub mod roster;

pub use candidate::{
    Candidate, CandidateProfile, CandidateStatus, CandidateUpdate, NewCandidate, Reference,
};
pub use resume_file::ResumeFile;
pub use roster::{RosterPage, RosterQuery, Scope};
