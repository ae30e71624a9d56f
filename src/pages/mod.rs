pub mod analysis_output;
pub mod home;
pub mod not_found;
