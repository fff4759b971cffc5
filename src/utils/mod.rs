//! Small helpers shared by the reports and the progress output

pub mod string;
