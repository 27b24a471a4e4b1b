pub mod grades;
pub mod homework;
pub mod schedule;
pub mod subjects;
