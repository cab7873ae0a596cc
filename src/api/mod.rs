pub mod course_plan;
pub mod health;
