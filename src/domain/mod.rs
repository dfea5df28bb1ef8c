// Domain layer - Job model, validation rules and errors

pub mod errors;
pub mod model;
pub mod rules;
