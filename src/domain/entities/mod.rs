pub mod about;
pub mod admin;
pub mod experience;
pub mod fields;
pub mod option_fields;
pub mod project;
pub mod skill;
pub mod token;
pub mod upload;
pub mod visitor;
