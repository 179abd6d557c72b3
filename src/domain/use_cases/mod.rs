pub mod about;
pub mod auth;
pub mod experience;
pub mod extractors;
pub mod media;
pub mod projects;
pub mod skills;
pub mod visitors;
