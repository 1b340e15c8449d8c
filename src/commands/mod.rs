pub mod github;
pub mod music;
pub mod radio;
pub mod tickets;
