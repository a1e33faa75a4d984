pub mod assessment;
pub mod auth;
pub mod certificate;
pub mod course;
pub mod payment;
pub mod progress;
pub mod settings;
pub mod site;
