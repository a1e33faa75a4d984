pub mod assessment_service;
pub mod auth_service;
pub mod certificate_service;
pub mod payment_service;
pub mod progress_service;
pub mod session_service;
pub mod site_service;
