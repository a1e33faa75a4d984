pub mod stores;
pub use stores::SiteStores;
pub mod site_repo;
pub use site_repo::SiteRepository;
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod course_repo;
pub use course_repo::CourseRepository;
pub mod progress_repo;
pub use progress_repo::ProgressRepository;
pub mod signatory_repo;
pub use signatory_repo::SignatoryRepository;
pub mod certificate_repo;
pub use certificate_repo::CertificateRepository;
pub mod assessment_repo;
pub use assessment_repo::AssessmentRepository;
pub mod transaction_repo;
pub use transaction_repo::TransactionRepository;
pub mod settings_repo;
pub use settings_repo::SettingsRepository;
