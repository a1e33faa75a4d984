// src/config.rs

use std::{env, sync::Arc};

use crate::{
    db::{
        AssessmentRepository, CertificateRepository, CourseRepository, ProgressRepository,
        SettingsRepository, SignatoryRepository, SiteRepository, SiteStores,
        TransactionRepository, UserRepository,
    },
    services::{
        assessment_service::AssessmentService,
        auth_service::AuthService,
        certificate_service::CertificateService,
        payment_service::{PaymentGateway, PaymentService},
        progress_service::ProgressService,
        session_service::SessionService,
        site_service::SiteService,
    },
};

#[derive(Clone)]
pub struct AppState {
    pub stores: Arc<SiteStores>,

    // Serviços de domínio, montados uma vez na inicialização.
    pub site_service: SiteService,
    pub session_service: SessionService,
    pub auth_service: AuthService,
    pub progress_service: ProgressService,
    pub certificate_service: CertificateService,
    pub assessment_service: AssessmentService,
    pub payment_service: PaymentService,

    // Repositórios usados direto por handlers simples (CRUD).
    pub user_repo: UserRepository,
    pub course_repo: CourseRepository,
    pub signatory_repo: SignatoryRepository,
    pub settings_repo: SettingsRepository,
    pub transaction_repo: TransactionRepository,

    pub seed_admin_username: String,
    pub seed_admin_password: String,
}

impl AppState {
    pub async fn new() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        // URL do SERVIDOR Postgres, sem o caminho do banco: cada site
        // tem o seu próprio banco físico (lms_<site>).
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL deve ser definida");
        let org_prefix = env::var("ORG_PREFIX").unwrap_or_else(|_| "LMS".to_string());

        let gateway_url = env::var("PAYMENT_GATEWAY_URL")
            .unwrap_or_else(|_| "https://api.paymongo.com/v1".to_string());
        let gateway_secret = env::var("PAYMENT_GATEWAY_SECRET").unwrap_or_default();
        if gateway_secret.is_empty() {
            tracing::warn!("PAYMENT_GATEWAY_SECRET não definida; confirmações do gateway vão falhar");
        }

        let seed_admin_username =
            env::var("SEED_ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
        let seed_admin_password =
            env::var("SEED_ADMIN_PASSWORD").unwrap_or_else(|_| "changeme123".to_string());

        let stores = Arc::new(SiteStores::new(database_url));

        // --- Monta o gráfico de dependências ---
        let site_repo = SiteRepository;
        let user_repo = UserRepository;
        let course_repo = CourseRepository;
        let progress_repo = ProgressRepository;
        let signatory_repo = SignatoryRepository;
        let certificate_repo = CertificateRepository;
        let assessment_repo = AssessmentRepository;
        let transaction_repo = TransactionRepository;
        let settings_repo = SettingsRepository;

        let site_service = SiteService::new(stores.clone(), site_repo.clone());
        let session_service =
            SessionService::new(stores.clone(), site_service.clone(), user_repo.clone());
        let auth_service = AuthService::new(stores.clone(), user_repo.clone());
        let certificate_service = CertificateService::new(
            certificate_repo.clone(),
            signatory_repo.clone(),
            org_prefix,
        );
        let progress_service = ProgressService::new(
            course_repo.clone(),
            progress_repo.clone(),
            certificate_service.clone(),
        );
        let assessment_service = AssessmentService::new(
            course_repo.clone(),
            assessment_repo.clone(),
            transaction_repo.clone(),
        );
        let gateway = PaymentGateway::new(gateway_url, gateway_secret);
        let payment_service = PaymentService::new(
            stores.clone(),
            gateway,
            transaction_repo.clone(),
            course_repo.clone(),
        );

        Ok(Self {
            stores,
            site_service,
            session_service,
            auth_service,
            progress_service,
            certificate_service,
            assessment_service,
            payment_service,
            user_repo,
            course_repo,
            signatory_repo,
            settings_repo,
            transaction_repo,
            seed_admin_username,
            seed_admin_password,
        })
    }
}
