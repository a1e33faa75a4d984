// src/services/session_service.rs

use std::sync::Arc;
use uuid::Uuid;

use crate::{
    db::{SiteStores, UserRepository},
    models::{
        auth::{Role, SessionUser},
        site::ADMIN_SITE_ID,
    },
    services::site_service::SiteService,
};

/// Resolve a identidade da sessão uma vez por requisição, a partir dos
/// dois cookies opacos (id do usuário + id do site). O resultado é um
/// valor imutável carregado nas extensions da requisição.
#[derive(Clone)]
pub struct SessionService {
    stores: Arc<SiteStores>,
    site_service: SiteService,
    user_repo: UserRepository,
}

/// Super admin é quem está no site administrativo COM papel de admin.
fn grants_super_admin(home_site: &str, role: Role) -> bool {
    home_site == ADMIN_SITE_ID && role == Role::Admin
}

impl SessionService {
    pub fn new(
        stores: Arc<SiteStores>,
        site_service: SiteService,
        user_repo: UserRepository,
    ) -> Self {
        Self { stores, site_service, user_repo }
    }

    /// Resolução da sessão. Retorna `None` (anônimo) para tokens ausentes
    /// ou malformados, site desconhecido, usuário inexistente E para
    /// qualquer erro de banco. A resolução falha sempre fechada.
    pub async fn resolve(
        &self,
        user_token: Option<&str>,
        site_token: Option<&str>,
    ) -> Option<SessionUser> {
        let user_id = Uuid::parse_str(user_token?).ok()?;
        let site_id = site_token?;

        match self.try_resolve(user_id, site_id).await {
            Ok(session) => session,
            Err(e) => {
                // Nunca "falhar aberto": erro de infraestrutura vira anônimo.
                tracing::warn!(site = site_id, "Falha ao resolver sessão: {e:?}");
                None
            }
        }
    }

    async fn try_resolve(
        &self,
        user_id: Uuid,
        site_id: &str,
    ) -> Result<Option<SessionUser>, crate::common::error::AppError> {
        // O id do site vem de fora: valida contra o diretório antes de
        // abrir qualquer banco.
        if !self.site_service.site_exists(site_id).await? {
            return Ok(None);
        }

        // 1. Procura o usuário no site reivindicado.
        let pool = self.stores.open(Some(site_id)).await?;
        if let Some(user) = self.user_repo.find_by_id(&pool, user_id).await? {
            let is_super_admin = grants_super_admin(site_id, user.role);
            return Ok(Some(SessionUser {
                user,
                site_id: site_id.to_string(),
                is_super_admin,
            }));
        }

        // 2. Fallback: um super admin só existe como linha no site
        //    administrativo, mas pode "entrar" no contexto de qualquer
        //    filial mantendo a própria identidade.
        if site_id != ADMIN_SITE_ID {
            let admin_pool = self.stores.open(None).await?;
            if let Some(admin) = self.user_repo.find_admin_by_id(&admin_pool, user_id).await? {
                return Ok(Some(SessionUser {
                    user: admin,
                    site_id: site_id.to_string(),
                    is_super_admin: true,
                }));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_do_site_principal_e_super_admin() {
        assert!(grants_super_admin(ADMIN_SITE_ID, Role::Admin));
    }

    #[test]
    fn funcionario_do_site_principal_nao_e_super_admin() {
        assert!(!grants_super_admin(ADMIN_SITE_ID, Role::Employee));
    }

    #[test]
    fn admin_de_filial_nao_e_super_admin() {
        assert!(!grants_super_admin("branch-sul", Role::Admin));
    }
}
