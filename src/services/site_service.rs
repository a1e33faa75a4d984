// src/services/site_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::{SiteRepository, SiteStores},
    models::site::{EXTERNAL_SITE_ID, Site},
};

/// Diretório de sites (tenants): os dois reservados + o catálogo de
/// filiais criadas por admins, que vive no banco administrativo.
#[derive(Clone)]
pub struct SiteService {
    stores: Arc<SiteStores>,
    site_repo: SiteRepository,
}

/// Slug de filial: minúsculas, dígitos e hífen, 2..=32. O id vira o nome
/// do banco físico, então é melhor ser rigoroso aqui.
pub fn is_valid_slug(id: &str) -> bool {
    (2..=32).contains(&id.len())
        && id.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        && !id.starts_with('-')
        && !id.ends_with('-')
}

impl SiteService {
    pub fn new(stores: Arc<SiteStores>, site_repo: SiteRepository) -> Self {
        Self { stores, site_repo }
    }

    /// Garante na inicialização que os bancos reservados existem e estão
    /// migrados. Idempotente.
    pub async fn ensure_reserved_stores(&self) -> Result<(), AppError> {
        // O banco administrativo precisa pré-existir (é para onde o
        // DATABASE_URL aponta as conexões de manutenção).
        let admin = self.stores.open(None).await?;

        let external_db = SiteStores::database_name(EXTERNAL_SITE_ID);
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM pg_database WHERE datname = $1)",
        )
        .bind(&external_db)
        .fetch_one(&admin)
        .await?;

        if exists {
            self.stores.open(Some(EXTERNAL_SITE_ID)).await?;
        } else {
            self.stores.create_store(EXTERNAL_SITE_ID).await?;
            tracing::info!("Banco do site externo criado");
        }
        Ok(())
    }

    /// Lista os sites válidos: reservados primeiro, depois o catálogo.
    pub async fn list_sites(&self) -> Result<Vec<Site>, AppError> {
        let admin = self.stores.open(None).await?;
        let mut sites = Site::reserved();
        sites.extend(self.site_repo.list(&admin).await?);
        Ok(sites)
    }

    pub async fn site_exists(&self, id: &str) -> Result<bool, AppError> {
        if Site::is_reserved(id) {
            return Ok(true);
        }
        let admin = self.stores.open(None).await?;
        Ok(self.site_repo.find_by_id(&admin, id).await?.is_some())
    }

    pub async fn create_site(&self, id: &str, name: &str) -> Result<Site, AppError> {
        if !is_valid_slug(id) {
            return Err(AppError::BadRequest(
                "O id da filial deve conter apenas letras minúsculas, dígitos e hífens.".into(),
            ));
        }

        // Colisão de id ou de nome (sem diferenciar maiúsculas) contra os
        // reservados E contra o catálogo.
        let collides_reserved = Site::reserved()
            .iter()
            .any(|s| s.id == id || s.name.eq_ignore_ascii_case(name));
        if collides_reserved {
            return Err(AppError::Conflict("Este id ou nome é reservado pelo sistema.".into()));
        }

        let admin = self.stores.open(None).await?;
        if self.site_repo.find_by_id(&admin, id).await?.is_some()
            || self.site_repo.name_exists(&admin, name).await?
        {
            return Err(AppError::Conflict("Já existe uma filial com este id ou nome.".into()));
        }

        let site = self.site_repo.insert(&admin, id, name).await?;

        // CREATE DATABASE não participa de transação; se falhar, desfaz a
        // linha do catálogo para não deixar uma filial sem banco.
        if let Err(e) = self.stores.create_store(id).await {
            tracing::error!(site = id, "Falha ao criar o banco da filial: {e:?}");
            self.site_repo.delete(&admin, id).await?;
            return Err(e);
        }

        Ok(site)
    }

    /// Apaga uma filial. O catálogo é a autoridade: a linha some sempre;
    /// um banco físico órfão é apenas logado como aviso.
    pub async fn delete_site(&self, id: &str) -> Result<(), AppError> {
        if Site::is_reserved(id) {
            return Err(AppError::Forbidden);
        }

        let admin = self.stores.open(None).await?;
        if !self.site_repo.delete(&admin, id).await? {
            return Err(AppError::NotFound("Filial não encontrada.".into()));
        }

        if let Err(e) = self.stores.drop_store(id).await {
            tracing::warn!(site = id, "Catálogo atualizado, mas o banco ficou órfão: {e:?}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_valido() {
        assert!(is_valid_slug("filial-sul"));
        assert!(is_valid_slug("branch2"));
    }

    #[test]
    fn slug_invalido() {
        assert!(!is_valid_slug("a"));
        assert!(!is_valid_slug("Filial"));
        assert!(!is_valid_slug("com espaço"));
        assert!(!is_valid_slug("-inicia-com-hifen"));
        assert!(!is_valid_slug("termina-"));
        assert!(!is_valid_slug("slug-exageradamente-longo-demais-para-um-id"));
    }

    #[test]
    fn reservados_nunca_colidem_com_slug_valido_do_catalogo() {
        for site in Site::reserved() {
            assert!(Site::is_reserved(&site.id));
        }
    }
}
