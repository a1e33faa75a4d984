// src/services/progress_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{CourseRepository, ProgressRepository},
    models::{certificate::CertificateType, progress::LessonAdvance},
    services::certificate_service::CertificateService,
};

/// Sucessor de `current` na ordem total das aulas do curso. `None` quando
/// `current` é a última aula (ou nem está na sequência).
pub fn next_lesson_after(ordered: &[Uuid], current: Uuid) -> Option<Uuid> {
    let pos = ordered.iter().position(|id| *id == current)?;
    ordered.get(pos + 1).copied()
}

/// Desfecho da marcação de progresso de uma aula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Curso sem aulas: nenhuma conclusão é possível.
    NoLessons,
    /// Ainda há aulas pendentes.
    InProgress,
    /// Esta chamada levou o progresso a 100%: emite certificado.
    NewlyCompleted,
    /// O curso já estava 100% e a aula é repetida: não emite de novo.
    AlreadyCertified,
}

/// Decide o desfecho a partir dos contadores. `already_done` é o estado
/// da aula ANTES do upsert de progresso: é ele que mantém a conclusão
/// idempotente, sem certificado em dobro para chamadas repetidas.
pub fn completion_outcome(already_done: bool, completed: i64, total: i64) -> CompletionOutcome {
    if total == 0 {
        CompletionOutcome::NoLessons
    } else if completed < total {
        CompletionOutcome::InProgress
    } else if already_done {
        CompletionOutcome::AlreadyCertified
    } else {
        CompletionOutcome::NewlyCompleted
    }
}

#[derive(Clone)]
pub struct ProgressService {
    course_repo: CourseRepository,
    progress_repo: ProgressRepository,
    certificate_service: CertificateService,
}

impl ProgressService {
    pub fn new(
        course_repo: CourseRepository,
        progress_repo: ProgressRepository,
        certificate_service: CertificateService,
    ) -> Self {
        Self { course_repo, progress_repo, certificate_service }
    }

    /// Conclusão de aula, numa única transação: marca o progresso, decide
    /// se o curso fechou 100% e, nesse caso, emite o certificado com a
    /// fotografia dos signatários. Tudo ou nada.
    ///
    /// Reexecutar para uma aula já concluída é idempotente: não conta em
    /// dobro e não emite um segundo certificado.
    pub async fn complete_lesson(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
        lesson_id: Uuid,
    ) -> Result<LessonAdvance, AppError> {
        let mut tx = pool.begin().await?;

        if self.course_repo.find_by_id(&mut *tx, course_id).await?.is_none() {
            return Err(AppError::NotFound("Curso não encontrado.".into()));
        }
        if !self
            .course_repo
            .lesson_belongs_to_course(&mut *tx, lesson_id, course_id)
            .await?
        {
            return Err(AppError::NotFound("Aula não encontrada neste curso.".into()));
        }

        // 1. Contadores: total de aulas, estado prévio da aula, marcação,
        //    total concluído.
        let total = self.course_repo.count_lessons(&mut *tx, course_id).await?;
        let outcome = if total == 0 {
            completion_outcome(false, 0, 0)
        } else {
            let already_done =
                self.progress_repo.is_completed(&mut *tx, user_id, lesson_id).await?;
            self.progress_repo.mark_completed(&mut *tx, user_id, lesson_id).await?;
            let completed = self
                .progress_repo
                .count_completed_in_course(&mut *tx, user_id, course_id)
                .await?;
            completion_outcome(already_done, completed, total)
        };

        // 2. Age conforme o desfecho.
        let advance = match outcome {
            CompletionOutcome::NoLessons | CompletionOutcome::AlreadyCertified => {
                LessonAdvance { next_lesson_id: None, certificate_id: None }
            }
            CompletionOutcome::NewlyCompleted => {
                let certificate = self
                    .certificate_service
                    .issue(&mut *tx, user_id, Some(course_id), CertificateType::Completion, None)
                    .await?;
                tracing::info!(
                    user = %user_id,
                    course = %course_id,
                    number = %certificate.certificate_number,
                    "Certificado de conclusão emitido"
                );
                LessonAdvance { next_lesson_id: None, certificate_id: Some(certificate.id) }
            }
            CompletionOutcome::InProgress => {
                let ordered = self.course_repo.ordered_lesson_ids(&mut *tx, course_id).await?;
                LessonAdvance {
                    next_lesson_id: next_lesson_after(&ordered, lesson_id),
                    certificate_id: None,
                }
            }
        };

        tx.commit().await?;
        Ok(advance)
    }

    /// Reinício de treinamento de um aluno: apaga só o progresso. Os
    /// certificados ficam, pois são o histórico de cada conclusão.
    pub async fn retrain_user(
        &self,
        pool: &PgPool,
        user_id: Uuid,
        course_id: Uuid,
    ) -> Result<u64, AppError> {
        let removed = self
            .progress_repo
            .delete_for_user_in_course(pool, user_id, course_id)
            .await?;
        tracing::info!(user = %user_id, course = %course_id, removed, "Progresso resetado");
        Ok(removed)
    }

    /// Reinício da coorte: todos que já têm certificado de conclusão do
    /// curso voltam à estaca zero (do progresso, nunca dos certificados).
    pub async fn retrain_cohort(&self, pool: &PgPool, course_id: Uuid) -> Result<u64, AppError> {
        let removed = self.progress_repo.delete_for_certified_cohort(pool, course_id).await?;
        tracing::info!(course = %course_id, removed, "Progresso da coorte resetado");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(n: usize) -> Vec<Uuid> {
        (0..n).map(|_| Uuid::new_v4()).collect()
    }

    #[test]
    fn devolve_a_aula_seguinte_da_sequencia() {
        let ordered = ids(3);
        assert_eq!(next_lesson_after(&ordered, ordered[0]), Some(ordered[1]));
        assert_eq!(next_lesson_after(&ordered, ordered[1]), Some(ordered[2]));
    }

    #[test]
    fn ultima_aula_nao_tem_sucessora() {
        let ordered = ids(3);
        assert_eq!(next_lesson_after(&ordered, ordered[2]), None);
    }

    #[test]
    fn aula_fora_da_sequencia_nao_tem_sucessora() {
        let ordered = ids(2);
        assert_eq!(next_lesson_after(&ordered, Uuid::new_v4()), None);
    }

    #[test]
    fn sequencia_vazia() {
        assert_eq!(next_lesson_after(&[], Uuid::new_v4()), None);
    }

    #[test]
    fn fechar_100_pela_primeira_vez_emite_certificado() {
        assert_eq!(completion_outcome(false, 3, 3), CompletionOutcome::NewlyCompleted);
    }

    #[test]
    fn aula_repetida_com_curso_ja_fechado_nao_emite_de_novo() {
        // Mesmos contadores, mas a aula já estava concluída antes do
        // upsert: o certificado já saiu numa chamada anterior.
        assert_eq!(completion_outcome(true, 3, 3), CompletionOutcome::AlreadyCertified);
    }

    #[test]
    fn curso_incompleto_segue_em_andamento() {
        assert_eq!(completion_outcome(false, 2, 3), CompletionOutcome::InProgress);
        // Repetir uma aula no meio do curso também não fecha nada.
        assert_eq!(completion_outcome(true, 2, 3), CompletionOutcome::InProgress);
    }

    #[test]
    fn curso_sem_aulas_nao_tem_conclusao() {
        assert_eq!(completion_outcome(false, 0, 0), CompletionOutcome::NoLessons);
    }
}
