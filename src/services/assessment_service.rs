// src/services/assessment_service.rs

use sqlx::PgPool;
use std::collections::HashMap;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{AssessmentRepository, CourseRepository, TransactionRepository},
    models::{
        assessment::GradeResult,
        auth::{SessionUser, UserType},
        course::{AssessmentQuestion, Course, LessonType, StudentQuestion, strip_answer_key},
        payment::TransactionStatus,
    },
};

/// Nota de corte padrão quando o curso não define uma.
pub const DEFAULT_PASSING_RATE: i32 = 80;

/// Índice da opção correta da questão (a primeira marcada, se houver).
pub fn correct_index(question: &AssessmentQuestion) -> Option<usize> {
    question.options.iter().position(|o| o.is_correct)
}

/// Correção determinística contra o gabarito armazenado. Respostas
/// ausentes ou com índice fora do intervalo simplesmente não pontuam:
/// sem crédito parcial e sem erro. A nota NUNCA vem do cliente.
pub fn grade_answers(
    questions: &[AssessmentQuestion],
    answers: &HashMap<usize, usize>,
    passing_rate: i32,
) -> GradeResult {
    let total = questions.len() as i32;
    let mut score = 0;
    for (index, question) in questions.iter().enumerate() {
        if let (Some(correct), Some(selected)) = (correct_index(question), answers.get(&index)) {
            if *selected == correct {
                score += 1;
            }
        }
    }

    // (score/total)*100 >= rate, em aritmética inteira para não depender
    // de arredondamento de float.
    let passed = total > 0 && score * 100 >= passing_rate * total;
    GradeResult { score, total, passed }
}

#[derive(Clone)]
pub struct AssessmentService {
    course_repo: CourseRepository,
    assessment_repo: AssessmentRepository,
    transaction_repo: TransactionRepository,
}

impl AssessmentService {
    pub fn new(
        course_repo: CourseRepository,
        assessment_repo: AssessmentRepository,
        transaction_repo: TransactionRepository,
    ) -> Self {
        Self { course_repo, assessment_repo, transaction_repo }
    }

    async fn load_course(&self, pool: &PgPool, course_id: Uuid) -> Result<Course, AppError> {
        self.course_repo
            .find_by_id(pool, course_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Curso não encontrado.".into()))
    }

    /// Acesso à avaliação: matrícula OU (para externos) uma transação
    /// pendente ou concluída OU papel de admin. Transação rejeitada não
    /// dá acesso.
    async fn verify_access(
        &self,
        pool: &PgPool,
        session: &SessionUser,
        course_id: Uuid,
    ) -> Result<(), AppError> {
        if session.is_admin() {
            return Ok(());
        }
        if self.transaction_repo.is_enrolled(pool, session.user.id, course_id).await? {
            return Ok(());
        }
        if session.user.user_type == UserType::External {
            let transaction = self
                .transaction_repo
                .find_non_failed(pool, session.user.id, course_id)
                .await?;
            if transaction.is_some_and(|t| {
                matches!(t.status, TransactionStatus::Pending | TransactionStatus::Completed)
            }) {
                return Ok(());
            }
        }
        Err(AppError::Forbidden)
    }

    /// Projeção do pré-teste para o aluno: sem o gabarito.
    pub async fn pre_test_for_student(
        &self,
        pool: &PgPool,
        session: &SessionUser,
        course_id: Uuid,
    ) -> Result<Vec<StudentQuestion>, AppError> {
        self.verify_access(pool, session, course_id).await?;
        let course = self.load_course(pool, course_id).await?;
        let content = course
            .pre_test_content
            .ok_or_else(|| AppError::NotFound("Este curso não tem pré-teste.".into()))?;
        Ok(strip_answer_key(&content.0))
    }

    pub async fn final_assessment_for_student(
        &self,
        pool: &PgPool,
        session: &SessionUser,
        course_id: Uuid,
    ) -> Result<Vec<StudentQuestion>, AppError> {
        self.verify_access(pool, session, course_id).await?;
        let course = self.load_course(pool, course_id).await?;
        let content = course
            .final_assessment_content
            .ok_or_else(|| AppError::NotFound("Este curso não tem avaliação final.".into()))?;
        Ok(strip_answer_key(&content.0))
    }

    /// Pré-teste: exatamente uma tentativa por (usuário, curso), para
    /// sempre.
    pub async fn submit_pre_test(
        &self,
        pool: &PgPool,
        session: &SessionUser,
        course_id: Uuid,
        answers: &HashMap<usize, usize>,
    ) -> Result<GradeResult, AppError> {
        self.verify_access(pool, session, course_id).await?;
        let course = self.load_course(pool, course_id).await?;
        let content = course
            .pre_test_content
            .ok_or_else(|| AppError::NotFound("Este curso não tem pré-teste.".into()))?;

        if self
            .assessment_repo
            .has_pre_test_attempt(pool, session.user.id, course_id)
            .await?
        {
            return Err(AppError::Conflict("O pré-teste só pode ser feito uma vez.".into()));
        }

        let rate = course.passing_rate.unwrap_or(DEFAULT_PASSING_RATE);
        let grade = grade_answers(&content.0, answers, rate);

        let mut tx = pool.begin().await?;
        self.assessment_repo
            .insert_pre_test_attempt(&mut *tx, session.user.id, course_id, grade)
            .await?;
        tx.commit().await?;
        Ok(grade)
    }

    /// Avaliação final: tentativas limitadas por `max_attempts` (sem
    /// limite quando o curso não define um).
    pub async fn submit_final_assessment(
        &self,
        pool: &PgPool,
        session: &SessionUser,
        course_id: Uuid,
        answers: &HashMap<usize, usize>,
    ) -> Result<GradeResult, AppError> {
        self.verify_access(pool, session, course_id).await?;
        let course = self.load_course(pool, course_id).await?;
        let content = course
            .final_assessment_content
            .ok_or_else(|| AppError::NotFound("Este curso não tem avaliação final.".into()))?;

        if let Some(max) = course.max_attempts {
            let attempts = self
                .assessment_repo
                .count_final_attempts(pool, session.user.id, course_id)
                .await?;
            if attempts >= max as i64 {
                return Err(AppError::Conflict("Limite de tentativas atingido.".into()));
            }
        }

        let rate = course.passing_rate.unwrap_or(DEFAULT_PASSING_RATE);
        let grade = grade_answers(&content.0, answers, rate);

        let mut tx = pool.begin().await?;
        self.assessment_repo
            .insert_final_attempt(&mut *tx, session.user.id, course_id, grade)
            .await?;
        tx.commit().await?;
        Ok(grade)
    }

    /// Quiz de aula: tentativas livres, todas registradas.
    pub async fn submit_quiz(
        &self,
        pool: &PgPool,
        session: &SessionUser,
        course_id: Uuid,
        lesson_id: Uuid,
        answers: &HashMap<usize, usize>,
    ) -> Result<GradeResult, AppError> {
        self.verify_access(pool, session, course_id).await?;
        let course = self.load_course(pool, course_id).await?;

        let lesson = self
            .course_repo
            .find_lesson(pool, lesson_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Aula não encontrada.".into()))?;
        if lesson.lesson_type != LessonType::Quiz {
            return Err(AppError::BadRequest("Esta aula não é um quiz.".into()));
        }
        if !self
            .course_repo
            .lesson_belongs_to_course(pool, lesson_id, course_id)
            .await?
        {
            return Err(AppError::NotFound("Aula não encontrada neste curso.".into()));
        }

        let questions: Vec<AssessmentQuestion> = lesson
            .content
            .map(|c| serde_json::from_value(c.0))
            .transpose()
            .map_err(|e| anyhow::anyhow!("Conteúdo de quiz malformado: {e}"))?
            .unwrap_or_default();
        if questions.is_empty() {
            return Err(AppError::BadRequest("Este quiz não tem questões.".into()));
        }

        let rate = course.passing_rate.unwrap_or(DEFAULT_PASSING_RATE);
        let grade = grade_answers(&questions, answers, rate);

        let mut tx = pool.begin().await?;
        self.assessment_repo
            .insert_quiz_attempt(&mut *tx, session.user.id, lesson_id, grade)
            .await?;
        tx.commit().await?;
        Ok(grade)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::course::AssessmentOption;

    fn question(correct: usize, options: usize) -> AssessmentQuestion {
        AssessmentQuestion {
            question: "q".into(),
            options: (0..options)
                .map(|i| AssessmentOption { text: format!("op{i}"), is_correct: i == correct })
                .collect(),
        }
    }

    /// Gabarito [0, 2, 1, 3], respostas [0, 2, 1, 1] -> 3/4, 75%.
    #[test]
    fn corrige_contra_o_gabarito_armazenado() {
        let questions = vec![question(0, 4), question(2, 4), question(1, 4), question(3, 4)];
        let answers = HashMap::from([(0, 0), (1, 2), (2, 1), (3, 1)]);

        let grade = grade_answers(&questions, &answers, 80);
        assert_eq!(grade.score, 3);
        assert_eq!(grade.total, 4);
        assert!(!grade.passed); // 75 < 80

        let grade = grade_answers(&questions, &answers, 75);
        assert!(grade.passed); // 75 >= 75
    }

    #[test]
    fn resposta_ausente_ou_fora_do_intervalo_nao_pontua() {
        let questions = vec![question(1, 3), question(0, 3)];
        // Questão 0 sem resposta; questão 1 com índice inexistente.
        let answers = HashMap::from([(1, 99)]);
        let grade = grade_answers(&questions, &answers, 80);
        assert_eq!(grade.score, 0);
        assert_eq!(grade.total, 2);
        assert!(!grade.passed);
    }

    #[test]
    fn correcao_e_deterministica() {
        let questions = vec![question(0, 2), question(1, 2)];
        let answers = HashMap::from([(0, 0), (1, 1)]);
        let a = grade_answers(&questions, &answers, 80);
        let b = grade_answers(&questions, &answers, 80);
        assert_eq!(a, b);
        assert_eq!(a.score, 2);
        assert!(a.passed);
    }

    #[test]
    fn sem_questoes_nunca_passa() {
        let grade = grade_answers(&[], &HashMap::new(), 80);
        assert_eq!(grade.total, 0);
        assert!(!grade.passed);
    }

    #[test]
    fn nota_cheia_passa_com_qualquer_corte() {
        let questions = vec![question(0, 2)];
        let answers = HashMap::from([(0, 0)]);
        let grade = grade_answers(&questions, &answers, 100);
        assert_eq!(grade.score, 1);
        assert!(grade.passed);
    }

    #[test]
    fn projecao_do_aluno_nao_vaza_gabarito() {
        let questions = vec![question(1, 3)];
        let projected = strip_answer_key(&questions);
        assert_eq!(projected[0].options, vec!["op0", "op1", "op2"]);
        let as_json = serde_json::to_string(&projected).unwrap();
        assert!(!as_json.contains("isCorrect"));
        assert!(!as_json.contains("is_correct"));
    }
}
