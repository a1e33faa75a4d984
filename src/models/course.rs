// src/models/course.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "lesson_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LessonType {
    Video,
    Document,
    Quiz,
}

// Uma questão de avaliação como armazenada no banco (JSONB). A ordem das
// questões e das opções é significativa: a correção compara índices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentQuestion {
    pub question: String,
    pub options: Vec<AssessmentOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentOption {
    pub text: String,
    pub is_correct: bool,
}

// Projeção da questão enviada ao aluno: NUNCA inclui o gabarito.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuestion {
    pub question: String,
    pub options: Vec<String>,
}

/// Remove as flags de correção antes de transmitir ao aluno.
pub fn strip_answer_key(questions: &[AssessmentQuestion]) -> Vec<StudentQuestion> {
    questions
        .iter()
        .map(|q| StudentQuestion {
            question: q.question.clone(),
            options: q.options.iter().map(|o| o.text.clone()).collect(),
        })
        .collect()
}

/// Versão da aula transmitida a alunos. Aulas de quiz guardam o gabarito
/// dentro de `content`, então o conteúdo é trocado pela projeção sem as
/// flags de correção. Conteúdo de quiz que não parseia é simplesmente
/// omitido. Os outros tipos de aula passam intactos.
pub fn strip_lesson_answer_key(mut lesson: Lesson) -> Lesson {
    if lesson.lesson_type == LessonType::Quiz {
        lesson.content = lesson.content.and_then(|content| {
            let questions: Vec<AssessmentQuestion> = serde_json::from_value(content.0).ok()?;
            serde_json::to_value(strip_answer_key(&questions)).ok().map(Json)
        });
    }
    lesson
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Decimal,
    pub is_public: bool,
    pub image_path: Option<String>,
    pub schedule: Option<String>,
    pub venue: Option<String>,

    // Conteúdo das avaliações: só serializado para admins. As rotas de
    // aluno usam `strip_answer_key` sobre estes campos.
    #[serde(skip_serializing)]
    pub pre_test_content: Option<Json<Vec<AssessmentQuestion>>>,
    #[serde(skip_serializing)]
    pub final_assessment_content: Option<Json<Vec<AssessmentQuestion>>>,

    pub passing_rate: Option<i32>,
    pub max_attempts: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub order: i32,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: Uuid,
    pub module_id: Uuid,
    pub title: String,
    pub order: i32,
    pub lesson_type: LessonType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Json<serde_json::Value>>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCoursePayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub price: Decimal,
    #[serde(default)]
    pub is_public: bool,
    pub image_path: Option<String>,
    pub schedule: Option<String>,
    pub venue: Option<String>,
    pub pre_test_content: Option<Vec<AssessmentQuestion>>,
    pub final_assessment_content: Option<Vec<AssessmentQuestion>>,
    #[validate(range(min = 1, max = 100, message = "A nota de corte deve estar entre 1 e 100."))]
    pub passing_rate: Option<i32>,
    #[validate(range(min = 1, message = "O limite de tentativas deve ser positivo."))]
    pub max_attempts: Option<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateModulePayload {
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    #[validate(range(min = 1, message = "A ordem deve ser positiva."))]
    pub order: i32,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateLessonPayload {
    pub module_id: Uuid,
    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,
    #[validate(range(min = 1, message = "A ordem deve ser positiva."))]
    pub order: i32,
    pub lesson_type: LessonType,
    pub content: Option<serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiz_lesson() -> Lesson {
        let questions = vec![AssessmentQuestion {
            question: "Qual?".into(),
            options: vec![
                AssessmentOption { text: "a".into(), is_correct: false },
                AssessmentOption { text: "b".into(), is_correct: true },
            ],
        }];
        Lesson {
            id: Uuid::new_v4(),
            module_id: Uuid::new_v4(),
            title: "Quiz".into(),
            order: 1,
            lesson_type: LessonType::Quiz,
            content: Some(Json(serde_json::to_value(&questions).unwrap())),
        }
    }

    #[test]
    fn aula_de_quiz_para_aluno_nao_vaza_gabarito() {
        let lesson = strip_lesson_answer_key(quiz_lesson());
        let as_json = serde_json::to_string(&lesson).unwrap();
        assert!(!as_json.contains("isCorrect"));
        assert!(!as_json.contains("is_correct"));
        // As questões e opções continuam lá, só sem as flags.
        assert!(as_json.contains("Qual?"));
        assert!(as_json.contains("\"b\""));
    }

    #[test]
    fn aula_de_video_passa_intacta() {
        let lesson = Lesson {
            id: Uuid::new_v4(),
            module_id: Uuid::new_v4(),
            title: "Aula".into(),
            order: 1,
            lesson_type: LessonType::Video,
            content: Some(Json(serde_json::json!({ "url": "/videos/aula.mp4" }))),
        };
        let stripped = strip_lesson_answer_key(lesson);
        assert_eq!(
            stripped.content.unwrap().0,
            serde_json::json!({ "url": "/videos/aula.mp4" })
        );
    }

    #[test]
    fn quiz_com_conteudo_malformado_perde_o_conteudo() {
        let mut lesson = quiz_lesson();
        lesson.content = Some(Json(serde_json::json!({ "nada": "a ver" })));
        let stripped = strip_lesson_answer_key(lesson);
        assert!(stripped.content.is_none());
    }
}
