// src/models/assessment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// Resultado da correção, sempre recalculado no servidor a partir do
// gabarito armazenado. Nunca confiamos em nota vinda do cliente.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GradeResult {
    pub score: i32,
    pub total: i32,
    pub passed: bool,
}

// Respostas do aluno: índice da questão -> índice da opção escolhida.
// Índices ausentes ou fora do intervalo simplesmente não pontuam.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersPayload {
    pub answers: HashMap<usize, usize>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub score: i32,
    pub total: i32,
    pub passed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct QuizAttempt {
    pub id: Uuid,
    pub user_id: Uuid,
    pub lesson_id: Uuid,
    pub score: i32,
    pub total: i32,
    pub passed: bool,
    pub created_at: DateTime<Utc>,
}
