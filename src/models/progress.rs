// src/models/progress.rs

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// Resposta da conclusão de uma aula: ou há uma próxima aula na sequência,
// ou o curso acabou de ser 100% concluído e um certificado foi emitido.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LessonAdvance {
    pub next_lesson_id: Option<Uuid>,
    pub certificate_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteLessonPayload {
    pub course_id: Uuid,
    pub lesson_id: Uuid,
}

// Reinício de treinamento: com `user_id`, reseta um único aluno; sem ele,
// reseta a coorte inteira de quem já possui certificado de conclusão.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetrainPayload {
    pub user_id: Option<Uuid>,
}
