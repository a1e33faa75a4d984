// src/db/course_repo.rs

use sqlx::{Executor, Postgres, types::Json};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::course::{Course, CreateCoursePayload, Lesson, LessonType, Module},
};

#[derive(Clone)]
pub struct CourseRepository;

impl CourseRepository {
    pub async fn create<'e, E>(
        &self,
        executor: E,
        payload: &CreateCoursePayload,
    ) -> Result<Course, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses
                (title, description, category, price, is_public, image_path, schedule, venue,
                 pre_test_content, final_assessment_content, passing_rate, max_attempts)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.category)
        .bind(payload.price)
        .bind(payload.is_public)
        .bind(&payload.image_path)
        .bind(&payload.schedule)
        .bind(&payload.venue)
        .bind(payload.pre_test_content.as_ref().map(Json))
        .bind(payload.final_assessment_content.as_ref().map(Json))
        .bind(payload.passing_rate)
        .bind(payload.max_attempts)
        .fetch_one(executor)
        .await?;
        Ok(course)
    }

    /// Atualização integral: o payload substitui todos os campos
    /// editáveis do curso.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &CreateCoursePayload,
    ) -> Result<Option<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let course = sqlx::query_as::<_, Course>(
            r#"
            UPDATE courses
            SET title = $2,
                description = $3,
                category = $4,
                price = $5,
                is_public = $6,
                image_path = $7,
                schedule = $8,
                venue = $9,
                pre_test_content = $10,
                final_assessment_content = $11,
                passing_rate = $12,
                max_attempts = $13
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&payload.title)
        .bind(&payload.description)
        .bind(&payload.category)
        .bind(payload.price)
        .bind(payload.is_public)
        .bind(&payload.image_path)
        .bind(&payload.schedule)
        .bind(&payload.venue)
        .bind(payload.pre_test_content.as_ref().map(Json))
        .bind(payload.final_assessment_content.as_ref().map(Json))
        .bind(payload.passing_rate)
        .bind(payload.max_attempts)
        .fetch_optional(executor)
        .await?;
        Ok(course)
    }

    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let course = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = $1")
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(course)
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Course>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let courses = sqlx::query_as::<_, Course>("SELECT * FROM courses ORDER BY title ASC")
            .fetch_all(executor)
            .await?;
        Ok(courses)
    }

    pub async fn create_module<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
        title: &str,
        order: i32,
    ) -> Result<Module, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Module>(
            r#"
            INSERT INTO modules (course_id, title, "order")
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(course_id)
        .bind(title)
        .bind(order)
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Já existe um módulo nesta posição."))
    }

    pub async fn create_lesson<'e, E>(
        &self,
        executor: E,
        module_id: Uuid,
        title: &str,
        order: i32,
        lesson_type: LessonType,
        content: Option<&serde_json::Value>,
    ) -> Result<Lesson, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Lesson>(
            r#"
            INSERT INTO lessons (module_id, title, "order", lesson_type, content)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(module_id)
        .bind(title)
        .bind(order)
        .bind(lesson_type)
        .bind(content.map(Json))
        .fetch_one(executor)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Já existe uma aula nesta posição."))
    }

    pub async fn list_modules<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<Vec<Module>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let modules = sqlx::query_as::<_, Module>(
            r#"SELECT * FROM modules WHERE course_id = $1 ORDER BY "order" ASC"#,
        )
        .bind(course_id)
        .fetch_all(executor)
        .await?;
        Ok(modules)
    }

    pub async fn list_lessons<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<Vec<Lesson>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lessons = sqlx::query_as::<_, Lesson>(
            r#"
            SELECT l.*
            FROM lessons l
            JOIN modules m ON m.id = l.module_id
            WHERE m.course_id = $1
            ORDER BY m."order" ASC, l."order" ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(executor)
        .await?;
        Ok(lessons)
    }

    pub async fn find_lesson<'e, E>(
        &self,
        executor: E,
        lesson_id: Uuid,
    ) -> Result<Option<Lesson>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let lesson = sqlx::query_as::<_, Lesson>("SELECT * FROM lessons WHERE id = $1")
            .bind(lesson_id)
            .fetch_optional(executor)
            .await?;
        Ok(lesson)
    }

    /// A aula pertence (via módulo) ao curso informado?
    pub async fn lesson_belongs_to_course<'e, E>(
        &self,
        executor: E,
        lesson_id: Uuid,
        course_id: Uuid,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let belongs = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM lessons l
                JOIN modules m ON m.id = l.module_id
                WHERE l.id = $1 AND m.course_id = $2
            )
            "#,
        )
        .bind(lesson_id)
        .bind(course_id)
        .fetch_one(executor)
        .await?;
        Ok(belongs)
    }

    /// Total de aulas do curso (join aulas -> módulos).
    pub async fn count_lessons<'e, E>(&self, executor: E, course_id: Uuid) -> Result<i64, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let count = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM lessons l
            JOIN modules m ON m.id = l.module_id
            WHERE m.course_id = $1
            "#,
        )
        .bind(course_id)
        .fetch_one(executor)
        .await?;
        Ok(count)
    }

    /// Ids das aulas do curso na ordem total (ordem do módulo, depois da
    /// aula). Os índices UNIQUE de ordenação garantem que não há empates.
    pub async fn ordered_lesson_ids<'e, E>(
        &self,
        executor: E,
        course_id: Uuid,
    ) -> Result<Vec<Uuid>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            SELECT l.id
            FROM lessons l
            JOIN modules m ON m.id = l.module_id
            WHERE m.course_id = $1
            ORDER BY m."order" ASC, l."order" ASC
            "#,
        )
        .bind(course_id)
        .fetch_all(executor)
        .await?;
        Ok(ids)
    }
}
