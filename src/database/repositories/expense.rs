//! Expense and expense category repository implementation

use sqlx::{PgConnection, PgPool};
use chrono::Utc;
use crate::models::expense::{CategoryTotal, CreateExpenseRequest, Expense, ExpenseCategory};
use crate::utils::errors::HostelError;

const EXPENSE_COLUMNS: &str = "id, hostel_id, category_id, description, amount, date, created_at, updated_at";

#[derive(Clone, Debug)]
pub struct ExpenseRepository {
    pool: PgPool,
}

impl ExpenseRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Categories

    /// Return the category with this name, creating it when missing
    pub async fn get_or_create_category(&self, name: &str) -> Result<ExpenseCategory, HostelError> {
        let category = sqlx::query_as::<_, ExpenseCategory>(
            r#"
            INSERT INTO expense_categories (name)
            VALUES ($1)
            ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
            RETURNING id, name
            "#
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    pub async fn find_category(&self, id: i64) -> Result<Option<ExpenseCategory>, HostelError> {
        let category = sqlx::query_as::<_, ExpenseCategory>("SELECT id, name FROM expense_categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    pub async fn list_categories(&self) -> Result<Vec<ExpenseCategory>, HostelError> {
        let categories = sqlx::query_as::<_, ExpenseCategory>("SELECT id, name FROM expense_categories ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    // Expenses

    /// Insert a validated expense
    pub async fn create(&self, conn: &mut PgConnection, hostel_id: i64, request: &CreateExpenseRequest) -> Result<Expense, HostelError> {
        let now = Utc::now();
        let expense = sqlx::query_as::<_, Expense>(&format!(
            r#"
            INSERT INTO expenses (hostel_id, category_id, description, amount, date, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        ))
        .bind(hostel_id)
        .bind(request.category_id)
        .bind(&request.description)
        .bind(request.amount)
        .bind(request.date.unwrap_or_else(|| now.date_naive()))
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;

        Ok(expense)
    }

    /// Find expense by ID
    pub async fn find_by_id(&self, id: i64) -> Result<Option<Expense>, HostelError> {
        let expense = sqlx::query_as::<_, Expense>(&format!("SELECT {} FROM expenses WHERE id = $1", EXPENSE_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(expense)
    }

    pub async fn lock(&self, conn: &mut PgConnection, id: i64) -> Result<Expense, HostelError> {
        sqlx::query_as::<_, Expense>(&format!("SELECT {} FROM expenses WHERE id = $1 FOR UPDATE", EXPENSE_COLUMNS))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?
            .ok_or_else(|| HostelError::not_found("Expense", id))
    }

    /// Overwrite an expense with already merged values
    pub async fn update(&self, conn: &mut PgConnection, expense: &Expense) -> Result<Expense, HostelError> {
        let updated = sqlx::query_as::<_, Expense>(&format!(
            r#"
            UPDATE expenses
            SET category_id = $2, description = $3, amount = $4, date = $5, updated_at = $6
            WHERE id = $1
            RETURNING {}
            "#,
            EXPENSE_COLUMNS
        ))
        .bind(expense.id)
        .bind(expense.category_id)
        .bind(&expense.description)
        .bind(expense.amount)
        .bind(expense.date)
        .bind(Utc::now())
        .fetch_one(&mut *conn)
        .await?;

        Ok(updated)
    }

    pub async fn delete(&self, conn: &mut PgConnection, id: i64) -> Result<(), HostelError> {
        sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&mut *conn)
            .await?;

        Ok(())
    }

    /// Latest expenses of a hostel, newest first
    pub async fn recent_for_hostel(&self, hostel_id: i64, limit: i64) -> Result<Vec<Expense>, HostelError> {
        let expenses = sqlx::query_as::<_, Expense>(&format!(
            "SELECT {} FROM expenses WHERE hostel_id = $1 ORDER BY date DESC, id DESC LIMIT $2",
            EXPENSE_COLUMNS
        ))
        .bind(hostel_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(expenses)
    }

    /// Expense totals per category name across the given hostels
    pub async fn totals_by_category(&self, hostel_ids: &[i64]) -> Result<Vec<CategoryTotal>, HostelError> {
        let totals = sqlx::query_as::<_, CategoryTotal>(
            r#"
            SELECT c.name AS category, SUM(e.amount) AS total
            FROM expenses e
            LEFT JOIN expense_categories c ON c.id = e.category_id
            WHERE e.hostel_id = ANY($1)
            GROUP BY c.name
            ORDER BY c.name ASC NULLS LAST
            "#
        )
        .bind(hostel_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(totals)
    }
}
