use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, PgPool};

use super::{ErpRepository, IdSequenceRepository};
use crate::models::{ErpContact, ErpCustomer, IdEntity};
use crate::services::error::Result;

pub struct PgErpRepository {
    pool: PgPool,
}

impl PgErpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ErpRepository for PgErpRepository {
    async fn find_customer(&self, crm_account_id: &str) -> Result<Option<ErpCustomer>> {
        let customer = query_as::<_, ErpCustomer>(
            r#"
            SELECT customer_id, crm_account_id, name, status, created_at, last_modified
            FROM erp_customers
            WHERE crm_account_id = $1
            "#,
        )
        .bind(crm_account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(customer)
    }

    async fn insert_customer(&self, customer: &ErpCustomer) -> Result<()> {
        query(
            r#"
            INSERT INTO erp_customers (customer_id, crm_account_id, name, status, created_at, last_modified)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(customer.customer_id)
        .bind(&customer.crm_account_id)
        .bind(&customer.name)
        .bind(&customer.status)
        .bind(customer.created_at)
        .bind(customer.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_customer(&self, customer: &ErpCustomer) -> Result<()> {
        // created_at is immutable once inserted.
        query(
            r#"
            UPDATE erp_customers
            SET name = $2,
                status = $3,
                last_modified = $4
            WHERE crm_account_id = $1
            "#,
        )
        .bind(&customer.crm_account_id)
        .bind(&customer.name)
        .bind(&customer.status)
        .bind(customer.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_customer_contact(&self, crm_account_id: &str, email: &str) -> Result<Option<ErpContact>> {
        let contact = query_as::<_, ErpContact>(
            r#"
            SELECT contact_person_id, customer_id, crm_account_id, email, first_name, last_name,
                   department, country, phone, cshme_flag, status, created_at, last_modified
            FROM erp_customer_contacts
            WHERE crm_account_id = $1 AND email = $2
            "#,
        )
        .bind(crm_account_id)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn insert_customer_contact(&self, contact: &ErpContact) -> Result<()> {
        query(
            r#"
            INSERT INTO erp_customer_contacts (
                contact_person_id, customer_id, crm_account_id, email, first_name, last_name,
                department, country, phone, cshme_flag, status, created_at, last_modified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(contact.contact_person_id)
        .bind(contact.customer_id)
        .bind(&contact.crm_account_id)
        .bind(&contact.email)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.department)
        .bind(&contact.country)
        .bind(&contact.phone)
        .bind(contact.cshme_flag)
        .bind(&contact.status)
        .bind(contact.created_at)
        .bind(contact.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_customer_contact(&self, contact: &ErpContact) -> Result<()> {
        query(
            r#"
            UPDATE erp_customer_contacts
            SET first_name = $3,
                last_name = $4,
                department = $5,
                country = $6,
                phone = $7,
                cshme_flag = $8,
                status = $9,
                last_modified = $10
            WHERE crm_account_id = $1 AND email = $2
            "#,
        )
        .bind(&contact.crm_account_id)
        .bind(&contact.email)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.department)
        .bind(&contact.country)
        .bind(&contact.phone)
        .bind(contact.cshme_flag)
        .bind(&contact.status)
        .bind(contact.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl IdSequenceRepository for PgErpRepository {
    async fn current_max_id(&self, entity: IdEntity) -> Result<Option<String>> {
        // Table and column come from a closed enum, never from input.
        let sql = format!(
            "SELECT MAX({column})::TEXT FROM {table}",
            column = entity.column(),
            table = entity.table()
        );

        let max_id: Option<String> = query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(max_id)
    }

    async fn next_counter_value(&self, entity: IdEntity, floor: i64) -> Result<i64> {
        let sql = format!(
            r#"
            INSERT INTO erp_id_counters (entity, last_value)
            VALUES ($1, GREATEST($2, COALESCE((SELECT MAX({column}) FROM {table}) + 1, $2)))
            ON CONFLICT (entity) DO UPDATE
                SET last_value = GREATEST(erp_id_counters.last_value + 1, $2)
            RETURNING last_value
            "#,
            column = entity.column(),
            table = entity.table()
        );

        let next: i64 = query_scalar(&sql)
            .bind(entity.as_str())
            .bind(floor)
            .fetch_one(&self.pool)
            .await?;

        Ok(next)
    }
}
