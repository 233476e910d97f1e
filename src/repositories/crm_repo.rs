use async_trait::async_trait;
use sqlx::{query, query_as, PgPool};

use super::CrmRepository;
use crate::models::{CrmCompany, CrmContact};
use crate::services::error::Result;

pub struct PgCrmRepository {
    pool: PgPool,
}

impl PgCrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CrmRepository for PgCrmRepository {
    async fn find_company(&self, account_id: &str) -> Result<Option<CrmCompany>> {
        let company = query_as::<_, CrmCompany>(
            r#"
            SELECT account_id, account_name, sync_flag, status, erp_customer_id, created_at, last_modified
            FROM crm_company_accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    async fn insert_company(&self, company: &CrmCompany) -> Result<()> {
        query(
            r#"
            INSERT INTO crm_company_accounts (
                account_id, account_name, sync_flag, status, erp_customer_id, created_at, last_modified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&company.account_id)
        .bind(&company.account_name)
        .bind(company.sync_flag)
        .bind(&company.status)
        .bind(company.erp_customer_id)
        .bind(company.created_at)
        .bind(company.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_company(&self, company: &CrmCompany) -> Result<()> {
        query(
            r#"
            UPDATE crm_company_accounts
            SET account_name = $2,
                sync_flag = $3,
                status = $4,
                last_modified = $5
            WHERE account_id = $1
            "#,
        )
        .bind(&company.account_id)
        .bind(&company.account_name)
        .bind(company.sync_flag)
        .bind(&company.status)
        .bind(company.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_company_customer_id(&self, account_id: &str, customer_id: i64) -> Result<()> {
        query("UPDATE crm_company_accounts SET erp_customer_id = $2 WHERE account_id = $1")
            .bind(account_id)
            .bind(customer_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn find_contact(&self, contact_id: &str) -> Result<Option<CrmContact>> {
        let contact = query_as::<_, CrmContact>(
            r#"
            SELECT contact_id, account_id, account_name, first_name, last_name, email,
                   department, country, phone, zip_code, cshme_flag, status, sync_flag,
                   erp_contact_person_id, created_at, last_modified
            FROM crm_company_contacts
            WHERE contact_id = $1
            "#,
        )
        .bind(contact_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(contact)
    }

    async fn insert_contact(&self, contact: &CrmContact) -> Result<()> {
        query(
            r#"
            INSERT INTO crm_company_contacts (
                contact_id, account_id, account_name, first_name, last_name, email,
                department, country, phone, zip_code, cshme_flag, status, sync_flag,
                erp_contact_person_id, created_at, last_modified
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)
            "#,
        )
        .bind(&contact.contact_id)
        .bind(&contact.account_id)
        .bind(&contact.account_name)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.department)
        .bind(&contact.country)
        .bind(&contact.phone)
        .bind(&contact.zip_code)
        .bind(contact.cshme_flag)
        .bind(&contact.status)
        .bind(contact.sync_flag)
        .bind(contact.erp_contact_person_id)
        .bind(contact.created_at)
        .bind(contact.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_contact(&self, contact: &CrmContact) -> Result<()> {
        query(
            r#"
            UPDATE crm_company_contacts
            SET account_id = $2,
                account_name = $3,
                first_name = $4,
                last_name = $5,
                email = $6,
                department = $7,
                country = $8,
                phone = $9,
                zip_code = $10,
                cshme_flag = $11,
                status = $12,
                sync_flag = $13,
                last_modified = $14
            WHERE contact_id = $1
            "#,
        )
        .bind(&contact.contact_id)
        .bind(&contact.account_id)
        .bind(&contact.account_name)
        .bind(&contact.first_name)
        .bind(&contact.last_name)
        .bind(&contact.email)
        .bind(&contact.department)
        .bind(&contact.country)
        .bind(&contact.phone)
        .bind(&contact.zip_code)
        .bind(contact.cshme_flag)
        .bind(&contact.status)
        .bind(contact.sync_flag)
        .bind(contact.last_modified)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_contact_person_id(&self, contact_id: &str, contact_person_id: i64) -> Result<()> {
        query("UPDATE crm_company_contacts SET erp_contact_person_id = $2 WHERE contact_id = $1")
            .bind(contact_id)
            .bind(contact_person_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
