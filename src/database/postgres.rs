//! PostgreSQL Repository
//!
//! Production storage adapter. Searches use outer joins and
//! `json_build_object` so that each row arrives with its related summaries
//! already attached.

use async_trait::async_trait;
use sqlx::{types::Json, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::repository::{ClinicRepository, RepositoryError, RepositoryResult, UserRepository};
use crate::models::filter::FilterValue;
use crate::models::{
    AffiliationDetails, Clinic, ClinicDetails, ClinicSummary, Doctor, DoctorDetails,
    DoctorSummary, DoctorWithPassword, Owner, OwnerDetails, OwnerSummary, OwnerWithPassword,
    SearchFilter, User, UserWithPassword,
};

const OWNER_COLUMNS: &str =
    "id, name, email, address, gender, mobile, role, clinic_id, registration_date";

const DOCTOR_COLUMNS: &str = "id, name, qualifications, address, email, working_at, mobile, \
     role, appointment_ids, registration_date";

const USER_COLUMNS: &str =
    "id, name, email, address, age, mobile, pincode, role, appointment_ids, registration_date";

#[derive(sqlx::FromRow)]
struct OwnerSearchRow {
    #[sqlx(flatten)]
    owner: Owner,
    clinic_details: Option<Json<ClinicSummary>>,
}

#[derive(sqlx::FromRow)]
struct ClinicSearchRow {
    #[sqlx(flatten)]
    clinic: Clinic,
    owner_details: Option<Json<OwnerSummary>>,
    doctor_details: Json<Vec<DoctorSummary>>,
}

#[derive(sqlx::FromRow)]
struct DoctorSearchRow {
    #[sqlx(flatten)]
    doctor: Doctor,
    affiliations: Json<Vec<AffiliationDetails>>,
}

/// Appends `AND <alias>.<column> = $n` for every filter condition
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &SearchFilter, alias: &str) {
    for condition in filter.conditions() {
        builder
            .push(" AND ")
            .push(alias)
            .push(".")
            .push(condition.field.column)
            .push(" = ");

        match &condition.value {
            FilterValue::Id(id) => builder.push_bind(*id),
            FilterValue::Text(text) => builder.push_bind(text.clone()),
            FilterValue::Number(number) => builder.push_bind(*number),
        };
    }
}

/// Repository backed by a PostgreSQL connection pool
#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClinicRepository for PgRepository {
    async fn insert_owner(&self, owner: &OwnerWithPassword) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO owners
                (id, name, email, password_hash, address, gender, mobile, role, clinic_id, registration_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(owner.id)
        .bind(&owner.name)
        .bind(&owner.email)
        .bind(&owner.password_hash)
        .bind(&owner.address)
        .bind(&owner.gender)
        .bind(owner.mobile)
        .bind(owner.role.as_str())
        .bind(owner.clinic_id)
        .bind(owner.registration_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_owner_by_id(&self, id: Uuid) -> RepositoryResult<Owner> {
        let owner = sqlx::query_as::<_, Owner>(&format!(
            "SELECT {} FROM owners WHERE id = $1",
            OWNER_COLUMNS
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(owner)
    }

    async fn find_owners_by_email_or_mobile(
        &self,
        email: &str,
        mobile: i64,
    ) -> RepositoryResult<Vec<Owner>> {
        let owners = sqlx::query_as::<_, Owner>(&format!(
            "SELECT {} FROM owners WHERE email = $1 OR mobile = $2",
            OWNER_COLUMNS
        ))
        .bind(email)
        .bind(mobile)
        .fetch_all(&self.pool)
        .await?;

        Ok(owners)
    }

    async fn find_owner_by_email(&self, email: &str) -> RepositoryResult<OwnerWithPassword> {
        let owner = sqlx::query_as::<_, OwnerWithPassword>(&format!(
            "SELECT {}, password_hash FROM owners WHERE email = $1 \
             ORDER BY registration_date LIMIT 1",
            OWNER_COLUMNS
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(owner)
    }

    async fn find_owners(&self, filter: &SearchFilter) -> RepositoryResult<Vec<OwnerDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT o.id, o.name, o.email, o.address, o.gender, o.mobile, o.role,
                   o.clinic_id, o.registration_date,
                   CASE WHEN c.id IS NULL THEN NULL ELSE json_build_object(
                       'id', c.id, 'name', c.name, 'address', c.address,
                       'mobile', c.mobile, 'pincode', c.pincode
                   ) END AS clinic_details
            FROM owners o
            LEFT JOIN clinics c ON c.id = o.clinic_id
            WHERE TRUE
            "#,
        );
        push_filter(&mut builder, filter, "o");
        builder.push(" ORDER BY o.registration_date");

        let rows = builder
            .build_query_as::<OwnerSearchRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| OwnerDetails {
                owner: row.owner,
                clinic_details: row.clinic_details.map(|Json(clinic)| clinic),
            })
            .collect())
    }

    async fn register_clinic(&self, clinic: &Clinic) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        // Row lock serializes concurrent registrations for the same owner
        let linked = sqlx::query_scalar::<_, Option<Uuid>>(
            "SELECT clinic_id FROM owners WHERE id = $1 FOR UPDATE",
        )
        .bind(clinic.owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        match linked {
            None => return Err(RepositoryError::NotFound),
            Some(Some(existing)) => {
                return Err(RepositoryError::Conflict(format!(
                    "owner {} is already linked to clinic {}",
                    clinic.owner_id, existing
                )))
            }
            Some(None) => {}
        }

        sqlx::query(
            r#"
            INSERT INTO clinics
                (id, owner_id, name, address, mobile, pincode, season_timings,
                 doctor_ids, wallet_id, registration_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(clinic.id)
        .bind(clinic.owner_id)
        .bind(&clinic.name)
        .bind(&clinic.address)
        .bind(clinic.mobile)
        .bind(clinic.pincode)
        .bind(Json(&clinic.season_timings))
        .bind(&clinic.doctors)
        .bind(clinic.wallet_id)
        .bind(clinic.registration_date)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE owners SET clinic_id = $1 WHERE id = $2")
            .bind(clinic.id)
            .bind(clinic.owner_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn search_clinics(&self, filter: &SearchFilter) -> RepositoryResult<Vec<ClinicDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT c.id, c.owner_id, c.name, c.address, c.mobile, c.pincode,
                   c.season_timings, c.doctor_ids, c.wallet_id, c.registration_date,
                   CASE WHEN o.id IS NULL THEN NULL ELSE json_build_object(
                       'id', o.id, 'name', o.name, 'email', o.email,
                       'mobile', o.mobile, 'gender', o.gender
                   ) END AS owner_details,
                   COALESCE((
                       SELECT json_agg(json_build_object(
                           'id', d.id, 'name', d.name, 'qualifications', d.qualifications,
                           'workingAt', d.working_at, 'mobile', d.mobile
                       ) ORDER BY d.registration_date)
                       FROM doctors d
                       WHERE d.id = ANY(c.doctor_ids)
                   ), '[]'::json) AS doctor_details
            FROM clinics c
            LEFT JOIN owners o ON o.id = c.owner_id
            WHERE TRUE
            "#,
        );
        push_filter(&mut builder, filter, "c");
        builder.push(" ORDER BY c.registration_date");

        let rows = builder
            .build_query_as::<ClinicSearchRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| ClinicDetails {
                clinic: row.clinic,
                owner_details: row.owner_details.map(|Json(owner)| owner),
                doctor_details: row.doctor_details.0,
            })
            .collect())
    }

    async fn insert_doctor(&self, doctor: &DoctorWithPassword) -> RepositoryResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO doctors
                (id, name, qualifications, address, email, password_hash, working_at,
                 mobile, role, appointment_ids, registration_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(doctor.id)
        .bind(&doctor.name)
        .bind(&doctor.qualifications)
        .bind(&doctor.address)
        .bind(&doctor.email)
        .bind(&doctor.password_hash)
        .bind(&doctor.working_at)
        .bind(doctor.mobile)
        .bind(doctor.role.as_str())
        .bind(&doctor.appointments)
        .bind(doctor.registration_date)
        .execute(&mut *tx)
        .await?;

        for (position, affiliation) in doctor.clinics.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO doctor_affiliations
                    (doctor_id, position, clinic_id, start_time, end_time, working_days)
                VALUES ($1, $2, $3, $4, $5, $6)
                "#,
            )
            .bind(doctor.id)
            .bind(position as i32)
            .bind(affiliation.clinic_id)
            .bind(affiliation.start_time)
            .bind(affiliation.end_time)
            .bind(&affiliation.working_days)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn find_doctors_by_email_or_mobile(
        &self,
        email: &str,
        mobile: i64,
    ) -> RepositoryResult<Vec<Doctor>> {
        let doctors = sqlx::query_as::<_, Doctor>(&format!(
            "SELECT {} FROM doctors WHERE email = $1 OR mobile = $2",
            DOCTOR_COLUMNS
        ))
        .bind(email)
        .bind(mobile)
        .fetch_all(&self.pool)
        .await?;

        Ok(doctors)
    }

    async fn find_doctor_by_email(&self, email: &str) -> RepositoryResult<DoctorWithPassword> {
        let doctor = sqlx::query_as::<_, DoctorWithPassword>(&format!(
            "SELECT {}, password_hash FROM doctors WHERE email = $1 \
             ORDER BY registration_date LIMIT 1",
            DOCTOR_COLUMNS
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(doctor)
    }

    async fn search_doctors(&self, filter: &SearchFilter) -> RepositoryResult<Vec<DoctorDetails>> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"
            SELECT d.id, d.name, d.qualifications, d.address, d.email, d.working_at,
                   d.mobile, d.role, d.appointment_ids, d.registration_date,
                   COALESCE((
                       SELECT json_agg(json_build_object(
                           'clinicId', a.clinic_id,
                           'startTime', a.start_time,
                           'endTime', a.end_time,
                           'workingDays', a.working_days,
                           'clinic', CASE WHEN c.id IS NULL THEN NULL ELSE json_build_object(
                               'id', c.id, 'name', c.name, 'address', c.address,
                               'mobile', c.mobile, 'pincode', c.pincode
                           ) END
                       ) ORDER BY a.position)
                       FROM doctor_affiliations a
                       LEFT JOIN clinics c ON c.id = a.clinic_id
                       WHERE a.doctor_id = d.id AND a.clinic_id IS NOT NULL
                   ), '[]'::json) AS affiliations
            FROM doctors d
            WHERE TRUE
            "#,
        );
        push_filter(&mut builder, filter, "d");
        builder.push(" ORDER BY d.registration_date");

        let rows = builder
            .build_query_as::<DoctorSearchRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| DoctorDetails::new(row.doctor, row.affiliations.0))
            .collect())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl UserRepository for PgRepository {
    async fn insert_user(&self, user: &UserWithPassword) -> RepositoryResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users
                (id, name, email, password_hash, address, age, mobile, pincode, role,
                 appointment_ids, registration_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(user.id)
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.address)
        .bind(user.age)
        .bind(user.mobile)
        .bind(user.pincode)
        .bind(user.role.as_str())
        .bind(&user.appointment_ids)
        .bind(user.registration_date)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_users_by_email_and_mobile(
        &self,
        email: &str,
        mobile: i64,
    ) -> RepositoryResult<Vec<User>> {
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE email = $1 AND mobile = $2",
            USER_COLUMNS
        ))
        .bind(email)
        .bind(mobile)
        .fetch_all(&self.pool)
        .await?;

        Ok(users)
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<UserWithPassword> {
        let user = sqlx::query_as::<_, UserWithPassword>(&format!(
            "SELECT {}, password_hash FROM users WHERE email = $1 \
             ORDER BY registration_date LIMIT 1",
            USER_COLUMNS
        ))
        .bind(email)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: Uuid) -> RepositoryResult<User> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(user)
    }
}
