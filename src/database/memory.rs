//! In-Memory Repository
//!
//! Process-local storage adapter used by tests and by local runs without a
//! database. Records are kept in registration order behind a single async
//! `RwLock`, so the owner/clinic link is one critical section.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::repository::{ClinicRepository, RepositoryError, RepositoryResult, UserRepository};
use crate::models::filter::{FilterValue, Filterable};
use crate::models::{
    AffiliationDetails, Clinic, ClinicDetails, ClinicSummary, Doctor, DoctorDetails,
    DoctorSummary, DoctorWithPassword, Owner, OwnerDetails, OwnerSummary, OwnerWithPassword,
    SearchFilter, User, UserWithPassword,
};

impl Filterable for OwnerWithPassword {
    fn field_value(&self, column: &str) -> Option<FilterValue> {
        match column {
            "id" => Some(FilterValue::Id(self.id)),
            "name" => Some(FilterValue::Text(self.name.clone())),
            "email" => Some(FilterValue::Text(self.email.clone())),
            "gender" => Some(FilterValue::Text(self.gender.clone())),
            "address" => Some(FilterValue::Text(self.address.clone())),
            "mobile" => Some(FilterValue::Number(self.mobile)),
            "clinic_id" => self.clinic_id.map(FilterValue::Id),
            _ => None,
        }
    }
}

impl Filterable for Clinic {
    fn field_value(&self, column: &str) -> Option<FilterValue> {
        match column {
            "id" => Some(FilterValue::Id(self.id)),
            "owner_id" => Some(FilterValue::Id(self.owner_id)),
            "name" => Some(FilterValue::Text(self.name.clone())),
            "address" => Some(FilterValue::Text(self.address.clone())),
            "mobile" => Some(FilterValue::Number(self.mobile)),
            "pincode" => Some(FilterValue::Number(i64::from(self.pincode))),
            _ => None,
        }
    }
}

impl Filterable for DoctorWithPassword {
    fn field_value(&self, column: &str) -> Option<FilterValue> {
        match column {
            "id" => Some(FilterValue::Id(self.id)),
            "name" => Some(FilterValue::Text(self.name.clone())),
            "email" => Some(FilterValue::Text(self.email.clone())),
            "qualifications" => Some(FilterValue::Text(self.qualifications.clone())),
            "working_at" => Some(FilterValue::Text(self.working_at.clone())),
            "address" => Some(FilterValue::Text(self.address.clone())),
            "mobile" => Some(FilterValue::Number(self.mobile)),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    owners: Vec<OwnerWithPassword>,
    clinics: Vec<Clinic>,
    doctors: Vec<DoctorWithPassword>,
    users: Vec<UserWithPassword>,
}

#[derive(Debug, Default)]
pub struct InMemoryRepository {
    state: RwLock<MemoryState>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClinicRepository for InMemoryRepository {
    async fn insert_owner(&self, owner: &OwnerWithPassword) -> RepositoryResult<()> {
        self.state.write().await.owners.push(owner.clone());
        Ok(())
    }

    async fn find_owner_by_id(&self, id: Uuid) -> RepositoryResult<Owner> {
        let state = self.state.read().await;
        state
            .owners
            .iter()
            .find(|owner| owner.id == id)
            .cloned()
            .map(Owner::from)
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_owners_by_email_or_mobile(
        &self,
        email: &str,
        mobile: i64,
    ) -> RepositoryResult<Vec<Owner>> {
        let state = self.state.read().await;
        Ok(state
            .owners
            .iter()
            .filter(|owner| owner.email == email || owner.mobile == mobile)
            .cloned()
            .map(Owner::from)
            .collect())
    }

    async fn find_owner_by_email(&self, email: &str) -> RepositoryResult<OwnerWithPassword> {
        let state = self.state.read().await;
        state
            .owners
            .iter()
            .find(|owner| owner.email == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_owners(&self, filter: &SearchFilter) -> RepositoryResult<Vec<OwnerDetails>> {
        let state = self.state.read().await;
        Ok(state
            .owners
            .iter()
            .filter(|owner| filter.matches(*owner))
            .map(|owner| OwnerDetails {
                owner: owner.clone().into(),
                clinic_details: owner.clinic_id.and_then(|clinic_id| {
                    state
                        .clinics
                        .iter()
                        .find(|clinic| clinic.id == clinic_id)
                        .map(ClinicSummary::from)
                }),
            })
            .collect())
    }

    async fn register_clinic(&self, clinic: &Clinic) -> RepositoryResult<()> {
        let mut state = self.state.write().await;

        let owner = state
            .owners
            .iter_mut()
            .find(|owner| owner.id == clinic.owner_id)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(existing) = owner.clinic_id {
            return Err(RepositoryError::Conflict(format!(
                "owner {} is already linked to clinic {}",
                clinic.owner_id, existing
            )));
        }

        owner.clinic_id = Some(clinic.id);
        state.clinics.push(clinic.clone());
        Ok(())
    }

    async fn search_clinics(&self, filter: &SearchFilter) -> RepositoryResult<Vec<ClinicDetails>> {
        let state = self.state.read().await;
        Ok(state
            .clinics
            .iter()
            .filter(|clinic| filter.matches(*clinic))
            .map(|clinic| ClinicDetails {
                clinic: clinic.clone(),
                owner_details: state
                    .owners
                    .iter()
                    .find(|owner| owner.id == clinic.owner_id)
                    .map(|owner| OwnerSummary::from(&Owner::from(owner.clone()))),
                doctor_details: state
                    .doctors
                    .iter()
                    .filter(|doctor| clinic.doctors.contains(&doctor.id))
                    .map(DoctorSummary::from)
                    .collect(),
            })
            .collect())
    }

    async fn insert_doctor(&self, doctor: &DoctorWithPassword) -> RepositoryResult<()> {
        self.state.write().await.doctors.push(doctor.clone());
        Ok(())
    }

    async fn find_doctors_by_email_or_mobile(
        &self,
        email: &str,
        mobile: i64,
    ) -> RepositoryResult<Vec<Doctor>> {
        let state = self.state.read().await;
        Ok(state
            .doctors
            .iter()
            .filter(|doctor| doctor.email == email || doctor.mobile == mobile)
            .cloned()
            .map(Doctor::from)
            .collect())
    }

    async fn find_doctor_by_email(&self, email: &str) -> RepositoryResult<DoctorWithPassword> {
        let state = self.state.read().await;
        state
            .doctors
            .iter()
            .find(|doctor| doctor.email == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn search_doctors(&self, filter: &SearchFilter) -> RepositoryResult<Vec<DoctorDetails>> {
        let state = self.state.read().await;
        Ok(state
            .doctors
            .iter()
            .filter(|doctor| filter.matches(*doctor))
            .map(|doctor| {
                let affiliations = doctor
                    .clinics
                    .iter()
                    .filter_map(|affiliation| {
                        let clinic_id = affiliation.clinic_id?;
                        Some(AffiliationDetails {
                            clinic_id,
                            start_time: affiliation.start_time,
                            end_time: affiliation.end_time,
                            working_days: affiliation.working_days.clone(),
                            clinic: state
                                .clinics
                                .iter()
                                .find(|clinic| clinic.id == clinic_id)
                                .map(ClinicSummary::from),
                        })
                    })
                    .collect();

                DoctorDetails::new(Doctor::from(doctor.clone()), affiliations)
            })
            .collect())
    }

    async fn health_check(&self) -> RepositoryResult<()> {
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryRepository {
    async fn insert_user(&self, user: &UserWithPassword) -> RepositoryResult<()> {
        self.state.write().await.users.push(user.clone());
        Ok(())
    }

    async fn find_users_by_email_and_mobile(
        &self,
        email: &str,
        mobile: i64,
    ) -> RepositoryResult<Vec<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .iter()
            .filter(|user| user.email == email && user.mobile == mobile)
            .cloned()
            .map(User::from)
            .collect())
    }

    async fn find_user_by_email(&self, email: &str) -> RepositoryResult<UserWithPassword> {
        let state = self.state.read().await;
        state
            .users
            .iter()
            .find(|user| user.email == email)
            .cloned()
            .ok_or(RepositoryError::NotFound)
    }

    async fn find_user_by_id(&self, id: Uuid) -> RepositoryResult<User> {
        let state = self.state.read().await;
        state
            .users
            .iter()
            .find(|user| user.id == id)
            .cloned()
            .map(User::from)
            .ok_or(RepositoryError::NotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Affiliation, Role};
    use chrono::{Duration, Utc};
    use std::sync::Arc;

    fn owner(email: &str, mobile: i64) -> OwnerWithPassword {
        OwnerWithPassword {
            id: Uuid::new_v4(),
            name: "Saqlain".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            address: "Soura Srinagar".to_string(),
            gender: "Male".to_string(),
            mobile,
            role: Role::ClinicOwner,
            clinic_id: None,
            registration_date: Utc::now(),
        }
    }

    fn clinic(owner_id: Uuid) -> Clinic {
        Clinic {
            id: Uuid::new_v4(),
            owner_id,
            name: "HealthFirst".to_string(),
            address: "Residency Road".to_string(),
            mobile: 9876543000,
            pincode: 190011,
            season_timings: Vec::new(),
            doctors: Vec::new(),
            wallet_id: None,
            registration_date: Utc::now(),
        }
    }

    fn doctor(clinics: Vec<Affiliation>) -> DoctorWithPassword {
        DoctorWithPassword {
            id: Uuid::new_v4(),
            name: "Dr. Mir".to_string(),
            qualifications: "MBBS".to_string(),
            address: "Hyderpora Srinagar".to_string(),
            email: "mir@clinic.com".to_string(),
            password_hash: "hash".to_string(),
            working_at: "SKIMS".to_string(),
            mobile: 9797000000,
            role: Role::Doctor,
            appointments: Vec::new(),
            clinics,
            registration_date: Utc::now(),
        }
    }

    fn affiliation(clinic_id: Option<Uuid>) -> Affiliation {
        let now = Utc::now();
        Affiliation {
            clinic_id,
            start_time: now,
            end_time: now + Duration::hours(4),
            working_days: vec!["Monday".to_string()],
        }
    }

    #[tokio::test]
    async fn test_register_clinic_links_owner() {
        let repo = InMemoryRepository::new();
        let stored = owner("saqlain@gmail.com", 9797798243);
        repo.insert_owner(&stored).await.unwrap();

        let new_clinic = clinic(stored.id);
        repo.register_clinic(&new_clinic).await.unwrap();

        let linked = repo.find_owner_by_id(stored.id).await.unwrap();
        assert_eq!(linked.clinic_id, Some(new_clinic.id));

        let owners = repo.find_owners(&SearchFilter::by_id(stored.id)).await.unwrap();
        assert_eq!(
            owners[0].clinic_details.as_ref().map(|c| c.id),
            Some(new_clinic.id)
        );
    }

    #[tokio::test]
    async fn test_register_clinic_for_unknown_owner_writes_nothing() {
        let repo = InMemoryRepository::new();
        let result = repo.register_clinic(&clinic(Uuid::new_v4())).await;

        assert!(matches!(result, Err(RepositoryError::NotFound)));
        assert!(repo.search_clinics(&SearchFilter::new()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_registrations_link_once() {
        let repo = Arc::new(InMemoryRepository::new());
        let stored = owner("saqlain@gmail.com", 9797798243);
        repo.insert_owner(&stored).await.unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let repo = Arc::clone(&repo);
            let candidate = clinic(stored.id);
            handles.push(tokio::spawn(async move {
                repo.register_clinic(&candidate).await.is_ok()
            }));
        }

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(repo.search_clinics(&SearchFilter::new()).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_clinic_search_tolerates_missing_owner_and_doctors() {
        let repo = InMemoryRepository::new();
        let stored = owner("saqlain@gmail.com", 9797798243);
        repo.insert_owner(&stored).await.unwrap();

        let mut new_clinic = clinic(stored.id);
        new_clinic.doctors = vec![Uuid::new_v4()];
        repo.register_clinic(&new_clinic).await.unwrap();

        let found = repo.search_clinics(&SearchFilter::new()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].owner_details.as_ref().map(|o| o.id), Some(stored.id));
        assert!(found[0].doctor_details.is_empty());
    }

    #[tokio::test]
    async fn test_doctor_search_skips_sparse_affiliations() {
        let repo = InMemoryRepository::new();
        let stored = owner("saqlain@gmail.com", 9797798243);
        repo.insert_owner(&stored).await.unwrap();
        let linked = clinic(stored.id);
        repo.register_clinic(&linked).await.unwrap();

        let dangling = Uuid::new_v4();
        let stored_doctor = doctor(vec![
            affiliation(Some(linked.id)),
            affiliation(None),
            affiliation(Some(dangling)),
        ]);
        repo.insert_doctor(&stored_doctor).await.unwrap();

        let found = repo.search_doctors(&SearchFilter::new()).await.unwrap();
        assert_eq!(found.len(), 1);
        let clinics = &found[0].clinics;
        assert_eq!(clinics.len(), 2);
        assert_eq!(clinics[0].clinic.as_ref().map(|c| c.id), Some(linked.id));
        assert_eq!(clinics[1].clinic_id, dangling);
        assert!(clinics[1].clinic.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_lookups() {
        let repo = InMemoryRepository::new();
        repo.insert_owner(&owner("saqlain@gmail.com", 9797798243))
            .await
            .unwrap();

        assert_eq!(
            repo.find_owners_by_email_or_mobile("x@gmail.com", 9797798243)
                .await
                .unwrap()
                .len(),
            1
        );
        assert!(repo
            .find_owners_by_email_or_mobile("x@gmail.com", 1111111111)
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            repo.find_owner_by_email("x@gmail.com").await,
            Err(RepositoryError::NotFound)
        ));
    }
}
