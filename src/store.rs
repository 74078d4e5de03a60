use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;

use crate::calc;
use crate::db;
use crate::model::{Certificate, Internship, Laboratory, Owned, Project, Role, SemesterRecord, Subject, User};

/// The fixed super-user. Seeded on first open, never deletable.
pub const SUPER_USER_ID: &str = "rishil";
pub const SUPER_USER_PASSWORD: &str = "admin@123";

const KEY_USERS: &str = "users";
const KEY_SESSION: &str = "session";
const KEY_RECORDS: &str = "academicRecords";
const KEY_PROJECTS: &str = "projects";
const KEY_INTERNSHIPS: &str = "internships";
const KEY_CERTIFICATES: &str = "certificates";

#[derive(Debug, Clone)]
pub struct StoreError {
    pub code: &'static str,
    pub message: String,
}

impl StoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            code: "validation",
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            code: "not_found",
            message: message.into(),
        }
    }

    pub fn duplicate(message: impl Into<String>) -> Self {
        Self {
            code: "duplicate",
            message: message.into(),
        }
    }

    pub fn protected(message: impl Into<String>) -> Self {
        Self {
            code: "protected",
            message: message.into(),
        }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self {
            code: "forbidden",
            message: message.into(),
        }
    }

    pub fn invalid_credentials() -> Self {
        Self {
            code: "invalid_credentials",
            message: "invalid id or password".to_string(),
        }
    }

    fn write_failed(e: anyhow::Error) -> Self {
        Self {
            code: "db_write_failed",
            message: e.to_string(),
        }
    }
}

/// Owned state container for the whole application: the user directory, the
/// academic ledger and the owned collections, loaded from the document store
/// at open and written back after every mutation.
pub struct Store {
    conn: Connection,
    users: Vec<User>,
    session: Option<User>,
    records: BTreeMap<String, Vec<SemesterRecord>>,
    projects: Vec<Project>,
    internships: Vec<Internship>,
    certificates: Vec<Certificate>,
}

impl Store {
    pub fn open(workspace: &Path) -> anyhow::Result<Store> {
        Self::from_conn(db::open_db(workspace)?)
    }

    pub fn open_in_memory() -> anyhow::Result<Store> {
        Self::from_conn(db::open_db_in_memory()?)
    }

    fn from_conn(conn: Connection) -> anyhow::Result<Store> {
        let users: Vec<User> = load_doc(&conn, KEY_USERS)?;
        let session: Option<User> = match db::doc_get(&conn, KEY_SESSION)? {
            Some(v) => serde_json::from_value(v)?,
            None => None,
        };
        let records: BTreeMap<String, Vec<SemesterRecord>> = load_doc(&conn, KEY_RECORDS)?;
        let projects: Vec<Project> = load_doc(&conn, KEY_PROJECTS)?;
        let internships: Vec<Internship> = load_doc(&conn, KEY_INTERNSHIPS)?;
        let certificates: Vec<Certificate> = load_doc(&conn, KEY_CERTIFICATES)?;

        let mut store = Store {
            conn,
            users,
            session,
            records,
            projects,
            internships,
            certificates,
        };

        if !store.users.iter().any(|u| u.id == SUPER_USER_ID) {
            store.users.push(User {
                id: SUPER_USER_ID.to_string(),
                name: "Administrator".to_string(),
                role: Role::Admin,
                password: SUPER_USER_PASSWORD.to_string(),
                department: None,
                roll_no: None,
                program: None,
                branch: None,
                gender: None,
                email: None,
                phone: None,
            });
            store.save(KEY_USERS, &store.users)?;
        }

        Ok(store)
    }

    fn save<T: Serialize>(&self, key: &str, value: &T) -> anyhow::Result<()> {
        db::doc_set(&self.conn, key, &serde_json::to_value(value)?)
    }

    fn persist<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StoreError> {
        self.save(key, value).map_err(StoreError::write_failed)
    }

    // ---- user directory ----

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn create_user(&mut self, mut user: User) -> Result<(), StoreError> {
        if user.id.trim().is_empty() {
            return Err(StoreError::validation("id must not be empty"));
        }
        if user.name.trim().is_empty() {
            return Err(StoreError::validation("name must not be empty"));
        }
        if user.password.is_empty() {
            return Err(StoreError::validation("password must not be empty"));
        }
        if self.users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::duplicate(format!(
                "user id already exists: {}",
                user.id
            )));
        }

        // Role-conditional fields default to empty values when absent.
        match user.role {
            Role::Teacher => {
                user.department.get_or_insert_with(String::new);
                user.gender.get_or_insert_with(String::new);
            }
            Role::Student => {
                user.roll_no.get_or_insert_with(String::new);
                user.program.get_or_insert_with(String::new);
                user.branch.get_or_insert_with(String::new);
            }
            Role::Admin => {}
        }

        self.users.push(user);
        self.persist(KEY_USERS, &self.users)
    }

    pub fn delete_user(&mut self, id: &str) -> Result<(), StoreError> {
        if id == SUPER_USER_ID {
            return Err(StoreError::protected(
                "the administrator account cannot be deleted",
            ));
        }
        let Some(pos) = self.users.iter().position(|u| u.id == id) else {
            return Err(StoreError::not_found(format!("user not found: {}", id)));
        };
        self.users.remove(pos);
        self.persist(KEY_USERS, &self.users)?;

        if self.session.as_ref().map(|s| s.id.as_str()) == Some(id) {
            self.logout()?;
        }
        Ok(())
    }

    pub fn update_profile(
        &mut self,
        id: &str,
        patch: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<User, StoreError> {
        let Some(pos) = self.users.iter().position(|u| u.id == id) else {
            return Err(StoreError::not_found(format!("user not found: {}", id)));
        };

        let mut merged = serde_json::to_value(&self.users[pos])
            .map_err(|e| StoreError::validation(e.to_string()))?;
        if let Some(obj) = merged.as_object_mut() {
            for (key, value) in patch {
                // id is immutable; the password has its own update path.
                if key == "id" || key == "password" {
                    continue;
                }
                obj.insert(key.clone(), value.clone());
            }
        }
        let updated: User =
            serde_json::from_value(merged).map_err(|e| StoreError::validation(e.to_string()))?;

        self.users[pos] = updated.clone();
        self.persist(KEY_USERS, &self.users)?;
        self.mirror_session(&updated)?;
        Ok(updated)
    }

    pub fn update_password(&mut self, id: &str, password: &str) -> Result<(), StoreError> {
        if password.is_empty() {
            return Err(StoreError::validation("password must not be empty"));
        }
        let Some(pos) = self.users.iter().position(|u| u.id == id) else {
            return Err(StoreError::not_found(format!("user not found: {}", id)));
        };
        self.users[pos].password = password.to_string();
        let updated = self.users[pos].clone();
        self.persist(KEY_USERS, &self.users)?;
        self.mirror_session(&updated)
    }

    fn mirror_session(&mut self, updated: &User) -> Result<(), StoreError> {
        if self.session.as_ref().map(|s| s.id.as_str()) == Some(updated.id.as_str()) {
            self.session = Some(updated.clone());
            self.persist(KEY_SESSION, &self.session)?;
        }
        Ok(())
    }

    // ---- session ----

    pub fn session(&self) -> Option<&User> {
        self.session.as_ref()
    }

    pub fn login(&mut self, id: &str, password: &str) -> Result<User, StoreError> {
        // Plaintext comparison, faithful to the system being replaced.
        let Some(user) = self.users.iter().find(|u| u.id == id) else {
            return Err(StoreError::invalid_credentials());
        };
        if user.password != password {
            return Err(StoreError::invalid_credentials());
        }
        let user = user.clone();
        self.session = Some(user.clone());
        self.persist(KEY_SESSION, &self.session)?;
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<(), StoreError> {
        self.session = None;
        db::doc_remove(&self.conn, KEY_SESSION).map_err(StoreError::write_failed)
    }

    // ---- academic ledger ----

    fn require_student(&self, student_id: &str) -> Result<&User, StoreError> {
        match self.find_user(student_id) {
            Some(u) if u.role == Role::Student => Ok(u),
            _ => Err(StoreError::not_found(format!(
                "student not found: {}",
                student_id
            ))),
        }
    }

    pub fn semester_records(&self, student_id: &str) -> &[SemesterRecord] {
        self.records.get(student_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Insert-only path: a second record for the same semester is rejected.
    pub fn add_semester_record(
        &mut self,
        student_id: &str,
        mut record: SemesterRecord,
    ) -> Result<SemesterRecord, StoreError> {
        self.require_student(student_id)?;
        if record.semester < 1 {
            return Err(StoreError::validation("semester must be positive"));
        }

        let existing = self.records.entry(student_id.to_string()).or_default();
        if existing.iter().any(|r| r.semester == record.semester) {
            return Err(StoreError::duplicate(format!(
                "record for semester {} already exists",
                record.semester
            )));
        }

        // sgpa is derived, never authored.
        record.sgpa = Some(calc::compute_sgpa(&record.subjects, &record.labs));
        existing.push(record.clone());
        self.persist(KEY_RECORDS, &self.records)?;
        Ok(record)
    }

    /// Idempotent upsert path: recomputes the SGPA and replaces or creates
    /// the record for that semester.
    pub fn update_marks(
        &mut self,
        student_id: &str,
        semester: i64,
        subjects: Vec<Subject>,
        labs: Vec<Laboratory>,
    ) -> Result<SemesterRecord, StoreError> {
        self.require_student(student_id)?;
        if semester < 1 {
            return Err(StoreError::validation("semester must be positive"));
        }

        let record = SemesterRecord {
            semester,
            sgpa: Some(calc::compute_sgpa(&subjects, &labs)),
            subjects,
            labs,
        };

        let existing = self.records.entry(student_id.to_string()).or_default();
        match existing.iter().position(|r| r.semester == semester) {
            Some(pos) => existing[pos] = record.clone(),
            None => existing.push(record.clone()),
        }
        self.persist(KEY_RECORDS, &self.records)?;
        Ok(record)
    }

    pub fn cgpa(&self, student_id: &str) -> f64 {
        calc::compute_cgpa(self.semester_records(student_id))
    }

    // ---- owned collections ----

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn internships(&self) -> &[Internship] {
        &self.internships
    }

    pub fn certificates(&self) -> &[Certificate] {
        &self.certificates
    }

    pub fn add_project(&mut self, project: Project) -> Result<(), StoreError> {
        self.projects.push(project);
        self.persist(KEY_PROJECTS, &self.projects)
    }

    pub fn delete_project(&mut self, id: &str, acting_id: &str) -> Result<(), StoreError> {
        remove_owned(&mut self.projects, id, acting_id, "project")?;
        self.persist(KEY_PROJECTS, &self.projects)
    }

    pub fn add_internship(&mut self, internship: Internship) -> Result<(), StoreError> {
        self.internships.push(internship);
        self.persist(KEY_INTERNSHIPS, &self.internships)
    }

    pub fn delete_internship(&mut self, id: &str, acting_id: &str) -> Result<(), StoreError> {
        remove_owned(&mut self.internships, id, acting_id, "internship")?;
        self.persist(KEY_INTERNSHIPS, &self.internships)
    }

    pub fn add_certificate(&mut self, certificate: Certificate) -> Result<(), StoreError> {
        self.certificates.push(certificate);
        self.persist(KEY_CERTIFICATES, &self.certificates)
    }

    pub fn delete_certificate(&mut self, id: &str, acting_id: &str) -> Result<(), StoreError> {
        remove_owned(&mut self.certificates, id, acting_id, "certificate")?;
        self.persist(KEY_CERTIFICATES, &self.certificates)
    }
}

fn load_doc<T: serde::de::DeserializeOwned + Default>(
    conn: &Connection,
    key: &str,
) -> anyhow::Result<T> {
    match db::doc_get(conn, key)? {
        Some(v) => Ok(serde_json::from_value(v)?),
        None => Ok(T::default()),
    }
}

/// Owner-only removal shared by all three owned collections.
fn remove_owned<T: Owned>(
    items: &mut Vec<T>,
    id: &str,
    acting_id: &str,
    kind: &str,
) -> Result<(), StoreError> {
    let Some(pos) = items.iter().position(|e| e.entity_id() == id) else {
        return Err(StoreError::not_found(format!("{} not found: {}", kind, id)));
    };
    if items[pos].owner_id() != acting_id {
        return Err(StoreError::forbidden(format!(
            "only the owner may delete this {}",
            kind
        )));
    }
    items.remove(pos);
    Ok(())
}
