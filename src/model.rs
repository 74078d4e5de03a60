use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Teacher,
    Student,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll_no: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl User {
    /// The attribute department scoping compares against: teachers carry an
    /// explicit department, students are grouped by their branch.
    pub fn department_key(&self) -> Option<&str> {
        match self.role {
            Role::Teacher => self.department.as_deref(),
            Role::Student => self.branch.as_deref(),
            Role::Admin => None,
        }
    }

    pub fn snapshot(&self) -> OwnerSnapshot {
        OwnerSnapshot {
            id: self.id.clone(),
            name: self.name.clone(),
            role: self.role,
            department: self.department_key().map(|s| s.to_string()),
        }
    }

    /// Wire representation without the password field.
    pub fn sanitized(&self) -> serde_json::Value {
        let mut v = serde_json::to_value(self).unwrap_or_default();
        if let Some(obj) = v.as_object_mut() {
            obj.remove("password");
        }
        v
    }
}

/// Denormalized owner data carried on certificates so department filtering
/// does not need a directory lookup.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerSnapshot {
    pub id: String,
    pub name: String,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
    pub name: String,
    #[serde(default)]
    pub mid1: Option<i64>,
    #[serde(default)]
    pub mid2: Option<i64>,
    #[serde(default)]
    pub sem_exam: Option<i64>,
    #[serde(default)]
    pub credits: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Laboratory {
    pub name: String,
    #[serde(default)]
    pub marks: Option<i64>,
    #[serde(default)]
    pub credits: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemesterRecord {
    pub semester: i64,
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub labs: Vec<Laboratory>,
    #[serde(default)]
    pub sgpa: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub technologies: String,
    pub start_date: String,
    pub end_date: String,
    pub student_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Internship {
    pub id: String,
    pub company: String,
    pub role: String,
    pub description: String,
    pub start_date: String,
    pub end_date: String,
    pub student_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: String,
    pub name: String,
    pub issuing_authority: String,
    pub issue_date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    pub upload_date: String,
    pub user_id: String,
    pub user_data: OwnerSnapshot,
}

/// Entities that belong to a single student and are scoped by the
/// visibility predicate.
pub trait Owned {
    fn entity_id(&self) -> &str;
    fn owner_id(&self) -> &str;
}

impl Owned for Project {
    fn entity_id(&self) -> &str {
        &self.id
    }
    fn owner_id(&self) -> &str {
        &self.student_id
    }
}

impl Owned for Internship {
    fn entity_id(&self) -> &str {
        &self.id
    }
    fn owner_id(&self) -> &str {
        &self.student_id
    }
}

impl Owned for Certificate {
    fn entity_id(&self) -> &str {
        &self.id
    }
    fn owner_id(&self) -> &str {
        &self.user_id
    }
}
