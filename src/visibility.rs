use crate::model::{Owned, Role, User};

/// The single read-scope predicate, derived once from the acting user and
/// applied identically to projects, internships, certificates and the
/// student directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Admin: unrestricted.
    All,
    /// Teacher: entities whose owner shares the department value.
    Department(String),
    /// Student: strictly their own records.
    Owner(String),
    /// Unauthenticated or otherwise unknown actor.
    Nobody,
}

pub fn scope_for(session: Option<&User>) -> Scope {
    let Some(user) = session else {
        return Scope::Nobody;
    };
    match user.role {
        Role::Admin => Scope::All,
        Role::Teacher => Scope::Department(user.department.clone().unwrap_or_default()),
        Role::Student => Scope::Owner(user.id.clone()),
    }
}

impl Scope {
    pub fn permits(&self, owner_id: &str, owner_department: Option<&str>) -> bool {
        match self {
            Scope::All => true,
            Scope::Department(dept) => owner_department == Some(dept.as_str()),
            Scope::Owner(id) => owner_id == id,
            Scope::Nobody => false,
        }
    }
}

/// Filter an owned collection, resolving each entity's owner through the
/// user directory to read the department attribute.
pub fn visible_owned<'a, T: Owned>(scope: &Scope, items: &'a [T], directory: &[User]) -> Vec<&'a T> {
    items
        .iter()
        .filter(|item| {
            let dept = directory
                .iter()
                .find(|u| u.id == item.owner_id())
                .and_then(|u| u.department_key());
            scope.permits(item.owner_id(), dept)
        })
        .collect()
}

/// The student directory listing uses the same predicate; a student record
/// is its own owner.
pub fn visible_students<'a>(scope: &Scope, directory: &'a [User]) -> Vec<&'a User> {
    directory
        .iter()
        .filter(|u| u.role == Role::Student && scope.permits(&u.id, u.department_key()))
        .collect()
}
