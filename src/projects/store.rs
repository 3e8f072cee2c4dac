use super::{Project, ProjectParams, User};
use crate::error::{Result, ServiceError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Persistence seam for the project resource. Creator usernames are
/// validated against the user set held by the same store.
#[async_trait]
pub trait ProjectStore: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>>;
    async fn get_project(&self, acronym: &str) -> Result<Option<Project>>;
    async fn create_project(&self, project: Project) -> Result<Project>;
    async fn update_project(&self, acronym: &str, params: ProjectParams) -> Result<()>;
    async fn delete_project(&self, acronym: &str) -> Result<()>;

    async fn get_user(&self, username: &str) -> Result<Option<User>>;
    async fn create_user(&self, user: User) -> Result<User>;
}

/// In-memory store implementation for development/testing
pub struct InMemoryProjectStore {
    projects: Arc<Mutex<HashMap<String, Project>>>,
    users: Arc<Mutex<HashMap<String, User>>>,
}

impl Default for InMemoryProjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryProjectStore {
    pub fn new() -> Self {
        Self {
            projects: Arc::new(Mutex::new(HashMap::new())),
            users: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    fn check_creators(&self, usernames: &[String]) -> Result<()> {
        if usernames.is_empty() {
            return Err(ServiceError::Validation(
                "at least one creator is required".to_string(),
            ));
        }
        let users = self.users.lock().unwrap();
        for username in usernames {
            if !users.contains_key(username) {
                return Err(ServiceError::Validation(format!(
                    "creator does not exist: {username}"
                )));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ProjectStore for InMemoryProjectStore {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let projects = self.projects.lock().unwrap();
        let mut all: Vec<Project> = projects.values().cloned().collect();
        all.sort_by(|a, b| a.acronym.cmp(&b.acronym));
        Ok(all)
    }

    async fn get_project(&self, acronym: &str) -> Result<Option<Project>> {
        let projects = self.projects.lock().unwrap();
        Ok(projects.get(acronym).cloned())
    }

    async fn create_project(&self, project: Project) -> Result<Project> {
        self.check_creators(&project.creator)?;

        let mut projects = self.projects.lock().unwrap();
        if projects.contains_key(&project.acronym) {
            return Err(ServiceError::Conflict(format!(
                "project already exists: {}",
                project.acronym
            )));
        }
        projects.insert(project.acronym.clone(), project.clone());

        debug!("Created project {}", project.acronym);
        Ok(project)
    }

    async fn update_project(&self, acronym: &str, params: ProjectParams) -> Result<()> {
        if let Some(creator) = &params.creator {
            self.check_creators(creator)?;
        }

        let mut projects = self.projects.lock().unwrap();
        let project = projects
            .get_mut(acronym)
            .ok_or_else(|| ServiceError::NotFound(format!("project not found: {acronym}")))?;
        project.apply(params);

        debug!("Updated project {acronym}");
        Ok(())
    }

    async fn delete_project(&self, acronym: &str) -> Result<()> {
        let mut projects = self.projects.lock().unwrap();
        projects
            .remove(acronym)
            .ok_or_else(|| ServiceError::NotFound(format!("project not found: {acronym}")))?;

        debug!("Deleted project {acronym}");
        Ok(())
    }

    async fn get_user(&self, username: &str) -> Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.get(username).cloned())
    }

    async fn create_user(&self, user: User) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        if users.contains_key(&user.username) {
            return Err(ServiceError::Conflict(format!(
                "user already exists: {}",
                user.username
            )));
        }
        users.insert(user.username.clone(), user.clone());
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store_with_user(username: &str) -> InMemoryProjectStore {
        let store = InMemoryProjectStore::new();
        store
            .create_user(User {
                username: username.to_string(),
                email: format!("{username}@example.org"),
            })
            .await
            .unwrap();
        store
    }

    fn project(acronym: &str, creator: &str) -> Project {
        Project::from_params(
            acronym.to_string(),
            ProjectParams {
                name: Some("Test Project".to_string()),
                description: Some("A test project".to_string()),
                home_page: Some("http://www.example.org".to_string()),
                creator: Some(vec![creator.to_string()]),
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = store_with_user("test_user").await;
        store
            .create_project(project("TP", "test_user"))
            .await
            .unwrap();

        let fetched = store.get_project("TP").await.unwrap().unwrap();
        assert_eq!(fetched.name, "Test Project");
        assert_eq!(store.list_projects().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_acronym_conflicts() {
        let store = store_with_user("test_user").await;
        store
            .create_project(project("TP", "test_user"))
            .await
            .unwrap();

        let err = store
            .create_project(project("TP", "test_user"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn unknown_creator_fails_validation() {
        let store = store_with_user("test_user").await;
        let err = store
            .create_project(project("TP", "user_does_not_exist"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(store.get_project("TP").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn delete_removes_the_project() {
        let store = store_with_user("test_user").await;
        store
            .create_project(project("TP", "test_user"))
            .await
            .unwrap();

        store.delete_project("TP").await.unwrap();
        assert!(store.get_project("TP").await.unwrap().is_none());

        let err = store.delete_project("TP").await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_of_missing_project_is_not_found() {
        let store = store_with_user("test_user").await;
        let err = store
            .update_project("NOPE", ProjectParams::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
