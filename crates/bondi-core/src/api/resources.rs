//! Typed helpers for the API server's resources.
//!
//! Each helper builds the endpoint URL, dispatches through the
//! auto-authenticating client and parses the response envelope.

use tracing::debug;

use super::response::{collect_all, parse_empty, parse_result};
use super::transport::Transport;
use super::AutologinClient;
use crate::models::{
    is_identifier, Crash, CreatedFuzzer, CreatedProject, CreatedUser, DeleteAction, Fuzzer,
    FuzzerConfigurations, NewFuzzer, NewProject, NewUser, Project, ProjectUpdate, Revision,
    RevisionAction, User, UserPool, UserUpdate,
};
use crate::{ClientError, Result};

const URL_META: &str = "/api/v1/meta";
const URL_USERS: &str = "/api/v1/admin/users";

fn url_projects(user_id: &str) -> String {
    format!("/api/v1/users/{}/projects", user_id)
}

fn url_project(user_id: &str, project_id: &str) -> String {
    format!("{}/{}", url_projects(user_id), project_id)
}

fn url_fuzzers(user_id: &str, project_id: &str) -> String {
    format!("{}/fuzzers", url_project(user_id, project_id))
}

fn url_fuzzer(user_id: &str, project_id: &str, fuzzer_id: &str) -> String {
    format!("{}/{}", url_fuzzers(user_id, project_id), fuzzer_id)
}

fn url_revisions(user_id: &str, project_id: &str, fuzzer_id: &str) -> String {
    format!("{}/revisions", url_fuzzer(user_id, project_id, fuzzer_id))
}

fn url_revision(user_id: &str, project_id: &str, fuzzer_id: &str, revision_id: &str) -> String {
    format!("{}/{}", url_revisions(user_id, project_id, fuzzer_id), revision_id)
}

fn url_crashes(user_id: &str, project_id: &str, fuzzer_id: &str) -> String {
    format!("{}/crashes", url_fuzzer(user_id, project_id, fuzzer_id))
}

fn url_pools(user_id: &str) -> String {
    format!("/api/v1/users/{}/pools", user_id)
}

/// Lookup endpoints answer an unknown name with a validation error only when
/// the request itself was malformed, which the client never sends.
fn lookup_error(e: ClientError) -> ClientError {
    match e {
        ClientError::Validation(errors) => {
            ClientError::internal(format!("lookup rejected: {} field error(s)", errors.len()))
        }
        other => other,
    }
}

impl<T: Transport> AutologinClient<T> {
    // ===== Meta =====

    pub async fn list_fuzzer_configurations(&self) -> Result<FuzzerConfigurations> {
        let response = self
            .get(&format!("{}/fuzzers/configurations", URL_META))
            .await?;
        parse_result(&response)
    }

    // ===== Users =====

    pub async fn list_users(&self) -> Result<Vec<User>> {
        collect_all(self, URL_USERS.to_string(), Vec::new()).await
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        let response = self.get(&format!("{}/{}", URL_USERS, user_id)).await?;
        parse_result(&response)
    }

    pub async fn lookup_user(&self, name: &str) -> Result<User> {
        let response = self
            .get_with_query(&format!("{}/lookup", URL_USERS), &[("name", name)])
            .await?;
        parse_result(&response).map_err(lookup_error)
    }

    /// Id of the owner of user-scoped URLs: the given user (name or id), or
    /// the logged-in user when none is given.
    pub async fn resolve_user_id(&self, user: Option<&str>) -> Result<String> {
        match user {
            Some(user) if is_identifier(user) => Ok(user.to_string()),
            Some(user) => Ok(self.lookup_user(user).await?.id),
            None => self
                .session()
                .map(|session| session.user_id)
                .ok_or_else(|| ClientError::internal("no session to take the user id from")),
        }
    }

    pub async fn create_user(&self, user: &NewUser) -> Result<CreatedUser> {
        let response = self.post_json(URL_USERS, user).await?;
        parse_result(&response)
    }

    pub async fn update_user(&self, user_id: &str, update: &UserUpdate) -> Result<()> {
        let response = self
            .patch_json(&format!("{}/{}", URL_USERS, user_id), update)
            .await?;
        parse_empty(&response)
    }

    /// Move an account to the trash bin, restore or erase it. `keep_backup`
    /// only matters for erasure.
    pub async fn delete_user(&self, user_id: &str, action: DeleteAction, keep_backup: bool) -> Result<()> {
        let mut query = vec![("action", action.as_str())];
        if action == DeleteAction::Erase {
            query.push(("no_backup", if keep_backup { "false" } else { "true" }));
        }
        let response = self
            .delete_with_query(&format!("{}/{}", URL_USERS, user_id), &query)
            .await?;
        parse_empty(&response)
    }

    // ===== Pools =====

    pub async fn list_pools(&self, user_id: &str) -> Result<Vec<UserPool>> {
        collect_all(self, url_pools(user_id), Vec::new()).await
    }

    pub async fn get_pool(&self, user_id: &str, pool_id: &str) -> Result<UserPool> {
        let response = self
            .get(&format!("{}/{}", url_pools(user_id), pool_id))
            .await?;
        parse_result(&response)
    }

    // ===== Projects =====

    pub async fn list_projects(&self, user_id: &str) -> Result<Vec<Project>> {
        collect_all(self, url_projects(user_id), Vec::new()).await
    }

    pub async fn get_project(&self, user_id: &str, project_id: &str) -> Result<Project> {
        let response = self.get(&url_project(user_id, project_id)).await?;
        parse_result(&response)
    }

    pub async fn lookup_project(&self, user_id: &str, name: &str) -> Result<Project> {
        let path = format!("{}/lookup", url_projects(user_id));
        let response = self.get_with_query(&path, &[("name", name)]).await?;
        parse_result(&response).map_err(lookup_error)
    }

    pub async fn resolve_project_id(&self, user_id: &str, project: &str) -> Result<String> {
        if is_identifier(project) {
            return Ok(project.to_string());
        }
        let id = self.lookup_project(user_id, project).await?.id;
        debug!(project = %project, id = %id, "Resolved project name");
        Ok(id)
    }

    pub async fn create_project(&self, user_id: &str, project: &NewProject) -> Result<CreatedProject> {
        let response = self.post_json(&url_projects(user_id), project).await?;
        parse_result(&response)
    }

    pub async fn update_project(
        &self,
        user_id: &str,
        project_id: &str,
        update: &ProjectUpdate,
    ) -> Result<()> {
        let response = self
            .patch_json(&url_project(user_id, project_id), update)
            .await?;
        parse_empty(&response)
    }

    pub async fn delete_project(
        &self,
        user_id: &str,
        project_id: &str,
        action: DeleteAction,
    ) -> Result<()> {
        let response = self
            .delete_with_query(&url_project(user_id, project_id), &[("action", action.as_str())])
            .await?;
        parse_empty(&response)
    }

    // ===== Fuzzers =====

    pub async fn list_fuzzers(&self, user_id: &str, project_id: &str) -> Result<Vec<Fuzzer>> {
        collect_all(self, url_fuzzers(user_id, project_id), Vec::new()).await
    }

    pub async fn get_fuzzer(&self, user_id: &str, project_id: &str, fuzzer_id: &str) -> Result<Fuzzer> {
        let response = self.get(&url_fuzzer(user_id, project_id, fuzzer_id)).await?;
        parse_result(&response)
    }

    pub async fn lookup_fuzzer(&self, user_id: &str, project_id: &str, name: &str) -> Result<Fuzzer> {
        let path = format!("{}/lookup", url_fuzzers(user_id, project_id));
        let response = self.get_with_query(&path, &[("name", name)]).await?;
        parse_result(&response).map_err(lookup_error)
    }

    pub async fn resolve_fuzzer_id(&self, user_id: &str, project_id: &str, fuzzer: &str) -> Result<String> {
        if is_identifier(fuzzer) {
            return Ok(fuzzer.to_string());
        }
        Ok(self.lookup_fuzzer(user_id, project_id, fuzzer).await?.id)
    }

    pub async fn create_fuzzer(
        &self,
        user_id: &str,
        project_id: &str,
        fuzzer: &NewFuzzer,
    ) -> Result<CreatedFuzzer> {
        let response = self
            .post_json(&url_fuzzers(user_id, project_id), fuzzer)
            .await?;
        parse_result(&response)
    }

    pub async fn delete_fuzzer(
        &self,
        user_id: &str,
        project_id: &str,
        fuzzer_id: &str,
        action: DeleteAction,
    ) -> Result<()> {
        let response = self
            .delete_with_query(
                &url_fuzzer(user_id, project_id, fuzzer_id),
                &[("action", action.as_str())],
            )
            .await?;
        parse_empty(&response)
    }

    // ===== Revisions =====

    pub async fn list_revisions(&self, user_id: &str, project_id: &str, fuzzer_id: &str) -> Result<Vec<Revision>> {
        collect_all(self, url_revisions(user_id, project_id, fuzzer_id), Vec::new()).await
    }

    pub async fn get_revision(
        &self,
        user_id: &str,
        project_id: &str,
        fuzzer_id: &str,
        revision_id: &str,
    ) -> Result<Revision> {
        let response = self
            .get(&url_revision(user_id, project_id, fuzzer_id, revision_id))
            .await?;
        parse_result(&response)
    }

    pub async fn lookup_revision(
        &self,
        user_id: &str,
        project_id: &str,
        fuzzer_id: &str,
        name: &str,
    ) -> Result<Revision> {
        let path = format!("{}/lookup", url_revisions(user_id, project_id, fuzzer_id));
        let response = self.get_with_query(&path, &[("name", name)]).await?;
        parse_result(&response).map_err(lookup_error)
    }

    pub async fn resolve_revision_id(
        &self,
        user_id: &str,
        project_id: &str,
        fuzzer_id: &str,
        revision: &str,
    ) -> Result<String> {
        if is_identifier(revision) {
            return Ok(revision.to_string());
        }
        Ok(self
            .lookup_revision(user_id, project_id, fuzzer_id, revision)
            .await?
            .id)
    }

    /// Start, restart or stop a revision.
    pub async fn control_revision(
        &self,
        user_id: &str,
        project_id: &str,
        fuzzer_id: &str,
        revision_id: &str,
        action: RevisionAction,
    ) -> Result<()> {
        let path = format!(
            "{}/actions/{}",
            url_revision(user_id, project_id, fuzzer_id, revision_id),
            action.as_str()
        );
        let response = self.post(&path).await?;
        parse_empty(&response)
    }

    // ===== Crashes =====

    /// Crashes found by a fuzzer, or by one of its revisions.
    pub async fn list_crashes(
        &self,
        user_id: &str,
        project_id: &str,
        fuzzer_id: &str,
        revision_id: Option<&str>,
    ) -> Result<Vec<Crash>> {
        let path = match revision_id {
            Some(revision_id) => format!(
                "{}/crashes",
                url_revision(user_id, project_id, fuzzer_id, revision_id)
            ),
            None => url_crashes(user_id, project_id, fuzzer_id),
        };
        collect_all(self, path, Vec::new()).await
    }

    pub async fn get_crash(&self, user_id: &str, project_id: &str, fuzzer_id: &str, crash_id: &str) -> Result<Crash> {
        let path = format!("{}/{}", url_crashes(user_id, project_id, fuzzer_id), crash_id);
        let response = self.get(&path).await?;
        parse_result(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use reqwest::{Method, StatusCode};
    use serde_json::json;

    use crate::api::transport::{HttpRequest, HttpResponse, TransportError};
    use crate::auth::{Credentials, MemorySessionStore, Session};
    use crate::config::AuthConfig;
    use crate::models::{NewPool, DEFAULT_DESCRIPTION};

    /// Records requests and answers from a fixed routing function.
    struct Recorder {
        requests: Mutex<Vec<HttpRequest>>,
        route: fn(&HttpRequest) -> HttpResponse,
    }

    #[async_trait]
    impl Transport for Recorder {
        async fn send(&self, request: HttpRequest) -> std::result::Result<HttpResponse, TransportError> {
            let response = (self.route)(&request);
            self.requests.lock().unwrap().push(request);
            Ok(response)
        }
    }

    impl AutologinClient<Recorder> {
        fn recorded(&self) -> Vec<HttpRequest> {
            self.transport().requests.lock().unwrap().clone()
        }
    }

    fn client(route: fn(&HttpRequest) -> HttpResponse) -> AutologinClient<Recorder> {
        let credentials =
            Credentials::new(AuthConfig::new("http://bondi.test", "alice", "pw").unwrap()).unwrap();
        let store = MemorySessionStore::with_session(Session {
            user_id: "1001".into(),
            session_token: "tok".into(),
            display_name: "Alice".into(),
            user_name: "alice".into(),
            is_admin: false,
        });
        let transport = Recorder {
            requests: Mutex::new(Vec::new()),
            route,
        };
        AutologinClient::new(credentials, Box::new(store), transport)
    }

    fn ok(result: serde_json::Value) -> HttpResponse {
        HttpResponse::new(StatusCode::OK).with_json(&json!({ "result": result }))
    }

    fn project(id: &str, name: &str) -> serde_json::Value {
        json!({"id": id, "name": name, "description": "d", "pool": null})
    }

    fn pg_num(request: &HttpRequest) -> u64 {
        request
            .url
            .query_pairs()
            .find(|(k, _)| k == "pg_num")
            .map(|(_, v)| v.parse().unwrap())
            .unwrap()
    }

    #[tokio::test]
    async fn test_list_projects_walks_pages() {
        let client = client(|request| match pg_num(request) {
            0 => ok(json!({"items": [project("1", "a"), project("2", "b")], "pg_size": 2})),
            1 => ok(json!({"items": [project("3", "c")], "pg_size": 2})),
            _ => panic!("requested a page past the short one"),
        });

        let projects = client.list_projects("1001").await.unwrap();

        let names: Vec<_> = projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["a", "b", "c"]);
        let requests = client.recorded();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[0].url.path(), "/api/v1/users/1001/projects");
    }

    #[tokio::test]
    async fn test_pagination_stops_on_empty_page() {
        let client = client(|request| match pg_num(request) {
            0 => ok(json!({"items": [project("1", "a")], "pg_size": 1})),
            _ => ok(json!({"items": [], "pg_size": 1})),
        });

        let projects = client.list_projects("1001").await.unwrap();

        assert_eq!(projects.len(), 1);
        assert_eq!(client.recorded().len(), 2);
    }

    #[tokio::test]
    async fn test_resolve_project_by_name_uses_lookup() {
        let client = client(|request| {
            assert_eq!(request.url.path(), "/api/v1/users/1001/projects/lookup");
            assert_eq!(request.url.query(), Some("name=libpng"));
            ok(project("2001", "libpng"))
        });

        assert_eq!(client.resolve_project_id("1001", "libpng").await.unwrap(), "2001");
        assert_eq!(client.resolve_project_id("1001", "2002").await.unwrap(), "2002");
        assert_eq!(client.recorded().len(), 1);
    }

    #[tokio::test]
    async fn test_resolve_user_defaults_to_session() {
        let client = client(|_| panic!("no request expected"));
        assert_eq!(client.resolve_user_id(None).await.unwrap(), "1001");
        assert_eq!(client.resolve_user_id(Some("77")).await.unwrap(), "77");
    }

    #[tokio::test]
    async fn test_lookup_validation_error_is_internal() {
        let client = client(|_| {
            HttpResponse::new(StatusCode::UNPROCESSABLE_ENTITY).with_json(&json!({
                "detail": [{"loc": ["query", "name"], "msg": "field required", "type": "value_error.missing"}]
            }))
        });

        let err = client.lookup_user("bob").await.unwrap_err();
        assert!(matches!(err, ClientError::Internal(_)));
    }

    #[tokio::test]
    async fn test_create_project_sends_pool() {
        let client = client(|request| {
            assert_eq!(request.method, Method::POST);
            let body: serde_json::Value =
                serde_json::from_slice(request.body.as_deref().unwrap()).unwrap();
            assert_eq!(body["pool"]["node_cpu"], 2);
            assert_eq!(body["description"], DEFAULT_DESCRIPTION);
            HttpResponse::new(StatusCode::CREATED).with_json(&json!({"result": {
                "id": "2001", "name": "libpng",
                "pool": {
                    "id": "3001", "status": "Creating",
                    "node_group": {"node_cpu": 2, "node_ram": 4, "node_count": 1},
                    "resources": {"cpu": 0, "ram": 0, "nodes": 0},
                    "fuzzer_limits": {
                        "cpu": {"min_value": 0, "max_value": 0},
                        "ram": {"min_value": 0, "max_value": 0},
                        "tmpfs": {"min_value": 0, "max_value": 0},
                        "ram_total": {"min_value": 0, "max_value": 0}
                    }
                }
            }}))
        });

        let new_project = NewProject {
            name: "libpng".into(),
            description: DEFAULT_DESCRIPTION.into(),
            pool: NewPool {
                node_cpu: 2,
                node_ram: 4,
            },
        };
        let created = client.create_project("1001", &new_project).await.unwrap();
        assert_eq!(created.id, "2001");
    }

    #[tokio::test]
    async fn test_delete_fuzzer_sends_action() {
        let client = client(|request| {
            assert_eq!(request.method, Method::DELETE);
            assert_eq!(
                request.url.path(),
                "/api/v1/users/1001/projects/2001/fuzzers/4001"
            );
            assert_eq!(request.url.query(), Some("action=erase"));
            HttpResponse::new(StatusCode::NO_CONTENT)
        });

        client
            .delete_fuzzer("1001", "2001", "4001", DeleteAction::Erase)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_api_error_is_surfaced() {
        let client = client(|_| {
            HttpResponse::new(StatusCode::FORBIDDEN).with_json(&json!({
                "error": {"code": "E_ACCESS_DENIED", "message": "Access denied"}
            }))
        });

        let err = client.get_project("1001", "2001").await.unwrap_err();
        assert!(matches!(err, ClientError::Api { ref code, .. } if code == "E_ACCESS_DENIED"));
        assert!(!err.is_auth_failure());
    }

    #[tokio::test]
    async fn test_requests_carry_session_cookies() {
        let client = client(|_| ok(json!({"Rust": ["cargo-fuzz"]})));

        let configs = client.list_fuzzer_configurations().await.unwrap();

        assert_eq!(configs.engines("Rust").unwrap(), ["cargo-fuzz"]);
        let request = &client.recorded()[0];
        assert_eq!(request.cookie("SESSION_ID").as_deref(), Some("tok"));
        assert_eq!(request.url.path(), "/api/v1/meta/fuzzers/configurations");
    }

    #[tokio::test]
    async fn test_erase_user_sends_backup_flag() {
        let client = client(|request| {
            assert_eq!(request.method, Method::DELETE);
            assert_eq!(request.url.path(), "/api/v1/admin/users/77");
            assert_eq!(request.url.query(), Some("action=erase&no_backup=true"));
            HttpResponse::new(StatusCode::NO_CONTENT)
        });

        client.delete_user("77", DeleteAction::Erase, false).await.unwrap();
    }

    #[tokio::test]
    async fn test_revision_crashes_use_revision_path() {
        let client = client(|request| {
            assert_eq!(
                request.url.path(),
                "/api/v1/users/1001/projects/2001/fuzzers/4001/revisions/5001/crashes"
            );
            ok(json!({"items": [{
                "id": "9", "created": "2026-03-01T10:00:00Z", "preview": "QUFB",
                "type": "crash", "brief": "heap-buffer-overflow", "details": null,
                "reproduced": true, "duplicate_count": 3
            }], "pg_size": 10}))
        });

        let crashes = client
            .list_crashes("1001", "2001", "4001", Some("5001"))
            .await
            .unwrap();

        assert_eq!(crashes.len(), 1);
        assert_eq!(crashes[0].kind, "crash");
        assert_eq!(crashes[0].duplicate_count, 3);
    }

    #[tokio::test]
    async fn test_stop_revision_posts_action() {
        let client = client(|request| {
            assert_eq!(request.method, Method::POST);
            assert_eq!(
                request.url.path(),
                "/api/v1/users/1001/projects/2001/fuzzers/4001/revisions/5001/actions/stop"
            );
            assert!(request.body.is_none());
            ok(json!(null))
        });

        client
            .control_revision("1001", "2001", "4001", "5001", RevisionAction::Stop)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_pools() {
        let client = client(|request| {
            assert_eq!(request.url.path(), "/api/v1/users/1001/pools");
            ok(json!({"items": [{"id": "3001", "resources": {
                "cpu_total": 4000, "ram_total": 8192, "nodes_total": 2,
                "cpu_avail": 4000, "ram_avail": 8192, "nodes_avail": 2,
                "fuzzer_max_cpu": 2000, "fuzzer_max_ram": 4096
            }}], "pg_size": 10}))
        });

        let pools = client.list_pools("1001").await.unwrap();
        assert_eq!(pools[0].id, "3001");
    }
}
