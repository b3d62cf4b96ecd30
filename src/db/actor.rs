use crate::db::schema::{ACTIVE_PROJECT_KEY, MODEL_CONFIGS_KEY, PROJECTS_KEY, SQLITE_INIT};
use crate::error::StoreError;
use chrono::Utc;
use promptdock_schema::{ModelConfig, Project, ProjectVersion};
use ractor::{Actor, ActorProcessingErr, ActorRef, RpcReplyPort};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use std::{str::FromStr, time::Duration};
use tracing::info;

#[derive(Debug)]
pub enum StoreActorMessage {
    /// Load the whole project collection.
    LoadProjects(RpcReplyPort<Result<Vec<Project>, StoreError>>),

    /// Get one project by id.
    GetProject(String, RpcReplyPort<Result<Option<Project>, StoreError>>),

    /// Insert or replace one project (whole-collection rewrite).
    SaveProject(Project, RpcReplyPort<Result<(), StoreError>>),

    /// Delete one project by id.
    DeleteProject(String, RpcReplyPort<Result<(), StoreError>>),

    /// Append a version to a project's history.
    AddVersion(
        String,
        ProjectVersion,
        RpcReplyPort<Result<(), StoreError>>,
    ),

    /// Read the active project id.
    ActiveProject(RpcReplyPort<Result<Option<String>, StoreError>>),

    /// Set or clear the active project id.
    SetActiveProject(Option<String>, RpcReplyPort<Result<(), StoreError>>),

    /// Load the model-configuration collection.
    ListModelConfigs(RpcReplyPort<Result<Vec<ModelConfig>, StoreError>>),

    /// Insert or replace a model configuration, keyed by name.
    UpsertModelConfig(ModelConfig, RpcReplyPort<Result<(), StoreError>>),

    /// Delete a model configuration by name.
    DeleteModelConfig(String, RpcReplyPort<Result<(), StoreError>>),

    /// Drop every fixed key.
    ClearAll(RpcReplyPort<Result<(), StoreError>>),
}

#[derive(Clone)]
pub struct StoreHandle {
    actor: ActorRef<StoreActorMessage>,
}

impl StoreHandle {
    pub async fn load_projects(&self) -> Result<Vec<Project>, StoreError> {
        ractor::call!(self.actor, StoreActorMessage::LoadProjects)
            .map_err(|e| StoreError::Actor(format!("StoreActor LoadProjects RPC failed: {e}")))?
    }

    pub async fn get_project(&self, project_id: &str) -> Result<Option<Project>, StoreError> {
        ractor::call!(
            self.actor,
            StoreActorMessage::GetProject,
            project_id.to_string()
        )
        .map_err(|e| StoreError::Actor(format!("StoreActor GetProject RPC failed: {e}")))?
    }

    pub async fn save_project(&self, project: Project) -> Result<(), StoreError> {
        ractor::call!(self.actor, StoreActorMessage::SaveProject, project)
            .map_err(|e| StoreError::Actor(format!("StoreActor SaveProject RPC failed: {e}")))?
    }

    pub async fn delete_project(&self, project_id: &str) -> Result<(), StoreError> {
        ractor::call!(
            self.actor,
            StoreActorMessage::DeleteProject,
            project_id.to_string()
        )
        .map_err(|e| StoreError::Actor(format!("StoreActor DeleteProject RPC failed: {e}")))?
    }

    pub async fn add_version(
        &self,
        project_id: &str,
        version: ProjectVersion,
    ) -> Result<(), StoreError> {
        ractor::call!(
            self.actor,
            StoreActorMessage::AddVersion,
            project_id.to_string(),
            version
        )
        .map_err(|e| StoreError::Actor(format!("StoreActor AddVersion RPC failed: {e}")))?
    }

    pub async fn active_project(&self) -> Result<Option<String>, StoreError> {
        ractor::call!(self.actor, StoreActorMessage::ActiveProject)
            .map_err(|e| StoreError::Actor(format!("StoreActor ActiveProject RPC failed: {e}")))?
    }

    pub async fn set_active_project(&self, project_id: Option<String>) -> Result<(), StoreError> {
        ractor::call!(self.actor, StoreActorMessage::SetActiveProject, project_id).map_err(|e| {
            StoreError::Actor(format!("StoreActor SetActiveProject RPC failed: {e}"))
        })?
    }

    pub async fn list_model_configs(&self) -> Result<Vec<ModelConfig>, StoreError> {
        ractor::call!(self.actor, StoreActorMessage::ListModelConfigs).map_err(|e| {
            StoreError::Actor(format!("StoreActor ListModelConfigs RPC failed: {e}"))
        })?
    }

    pub async fn upsert_model_config(&self, config: ModelConfig) -> Result<(), StoreError> {
        ractor::call!(self.actor, StoreActorMessage::UpsertModelConfig, config).map_err(|e| {
            StoreError::Actor(format!("StoreActor UpsertModelConfig RPC failed: {e}"))
        })?
    }

    pub async fn delete_model_config(&self, name: &str) -> Result<(), StoreError> {
        ractor::call!(
            self.actor,
            StoreActorMessage::DeleteModelConfig,
            name.to_string()
        )
        .map_err(|e| StoreError::Actor(format!("StoreActor DeleteModelConfig RPC failed: {e}")))?
    }

    pub async fn clear_all(&self) -> Result<(), StoreError> {
        ractor::call!(self.actor, StoreActorMessage::ClearAll)
            .map_err(|e| StoreError::Actor(format!("StoreActor ClearAll RPC failed: {e}")))?
    }
}

struct StoreActorState {
    pool: SqlitePool,
}

struct StoreActor;

#[ractor::async_trait]
impl Actor for StoreActor {
    type Msg = StoreActorMessage;
    type State = StoreActorState;
    type Arguments = String;

    async fn pre_start(
        &self,
        _myself: ActorRef<Self::Msg>,
        database_url: Self::Arguments,
    ) -> Result<Self::State, ActorProcessingErr> {
        let connect_opts = SqliteConnectOptions::from_str(database_url.as_str())
            .map_err(|e| ActorProcessingErr::from(format!("invalid database url: {e}")))?
            .create_if_missing(true)
            .busy_timeout(Duration::from_secs(5))
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .connect_with(connect_opts)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db connect failed: {e}")))?;

        sqlx::query(SQLITE_INIT)
            .execute(&pool)
            .await
            .map_err(|e| ActorProcessingErr::from(format!("db schema init failed: {e}")))?;

        info!("StoreActor initialized");
        Ok(StoreActorState { pool })
    }

    async fn handle(
        &self,
        _myself: ActorRef<Self::Msg>,
        message: Self::Msg,
        state: &mut Self::State,
    ) -> Result<(), ActorProcessingErr> {
        match message {
            StoreActorMessage::LoadProjects(reply) => {
                let res = self.load_projects(&state.pool).await;
                let _ = reply.send(res);
            }
            StoreActorMessage::GetProject(project_id, reply) => {
                let res = self.get_project(&state.pool, &project_id).await;
                let _ = reply.send(res);
            }
            StoreActorMessage::SaveProject(project, reply) => {
                let res = self.save_project(&state.pool, project).await;
                let _ = reply.send(res);
            }
            StoreActorMessage::DeleteProject(project_id, reply) => {
                let res = self.delete_project(&state.pool, &project_id).await;
                let _ = reply.send(res);
            }
            StoreActorMessage::AddVersion(project_id, version, reply) => {
                let res = self.add_version(&state.pool, &project_id, version).await;
                let _ = reply.send(res);
            }
            StoreActorMessage::ActiveProject(reply) => {
                let res = self.kv_get(&state.pool, ACTIVE_PROJECT_KEY).await;
                let _ = reply.send(res);
            }
            StoreActorMessage::SetActiveProject(project_id, reply) => {
                let res = self.set_active_project(&state.pool, project_id).await;
                let _ = reply.send(res);
            }
            StoreActorMessage::ListModelConfigs(reply) => {
                let res = self.list_model_configs(&state.pool).await;
                let _ = reply.send(res);
            }
            StoreActorMessage::UpsertModelConfig(config, reply) => {
                let res = self.upsert_model_config(&state.pool, config).await;
                let _ = reply.send(res);
            }
            StoreActorMessage::DeleteModelConfig(name, reply) => {
                let res = self.delete_model_config(&state.pool, &name).await;
                let _ = reply.send(res);
            }
            StoreActorMessage::ClearAll(reply) => {
                let res = self.clear_all(&state.pool).await;
                let _ = reply.send(res);
            }
        }
        Ok(())
    }
}

impl StoreActor {
    async fn kv_get(&self, pool: &SqlitePool, key: &str) -> Result<Option<String>, StoreError> {
        let value: Option<String> = sqlx::query_scalar("SELECT value FROM kv_store WHERE key = ?")
            .bind(key)
            .fetch_optional(pool)
            .await?;
        Ok(value)
    }

    async fn kv_put(&self, pool: &SqlitePool, key: &str, value: &str) -> Result<(), StoreError> {
        let updated_at = Utc::now();
        sqlx::query(
            r#"
            INSERT INTO kv_store (key, value, updated_at) VALUES (?, ?, ?)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(updated_at)
        .execute(pool)
        .await?;
        Ok(())
    }

    async fn kv_delete(&self, pool: &SqlitePool, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM kv_store WHERE key = ?")
            .bind(key)
            .execute(pool)
            .await?;
        Ok(())
    }

    async fn load_projects(&self, pool: &SqlitePool) -> Result<Vec<Project>, StoreError> {
        match self.kv_get(pool, PROJECTS_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn store_projects(
        &self,
        pool: &SqlitePool,
        projects: &[Project],
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(projects)?;
        self.kv_put(pool, PROJECTS_KEY, &raw).await
    }

    async fn get_project(
        &self,
        pool: &SqlitePool,
        project_id: &str,
    ) -> Result<Option<Project>, StoreError> {
        let projects = self.load_projects(pool).await?;
        Ok(projects.into_iter().find(|p| p.id == project_id))
    }

    /// Read-modify-write of the whole collection. The actor mailbox
    /// serializes writers, so the last write wins.
    async fn save_project(&self, pool: &SqlitePool, project: Project) -> Result<(), StoreError> {
        let mut projects = self.load_projects(pool).await?;
        match projects.iter_mut().find(|p| p.id == project.id) {
            Some(slot) => *slot = project,
            None => projects.push(project),
        }
        self.store_projects(pool, &projects).await
    }

    async fn delete_project(&self, pool: &SqlitePool, project_id: &str) -> Result<(), StoreError> {
        let mut projects = self.load_projects(pool).await?;
        projects.retain(|p| p.id != project_id);
        self.store_projects(pool, &projects).await
    }

    async fn add_version(
        &self,
        pool: &SqlitePool,
        project_id: &str,
        version: ProjectVersion,
    ) -> Result<(), StoreError> {
        let mut projects = self.load_projects(pool).await?;
        // Unknown project ids are a no-op, matching the UI contract.
        if let Some(project) = projects.iter_mut().find(|p| p.id == project_id) {
            project.push_version(version);
            self.store_projects(pool, &projects).await?;
        }
        Ok(())
    }

    async fn set_active_project(
        &self,
        pool: &SqlitePool,
        project_id: Option<String>,
    ) -> Result<(), StoreError> {
        match project_id {
            Some(id) => self.kv_put(pool, ACTIVE_PROJECT_KEY, &id).await,
            None => self.kv_delete(pool, ACTIVE_PROJECT_KEY).await,
        }
    }

    async fn list_model_configs(&self, pool: &SqlitePool) -> Result<Vec<ModelConfig>, StoreError> {
        match self.kv_get(pool, MODEL_CONFIGS_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    async fn store_model_configs(
        &self,
        pool: &SqlitePool,
        configs: &[ModelConfig],
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(configs)?;
        self.kv_put(pool, MODEL_CONFIGS_KEY, &raw).await
    }

    async fn upsert_model_config(
        &self,
        pool: &SqlitePool,
        config: ModelConfig,
    ) -> Result<(), StoreError> {
        let mut configs = self.list_model_configs(pool).await?;
        match configs.iter_mut().find(|c| c.name == config.name) {
            Some(slot) => *slot = config,
            None => configs.push(config),
        }
        self.store_model_configs(pool, &configs).await
    }

    async fn delete_model_config(&self, pool: &SqlitePool, name: &str) -> Result<(), StoreError> {
        let mut configs = self.list_model_configs(pool).await?;
        configs.retain(|c| c.name != name);
        self.store_model_configs(pool, &configs).await
    }

    async fn clear_all(&self, pool: &SqlitePool) -> Result<(), StoreError> {
        for key in [PROJECTS_KEY, ACTIVE_PROJECT_KEY, MODEL_CONFIGS_KEY] {
            self.kv_delete(pool, key).await?;
        }
        Ok(())
    }
}

/// Spawn the store actor and return a cloneable handle.
///
/// The actor is unnamed: hosting processes and tests may run several
/// stores side by side, and registry names are process-global.
pub async fn spawn(database_url: &str) -> StoreHandle {
    let (actor, _jh) = Actor::spawn(None, StoreActor, database_url.to_string())
        .await
        .expect("failed to spawn StoreActor");

    StoreHandle { actor }
}
