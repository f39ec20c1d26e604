// ── Client facade ──
//
// Owns one session, one dispatcher and one entity cache. Every exchange and
// every cache merge happens under the dispatcher's guard, so a client can
// be cloned and shared between tasks.

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use etidomo_api::{
    Credentials, DispatchGuard, Dispatcher, SessionManager, Transport, TransportConfig,
};

use crate::config::ClientConfig;
use crate::convert;
use crate::error::CoreError;
use crate::fetch;
use crate::model::{Entity, EntityId, EntityKind, EntityStatus, Feature, ServerInfo};
use crate::store::EntityStore;

/// Extra knobs for [`Client::set_entity_status`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusOptions {
    /// Wanted brightness for lights, in percent. Defaults to 100; values
    /// outside `0..=100` are clamped.
    pub brightness: Option<i64>,
}

impl StatusOptions {
    pub fn brightness(value: i64) -> Self {
        Self {
            brightness: Some(value),
        }
    }
}

/// Handle to one ETI/Domo server.
///
/// Cheaply cloneable via `Arc<ClientInner>`.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    dispatcher: Dispatcher,
    store: EntityStore,
}

impl Client {
    /// Validate the config, build the transport and (unless disabled)
    /// probe the endpoint. No login happens until the first command.
    pub async fn connect(config: ClientConfig) -> Result<Self, CoreError> {
        config.validate()?;
        let endpoint = config.endpoint()?;

        let transport = Transport::new(
            endpoint,
            &TransportConfig {
                timeout: config.timeout,
            },
        )?;

        if config.probe {
            transport.probe().await?;
            debug!(endpoint = %transport.endpoint(), "server reachable");
        }

        let credentials = Credentials {
            username: config.username.clone(),
            password: config.password.clone(),
        };
        let dispatcher = Dispatcher::new(SessionManager::new(transport, credentials));

        info!(host = %config.host, "client ready");
        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                dispatcher,
                store: EntityStore::new(),
            }),
        })
    }

    /// Connect, run `f`, then close whatever `f` returned.
    pub async fn scoped<F, Fut, T>(config: ClientConfig, f: F) -> Result<T, CoreError>
    where
        F: FnOnce(Client) -> Fut,
        Fut: Future<Output = Result<T, CoreError>>,
    {
        let client = Client::connect(config).await?;
        let result = f(client.clone()).await;
        client.close().await;
        result
    }

    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// Read-only access to the cache.
    pub fn store(&self) -> &EntityStore {
        &self.inner.store
    }

    // ── Session ──────────────────────────────────────────────────────

    pub async fn is_authenticated(&self) -> bool {
        self.inner.dispatcher.lock().await.is_authenticated()
    }

    pub async fn ensure_authenticated(&self) -> Result<(), CoreError> {
        let mut guard = self.inner.dispatcher.lock().await;
        guard.ensure_authenticated().await?;
        Ok(())
    }

    /// Advisory liveness ping; never fails.
    pub async fn keep_alive(&self) -> bool {
        self.inner.dispatcher.lock().await.keep_alive().await
    }

    /// Best-effort logout. Failures are logged, never raised.
    pub async fn close(&self) {
        if !self.inner.dispatcher.lock().await.logout().await {
            warn!("logout failed (non-fatal)");
        }
    }

    // ── Features ─────────────────────────────────────────────────────

    /// Features advertised by the server, fetched once.
    pub async fn get_features(&self) -> Result<Vec<Arc<Feature>>, CoreError> {
        if !self.inner.store.features_loaded() {
            let mut guard = self.inner.dispatcher.lock().await;
            if !self.inner.store.features_loaded() {
                self.load_features(&mut guard).await?;
            }
        }
        Ok(self.inner.store.features())
    }

    /// Identification block from the feature list, fetched once.
    pub async fn server_info(&self) -> Result<Arc<ServerInfo>, CoreError> {
        if let Some(info) = self.inner.store.server_info() {
            return Ok(info);
        }
        let mut guard = self.inner.dispatcher.lock().await;
        if self.inner.store.server_info().is_none() {
            self.load_features(&mut guard).await?;
        }
        self.inner
            .store
            .server_info()
            .ok_or_else(|| CoreError::Internal("server info missing after fetch".into()))
    }

    // ── Entities ─────────────────────────────────────────────────────

    /// Entities of one kind, or of every feature-backed kind when `kind`
    /// is `None`. Each kind is fetched from the server at most once; later
    /// calls are served from cache.
    pub async fn get_entities(
        &self,
        kind: Option<EntityKind>,
    ) -> Result<Vec<Arc<Entity>>, CoreError> {
        let store = &self.inner.store;

        if let Some(kind) = kind {
            if !store.is_loaded(kind) {
                let mut guard = self.inner.dispatcher.lock().await;
                // another task may have fetched while we waited
                if !store.is_loaded(kind) {
                    self.load_entities(&mut guard, kind).await?;
                }
            }
            return Ok(store.entities(Some(kind)));
        }

        let mut guard = self.inner.dispatcher.lock().await;
        if !store.features_loaded() {
            self.load_features(&mut guard).await?;
        }
        for kind in store.supported_kinds() {
            if !store.is_loaded(kind) {
                self.load_entities(&mut guard, kind).await?;
            }
        }
        drop(guard);

        Ok(store.entities(None))
    }

    /// Re-fetch one kind and merge it over the cache.
    pub async fn refresh_entities(&self, kind: EntityKind) -> Result<Vec<Arc<Entity>>, CoreError> {
        let mut guard = self.inner.dispatcher.lock().await;
        self.load_entities(&mut guard, kind).await?;
        drop(guard);
        Ok(self.inner.store.entities(Some(kind)))
    }

    /// Ask the server to change an entity's status.
    ///
    /// Returns `true` only if the server acknowledged with reason 0. The
    /// cache is left untouched; call [`refresh_entities`](Self::refresh_entities)
    /// to observe the new state.
    pub async fn set_entity_status(
        &self,
        kind: EntityKind,
        id: EntityId,
        status: EntityStatus,
        options: StatusOptions,
    ) -> Result<bool, CoreError> {
        if !kind.is_switchable() {
            warn!(%kind, id, "entity kind cannot be switched");
            return Ok(false);
        }

        let brightness = match options.brightness {
            None => 100,
            Some(requested) => {
                let clamped = convert::normalize_brightness(requested);
                if i64::from(clamped) != requested {
                    warn!(requested, clamped, "brightness out of range, clamping");
                }
                clamped
            }
        };

        let Some(command) = fetch::status_command(kind, id, status, brightness) else {
            warn!(%kind, id, %status, "status has no wire representation");
            return Ok(false);
        };

        let response = self.inner.dispatcher.execute(&command).await?;
        match fetch::check_ack(&command, &response) {
            Ok(()) => {
                debug!(%kind, id, %status, "status change acknowledged");
                Ok(true)
            }
            Err(e) => {
                warn!(%kind, id, error = %e, "status change refused");
                Ok(false)
            }
        }
    }

    // ── Fetch helpers (guard held by caller) ─────────────────────────

    async fn load_features(&self, guard: &mut DispatchGuard<'_>) -> Result<(), CoreError> {
        let command = fetch::features_command();
        let response = guard.execute(&command).await?;
        fetch::check_ack(&command, &response)?;

        let (features, info) = convert::features_from_response(&response);
        debug!(count = features.len(), "features fetched");
        for feature in features.iter().filter(|f| f.entity_kind().is_none()) {
            debug!(feature = feature.name(), "feature has no entity fetcher");
        }
        self.inner.store.set_features(features, info);
        Ok(())
    }

    async fn load_entities(
        &self,
        guard: &mut DispatchGuard<'_>,
        kind: EntityKind,
    ) -> Result<(), CoreError> {
        let command = fetch::list_command(kind);
        let response = guard.execute(&command).await?;
        fetch::check_ack(&command, &response)?;

        let entities = convert::entities_from_response(kind, &response);
        let fetched = entities.len();
        let added = self.inner.store.merge(kind, entities);
        debug!(%kind, fetched, added, "entities merged");
        Ok(())
    }
}
