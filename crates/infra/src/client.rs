//! Client facade
//!
//! Wires the core services to their infrastructure adapters. One
//! [`WeComClient`] owns one token store and one media cache; both live and
//! die with the client.

use std::sync::Arc;

use tracing::info;
use wecom_core::{
    Clock, CredentialProvider, MediaCache, MediaLoader, MessageDispatcher, RemoteTokenAuthority,
    RetryableInvoker, SystemClock, TokenAuthority, Transport,
};
use wecom_domain::{
    AccessToken, AgentKey, MediaDescriptor, MediaSource, Message, MessageSendResult,
    MessageTargets, Result, WeComConfig, WeComError,
};

use crate::http::{HttpClient, HttpTransport};
use crate::media::FsMediaLoader;

/// Entry point for sending messages and managing media.
pub struct WeComClient {
    config: WeComConfig,
    credentials: Arc<CredentialProvider>,
    invoker: Arc<RetryableInvoker>,
    media: MediaCache,
    dispatcher: MessageDispatcher,
}

impl WeComClient {
    /// Client with the default HTTP transport, filesystem loader and
    /// system clock.
    ///
    /// # Errors
    /// `WeComError::Config` for an invalid configuration.
    pub fn new(config: WeComConfig) -> Result<Self> {
        Self::builder(config).build()
    }

    pub fn builder(config: WeComConfig) -> WeComClientBuilder {
        WeComClientBuilder {
            config,
            transport: None,
            authority: None,
            loader: None,
            clock: None,
        }
    }

    pub fn config(&self) -> &WeComConfig {
        &self.config
    }

    /// Agent configured under `name`.
    ///
    /// # Errors
    /// `WeComError::Config` when no agent has that name.
    pub fn agent(&self, name: &str) -> Result<AgentKey> {
        self.config
            .agent(name)
            .ok_or_else(|| WeComError::Config(format!("no agent named '{name}' configured")))
    }

    /// Current token for `agent`, fetching one when needed.
    pub async fn access_token(&self, agent: &AgentKey, force_refresh: bool) -> Result<AccessToken> {
        self.credentials.get_token(agent, force_refresh).await
    }

    pub async fn send(
        &self,
        agent: &AgentKey,
        message: &Message,
        targets: &MessageTargets,
    ) -> Result<MessageSendResult> {
        self.dispatcher.send(agent, message, targets).await
    }

    pub async fn get_or_create_media(
        &self,
        media_id: Option<&str>,
        source: &MediaSource,
        agent: &AgentKey,
    ) -> Result<MediaDescriptor> {
        self.media.get_or_create(media_id, source, agent).await
    }

    pub async fn create_media(
        &self,
        source: &MediaSource,
        agent: &AgentKey,
    ) -> Result<MediaDescriptor> {
        self.media.create(source, agent).await
    }

    pub fn cached_media(&self, media_id: &str) -> Option<MediaDescriptor> {
        self.media.get(media_id)
    }

    pub async fn download_media(&self, agent: &AgentKey, media_id: &str) -> Result<MediaDescriptor> {
        self.media.download(agent, media_id).await
    }

    pub fn media_cache(&self) -> &MediaCache {
        &self.media
    }

    pub fn credentials(&self) -> &Arc<CredentialProvider> {
        &self.credentials
    }

    /// Shared invoker, for calling endpoints this client does not wrap.
    pub fn invoker(&self) -> &Arc<RetryableInvoker> {
        &self.invoker
    }
}

/// Builder for [`WeComClient`]; every collaborator can be swapped.
pub struct WeComClientBuilder {
    config: WeComConfig,
    transport: Option<Arc<dyn Transport>>,
    authority: Option<Arc<dyn TokenAuthority>>,
    loader: Option<Arc<dyn MediaLoader>>,
    clock: Option<Arc<dyn Clock>>,
}

impl WeComClientBuilder {
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Token authority; defaults to `gettoken` over the transport.
    pub fn authority(mut self, authority: Arc<dyn TokenAuthority>) -> Self {
        self.authority = Some(authority);
        self
    }

    pub fn loader(mut self, loader: Arc<dyn MediaLoader>) -> Self {
        self.loader = Some(loader);
        self
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn build(self) -> Result<WeComClient> {
        let config = self.config;
        config.validate()?;

        let transport: Arc<dyn Transport> = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpTransport::new(
                HttpClient::from_config(&config.http)?,
                config.api_base_url.clone(),
            )),
        };
        let clock: Arc<dyn Clock> = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let authority: Arc<dyn TokenAuthority> = self.authority.unwrap_or_else(|| {
            Arc::new(RemoteTokenAuthority::new(
                transport.clone(),
                config.corp_id.clone(),
                clock.clone(),
            ))
        });
        let loader: Arc<dyn MediaLoader> =
            self.loader.unwrap_or_else(|| Arc::new(FsMediaLoader::new()));

        let credentials =
            Arc::new(CredentialProvider::new(authority, clock.clone(), &config.token));
        let invoker = Arc::new(RetryableInvoker::new(credentials.clone(), transport));
        let media = MediaCache::new(invoker.clone(), loader, clock, &config.media_cache);
        let dispatcher = MessageDispatcher::new(invoker.clone());

        info!(
            corp_id = %config.corp_id,
            api_base_url = %config.api_base_url,
            agents = config.agents.len(),
            media_ttl_secs = config.media_cache.ttl_secs,
            "WeCom client initialized"
        );

        Ok(WeComClient { config, credentials, invoker, media, dispatcher })
    }
}
